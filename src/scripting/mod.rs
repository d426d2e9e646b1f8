//! 脚本系统
//!
//! - `vm` - 解释器接口（槽位、句柄、回调配置）
//! - `modules` - `import` 名称解析与模块源码加载
//! - `callbacks` - 把解析器和输出接到解释器配置上
//! - `session` - 解释器生命周期与每帧调用

pub mod callbacks;
pub mod modules;
pub mod session;
pub mod vm;

#[cfg(test)]
pub(crate) mod mock;

pub use callbacks::configure;
pub use modules::{resolve_module_name, ModuleLoader, BUILTIN_MODULES};
pub use session::{LifecycleState, VmSession};
pub use vm::{
    ErrorKind, ErrorReport, FinalizerFn, ForeignMethodFn, Handle, InterpretResult, ScriptVm,
    SlotType, Slots, VmConfiguration,
};

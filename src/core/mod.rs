//! 核心模块
//!
//! 包含桥接层的基础设施：
//! - `error` - 错误类型定义
//! - `logging` - tracing日志初始化
//! - `macros` - `impl_default!`与`foreign_fn!`

pub mod error;
pub mod logging;
#[macro_use]
pub mod macros;

// 重新导出错误类型
pub use error::{
    BindingError, BindingResult, ScriptError, ScriptResult, SlotError, SlotResult,
};
pub use logging::init_logging;

//! # tico_wren
//!
//! tico 引擎的 Wren 脚本桥接层。
//!
//! ## 功能
//!
//! - **原生类注册表**: 脚本中的 `foreign` 方法按类名和签名解析到 Rust 函数，静态方法带 `s_` 前缀
//! - **模块系统**: `tico.` 开头的内嵌模块与项目目录下的 `.wren` 文件
//! - **生命周期**: 引导 `main.wren`，每帧调用 `Game` 实例的 `update(_)` 和 `draw()`
//! - **数据转换**: 脚本列表转换为颜色、矩形
//!
//! ## 架构
//!
//! 解释器本身通过 [`scripting::ScriptVm`] trait 接入。原生方法只读写槽位，
//! 对引擎的操作以 [`bindings::BindingCommand`] 的形式进入命令队列，由引擎每帧消费。
//!
//! ### 示例
//!
//! ```ignore
//! use tico_wren::config::ScriptConfig;
//! use tico_wren::scripting::VmSession;
//!
//! let config = ScriptConfig::load_or_default();
//! tico_wren::core::init_logging(&config.logging);
//!
//! let mut session: VmSession<MyWrenVm> = VmSession::new(&config)?;
//! loop {
//!     session.update(dt);
//!     session.draw();
//!     for command in session.drain_commands() {
//!         renderer.execute(command);
//!     }
//! }
//! ```

/// 错误类型、日志和宏
pub mod core;
/// 配置系统
pub mod config;
/// 解释器接口、模块加载和会话生命周期
pub mod scripting;
/// 原生类绑定与引擎命令协议
pub mod bindings;

pub use crate::core::error::{ScriptError, ScriptResult};
pub use config::ScriptConfig;
pub use scripting::{ScriptVm, Slots, VmSession};

// `foreign_fn!` 展开后通过 `$crate::tracing` 记录日志
#[doc(hidden)]
pub use tracing;

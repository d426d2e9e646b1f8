//! 统一错误处理模块
//!
//! 提供脚本桥接层范围内的错误类型定义
//!
//! ## 错误类型分层
//!
//! - **绑定表错误** (`BindingError`): 启动时校验原生类表发现的问题（重复类名、重复签名）
//! - **槽位错误** (`SlotError`): 原生方法读取脚本参数时类型不匹配
//! - **配置错误** (`config::ConfigError`): 配置文件读取、解析和验证
//!
//! 解析未命中（未知类、未知签名、找不到模块）不是错误，而是返回 `None`，
//! 由解释器在真正调用时报告。`ScriptError` 聚合启动阶段的绑定表错误和配置错误。

use crate::config::ConfigError;
use thiserror::Error;

/// 脚本桥接层错误类型
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Binding table error: {0}")]
    Binding(#[from] BindingError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// 原生类表校验错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("Foreign class registered twice: {0}")]
    DuplicateClass(String),

    #[error("Signature '{signature}' registered twice in class {class}")]
    DuplicateSignature { class: String, signature: String },

    #[error("Foreign class with an empty name at index {0}")]
    EmptyClassName(usize),
}

/// 原生方法读取槽位时的错误
///
/// 由 `foreign_fn!` 包装器转换为 `abort_fiber`，错误信息会出现在脚本的运行时错误中。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlotError {
    #[error("{what} must be a {expected}")]
    Type {
        what: &'static str,
        expected: &'static str,
    },

    #[error("{0} is not a live foreign object")]
    Foreign(&'static str),
}

impl SlotError {
    pub fn num(what: &'static str) -> Self {
        SlotError::Type {
            what,
            expected: "Num",
        }
    }

    pub fn string(what: &'static str) -> Self {
        SlotError::Type {
            what,
            expected: "String",
        }
    }

    pub fn list(what: &'static str) -> Self {
        SlotError::Type {
            what,
            expected: "List",
        }
    }
}

/// 结果类型别名
pub type ScriptResult<T> = Result<T, ScriptError>;
pub type BindingResult<T> = Result<T, BindingError>;
pub type SlotResult<T> = Result<T, SlotError>;

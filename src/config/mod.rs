//! 统一配置系统
//!
//! 提供TOML/JSON配置文件、环境变量覆盖，控制脚本项目位置、解释器输出去向和日志
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 脚本桥接主配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptConfig {
    /// 脚本项目根目录，`main.wren`与用户模块都相对于它查找
    #[serde(default = "default_project_root")]
    pub project_root: PathBuf,

    /// 解释器`System.print`输出去向
    #[serde(default)]
    pub output: OutputTarget,

    /// 启动时校验原生类表（重复类名/重复签名）
    #[serde(default = "default_true")]
    pub validate_bindings: bool,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_project_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            project_root: default_project_root(),
            output: OutputTarget::default(),
            validate_bindings: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl ScriptConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 以指定目录为项目根目录
    pub fn with_project_root(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Self::default()
        }
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("TICO_PROJECT_ROOT") {
            if !val.is_empty() {
                self.project_root = PathBuf::from(val);
            }
        }
        if let Ok(val) = env::var("TICO_SCRIPT_OUTPUT") {
            if let Some(output) = OutputTarget::parse(&val) {
                self.output = output;
            }
        }
        if let Ok(val) = env::var("TICO_LOG_LEVEL") {
            if let Some(level) = LogLevel::parse(&val) {
                self.logging.level = level;
            }
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.project_root.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "project_root must not be empty".to_string(),
            ));
        }
        if self.project_root.exists() && !self.project_root.is_dir() {
            return Err(ConfigError::ValidationError(format!(
                "project_root {:?} is not a directory",
                self.project_root
            )));
        }
        Ok(())
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./config.toml
    /// 2. ./config.json
    /// 3. 使用默认配置
    ///
    /// 最后应用环境变量覆盖。
    pub fn load_or_default() -> Self {
        let mut config = if let Ok(config) = Self::from_toml_file("config.toml") {
            tracing::info!(target: "scripting", "Loaded config from config.toml");
            config
        } else if let Ok(config) = Self::from_json_file("config.json") {
            tracing::info!(target: "scripting", "Loaded config from config.json");
            config
        } else {
            tracing::info!(target: "scripting", "Using default configuration");
            Self::default()
        };

        config.apply_env_overrides();
        config
    }
}

/// 解释器输出去向
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputTarget {
    /// 直接写到标准输出
    #[default]
    Stdout,
    /// 作为`wren`目标的tracing日志输出
    Log,
}

impl OutputTarget {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "stdout" => Some(OutputTarget::Stdout),
            "log" => Some(OutputTarget::Log),
            _ => None,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,

    /// 是否输出日志目标(`wren`/`scripting`/`bindings`)
    pub with_target: bool,
}

use crate::impl_default;

impl_default!(LoggingConfig {
    level: LogLevel::Info,
    with_target: true,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

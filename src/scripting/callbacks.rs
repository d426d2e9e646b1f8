//! 解释器回调
//!
//! 把模块解析、模块加载、原生方法/类解析和输出接到 [`VmConfiguration`] 上。

use crate::bindings::protocol::HostBindings;
use crate::bindings::registry::ClassRegistry;
use crate::config::{OutputTarget, ScriptConfig};
use crate::scripting::modules::{resolve_module_name, ModuleLoader};
use crate::scripting::vm::{ErrorKind, ErrorReport, VmConfiguration, WriteFn};
use std::cell::RefCell;

/// 按配置创建解释器回调
pub fn configure(config: &ScriptConfig) -> VmConfiguration {
    let registry = ClassRegistry::builtin();
    let loader = ModuleLoader::new(config.project_root.clone());

    VmConfiguration {
        resolve_module: Box::new(|importer: &str, name: &str| {
            Some(resolve_module_name(importer, name))
        }),
        load_module: Box::new(move |name: &str| loader.load(name)),
        bind_foreign_method: Box::new(
            move |_module: &str, class: &str, is_static: bool, signature: &str| {
                registry.resolve_method(class, signature, is_static)
            },
        ),
        bind_foreign_class: Box::new(move |_module: &str, class: &str| {
            registry.resolve_class_lifecycle(class)
        }),
        write: write_sink(config.output),
        error: Box::new(report_error),
        user_data: HostBindings::new(),
    }
}

fn write_sink(output: OutputTarget) -> WriteFn {
    match output {
        OutputTarget::Stdout => Box::new(|text: &str| print!("{}", text)),
        OutputTarget::Log => {
            let sink = RefCell::new(LogSink::default());
            Box::new(move |text: &str| sink.borrow_mut().write(text))
        }
    }
}

/// 按行转发到 `wren` 日志目标，析构时输出没有换行结尾的剩余文本
#[derive(Debug, Default)]
struct LogSink {
    buffer: LineBuffer,
}

impl LogSink {
    fn write(&mut self, text: &str) {
        for line in self.buffer.push(text) {
            tracing::info!(target: "wren", "{}", line);
        }
    }
}

impl Drop for LogSink {
    fn drop(&mut self) {
        if let Some(line) = self.buffer.take_pending() {
            tracing::info!(target: "wren", "{}", line);
        }
    }
}

fn report_error(report: &ErrorReport<'_>) {
    match report.kind {
        ErrorKind::Compile | ErrorKind::Runtime => tracing::error!(target: "wren", "{}", report),
        ErrorKind::StackTrace => tracing::error!(target: "wren", "  at {}", report),
    }
}

/// 把分段写入的输出切成完整的行
///
/// 解释器的 `System.print` 会先写文本再单独写换行。
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: String,
}

impl LineBuffer {
    /// 追加文本，返回已经完整的行（不含换行符）
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.pending.push_str(text);
        let mut lines = Vec::new();
        while let Some(end) = self.pending.find('\n') {
            lines.push(self.pending[..end].to_string());
            self.pending.drain(..=end);
        }
        lines
    }

    /// 尚未遇到换行的部分
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// 取出剩余的不完整行
    pub fn take_pending(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}

//! 模块解析与加载
//!
//! `import "tico.graphics"` 指向内嵌模块，名称原样保留；
//! 其它名称按点号拆成路径并追加 `.wren`，例如 `import "a.b"` 读取 `a/b.wren`。
//! 加载时内嵌模块优先，只有内嵌表未命中时才访问文件系统。

use std::fs;
use std::path::{Component, Path, PathBuf};

/// 内嵌模块命名空间前缀
pub const BUILTIN_PREFIX: &str = "tico.";

/// 脚本源文件扩展名
pub const SOURCE_EXTENSION: &str = "wren";

/// 一个内嵌模块
#[derive(Debug, Clone, Copy)]
pub struct BuiltinModule {
    pub name: &'static str,
    pub source: &'static str,
}

/// 内嵌模块表
pub static BUILTIN_MODULES: &[BuiltinModule] = &[
    BuiltinModule {
        name: "tico.graphics",
        source: include_str!("../bindings/wren/graphics.wren"),
    },
    BuiltinModule {
        name: "tico.input",
        source: include_str!("../bindings/wren/input.wren"),
    },
    BuiltinModule {
        name: "tico.timer",
        source: include_str!("../bindings/wren/timer.wren"),
    },
    BuiltinModule {
        name: "tico.audio",
        source: include_str!("../bindings/wren/audio.wren"),
    },
    BuiltinModule {
        name: "tico.math",
        source: include_str!("../bindings/wren/math.wren"),
    },
];

/// 名称是否位于内嵌模块命名空间
pub fn is_builtin_name(name: &str) -> bool {
    name.starts_with(BUILTIN_PREFIX)
}

/// 查找内嵌模块源码
pub fn builtin_source(name: &str) -> Option<&'static str> {
    BUILTIN_MODULES
        .iter()
        .find(|module| module.name == name)
        .map(|module| module.source)
}

/// 把 import 名称转换为规范模块名
///
/// `importer` 目前不参与解析：所有用户模块都相对于项目根目录。
pub fn resolve_module_name(_importer: &str, name: &str) -> String {
    if is_builtin_name(name) {
        return name.to_string();
    }

    let mut path = name.replace('.', "/");
    path.push('.');
    path.push_str(SOURCE_EXTENSION);
    path
}

/// 模块源码提供者
///
/// 用户模块相对于 `root` 查找。
#[derive(Debug, Clone)]
pub struct ModuleLoader {
    root: PathBuf,
}

impl ModuleLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 加载规范模块名对应的源码
    ///
    /// 内嵌模块返回一份独立的拷贝，调用方可以随意修改；
    /// 文件不存在、无法读取或不是 UTF-8 时返回 `None`，由解释器报告 import 错误。
    /// 指向项目根目录之外的名称（绝对路径、`..`、空段）同样返回 `None`。
    pub fn load(&self, name: &str) -> Option<String> {
        if let Some(source) = builtin_source(name) {
            return Some(source.to_owned());
        }

        let path = self.project_path(name)?;
        match fs::read_to_string(&path) {
            Ok(source) => {
                tracing::debug!(target: "scripting", "Loaded module {} from {:?}", name, path);
                Some(source)
            }
            Err(err) => {
                tracing::debug!(target: "scripting", "Module {} not loadable from {:?}: {}", name, path, err);
                None
            }
        }
    }

    /// 项目中是否存在某个规范模块名对应的文件
    pub fn file_exists(&self, name: &str) -> bool {
        self.project_path(name).is_some_and(|path| path.is_file())
    }

    fn project_path(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let inside = !name.is_empty()
            && !name.contains("//")
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !inside {
            tracing::debug!(target: "scripting", "Module {} escapes the project root", name);
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl Default for ModuleLoader {
    fn default() -> Self {
        Self::new(".")
    }
}

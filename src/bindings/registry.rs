//! 原生类注册表
//!
//! 每个可脚本化的原生类对应一个 [`ClassBinding`]：类名、可选的 allocate/finalize、
//! 以及按顺序排列的方法表。静态方法的签名带 [`STATIC_PREFIX`] 前缀，
//! 与同名同参数个数的实例方法区分开。
//!
//! 表是编译期常量，解析时线性扫描；表很小（几十项），不需要哈希表。

use crate::core::error::{BindingError, BindingResult};
use crate::scripting::vm::{FinalizerFn, ForeignMethodFn};
use std::collections::HashSet;

/// 静态方法签名前缀
pub const STATIC_PREFIX: &str = "s_";

/// 一个原生方法
#[derive(Debug, Clone, Copy)]
pub struct MethodBinding {
    /// 方法签名，静态方法带 `s_` 前缀，例如 `s_drawCircle(_,_,_,_)`
    pub signature: &'static str,
    pub function: ForeignMethodFn,
}

impl MethodBinding {
    pub const fn new(signature: &'static str, function: ForeignMethodFn) -> Self {
        Self {
            signature,
            function,
        }
    }

    /// 是否与查找键匹配；静态查找时比较去掉前缀后的签名，避免拼接字符串
    fn matches(&self, signature: &str, is_static: bool) -> bool {
        if is_static {
            self.signature.strip_prefix(STATIC_PREFIX) == Some(signature)
        } else {
            self.signature == signature
        }
    }
}

/// 外部类的构造与析构回调
#[derive(Debug, Clone, Copy, Default)]
pub struct ForeignClassMethods {
    pub allocate: Option<ForeignMethodFn>,
    pub finalize: Option<FinalizerFn>,
}

/// 一个原生类
#[derive(Debug, Clone, Copy)]
pub struct ClassBinding {
    pub name: &'static str,
    pub allocate: Option<ForeignMethodFn>,
    pub finalize: Option<FinalizerFn>,
    pub methods: &'static [MethodBinding],
}

impl ClassBinding {
    /// 只有静态方法、没有实例数据的类
    pub const fn statics(name: &'static str, methods: &'static [MethodBinding]) -> Self {
        Self {
            name,
            allocate: None,
            finalize: None,
            methods,
        }
    }

    /// 带实例数据的外部类
    pub const fn foreign(
        name: &'static str,
        allocate: ForeignMethodFn,
        finalize: FinalizerFn,
        methods: &'static [MethodBinding],
    ) -> Self {
        Self {
            name,
            allocate: Some(allocate),
            finalize: Some(finalize),
            methods,
        }
    }

    /// 按表顺序查找第一个匹配的方法
    pub fn find_method(&self, signature: &str, is_static: bool) -> Option<ForeignMethodFn> {
        self.methods
            .iter()
            .find(|method| method.matches(signature, is_static))
            .map(|method| method.function)
    }

    pub fn lifecycle(&self) -> ForeignClassMethods {
        ForeignClassMethods {
            allocate: self.allocate,
            finalize: self.finalize,
        }
    }
}

/// 原生类注册表
#[derive(Debug, Clone, Copy)]
pub struct ClassRegistry {
    classes: &'static [ClassBinding],
}

impl ClassRegistry {
    pub const fn new(classes: &'static [ClassBinding]) -> Self {
        Self { classes }
    }

    /// 引擎内置的类表
    pub fn builtin() -> Self {
        Self::new(super::BUILTIN_CLASSES)
    }

    pub fn classes(&self) -> &'static [ClassBinding] {
        self.classes
    }

    /// 按类名精确查找（区分大小写）
    pub fn find_class(&self, name: &str) -> Option<&'static ClassBinding> {
        self.classes.iter().find(|class| class.name == name)
    }

    /// 查找原生方法
    ///
    /// 未知类或未知签名返回 `None`，由解释器在调用时报告运行时错误。
    pub fn resolve_method(
        &self,
        class_name: &str,
        signature: &str,
        is_static: bool,
    ) -> Option<ForeignMethodFn> {
        self.find_class(class_name)?
            .find_method(signature, is_static)
    }

    /// 查找外部类的 allocate/finalize
    ///
    /// 未知类或没有实例数据的类两者都为 `None`，这不是错误。
    pub fn resolve_class_lifecycle(&self, class_name: &str) -> ForeignClassMethods {
        self.find_class(class_name)
            .map(ClassBinding::lifecycle)
            .unwrap_or_default()
    }

    /// 校验类名唯一、类内签名唯一
    pub fn validate(&self) -> BindingResult<()> {
        let mut class_names = HashSet::new();
        for (index, class) in self.classes.iter().enumerate() {
            if class.name.is_empty() {
                return Err(BindingError::EmptyClassName(index));
            }
            if !class_names.insert(class.name) {
                return Err(BindingError::DuplicateClass(class.name.to_string()));
            }

            let mut signatures = HashSet::new();
            for method in class.methods {
                if !signatures.insert(method.signature) {
                    return Err(BindingError::DuplicateSignature {
                        class: class.name.to_string(),
                        signature: method.signature.to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            target: "bindings",
            "Validated {} foreign classes, {} methods",
            self.classes.len(),
            self.classes.iter().map(|c| c.methods.len()).sum::<usize>()
        );
        Ok(())
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

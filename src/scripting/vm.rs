//! 解释器接口
//!
//! Wren 解释器本身是外部协作者，这里只定义桥接层需要的那一部分 API：
//! - [`Slots`]：原生方法能看到的槽位 API（对象安全，绑定表里存的是 `fn(&mut dyn Slots)`）
//! - [`ScriptVm`]：生命周期管理器使用的 API（解释、调用句柄、释放）
//! - [`VmConfiguration`]：创建解释器时注入的回调和输出
//!
//! 槽位是解释器与原生代码交换数据的唯一通道，编号从 0 开始；
//! 调用原生实例方法时槽位 0 是接收者，参数从槽位 1 开始。

use crate::bindings::protocol::HostBindings;
use crate::bindings::registry::ForeignClassMethods;
use std::any::Any;
use std::fmt;

/// 原生方法
pub type ForeignMethodFn = fn(&mut dyn Slots);

/// 原生对象析构回调，参数是 `allocate` 时放进去的数据
pub type FinalizerFn = fn(&mut (dyn Any + 'static));

/// 槽位中值的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotType {
    Bool,
    Num,
    Foreign,
    List,
    Map,
    Null,
    String,
    Unknown,
}

/// 解释执行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretResult {
    Success,
    CompileError,
    RuntimeError,
}

impl InterpretResult {
    pub fn is_success(self) -> bool {
        self == InterpretResult::Success
    }
}

/// 解释器持有的对象或调用句柄
///
/// 句柄不可复制，必须通过 [`ScriptVm::release_handle`] 交还给创建它的解释器。
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Handle(u64);

impl Handle {
    /// 由解释器实现创建
    pub fn from_raw(raw: u64) -> Self {
        Handle(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// 原生方法可见的槽位 API
pub trait Slots {
    /// 确保至少有 `count` 个槽位可用
    fn ensure_slots(&mut self, count: usize);

    /// 当前可用槽位数
    fn slot_count(&self) -> usize;

    fn slot_type(&self, slot: usize) -> SlotType;

    fn get_slot_bool(&self, slot: usize) -> bool;
    fn get_slot_double(&self, slot: usize) -> f64;
    fn get_slot_string(&self, slot: usize) -> Option<String>;

    fn set_slot_bool(&mut self, slot: usize, value: bool);
    fn set_slot_double(&mut self, slot: usize, value: f64);
    fn set_slot_string(&mut self, slot: usize, value: &str);
    fn set_slot_null(&mut self, slot: usize);

    /// 在槽位中创建空列表
    fn set_slot_new_list(&mut self, slot: usize);

    /// `list_slot` 中列表的元素个数
    fn get_list_count(&self, list_slot: usize) -> usize;

    /// 把 `list_slot` 中列表的第 `index` 个元素读到 `element_slot`
    fn get_list_element(&mut self, list_slot: usize, index: usize, element_slot: usize);

    /// 把 `element_slot` 的值插入到列表 `index` 处，`-1` 表示追加
    fn insert_in_list(&mut self, list_slot: usize, index: isize, element_slot: usize);

    /// 以 `class_slot` 中的外部类创建实例放到 `slot`，数据归解释器所有
    fn set_slot_new_foreign(&mut self, slot: usize, class_slot: usize, data: Box<dyn Any>);

    /// 读取槽位中外部对象的数据
    fn get_slot_foreign(&mut self, slot: usize) -> Option<&mut (dyn Any + 'static)>;

    /// 把模块顶层变量读到槽位
    fn get_variable(&mut self, module: &str, name: &str, slot: usize);

    fn has_variable(&self, module: &str, name: &str) -> bool;

    /// 以槽位中的错误信息中止当前 fiber
    fn abort_fiber(&mut self, message: &str);

    /// 引擎侧的共享状态（Wren 的 user data）
    fn host(&mut self) -> &mut HostBindings;
}

/// 生命周期管理器使用的解释器 API
pub trait ScriptVm: Slots {
    /// 用给定配置创建解释器
    fn new(config: VmConfiguration) -> Self
    where
        Self: Sized;

    /// 在 `module` 中解释执行一段源码
    fn interpret(&mut self, module: &str, source: &str) -> InterpretResult;

    /// 为方法签名创建可重用的调用句柄
    fn make_call_handle(&mut self, signature: &str) -> Handle;

    /// 以槽位 0 为接收者调用句柄对应的方法
    fn call(&mut self, method: &Handle) -> InterpretResult;

    /// 为槽位中的值创建持久句柄
    fn get_slot_handle(&mut self, slot: usize) -> Handle;

    fn set_slot_handle(&mut self, slot: usize, handle: &Handle);

    fn release_handle(&mut self, handle: Handle);
}

/// 解释器错误类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 编译错误，带模块和行号
    Compile,
    /// 运行时错误，只有错误信息
    Runtime,
    /// 运行时错误的调用栈的一帧，带模块和行号
    StackTrace,
}

/// 解释器报告的一条错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorReport<'a> {
    pub kind: ErrorKind,
    pub module: Option<&'a str>,
    pub line: Option<u32>,
    pub message: &'a str,
}

impl fmt::Display for ErrorReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.module, self.line) {
            (Some(module), Some(line)) => {
                write!(f, "{}:{} error: {}", module, line, self.message)
            }
            (Some(module), None) => write!(f, "{} error: {}", module, self.message),
            _ => write!(f, "error: {}", self.message),
        }
    }
}

pub type ResolveModuleFn = Box<dyn Fn(&str, &str) -> Option<String>>;
pub type LoadModuleFn = Box<dyn Fn(&str) -> Option<String>>;
pub type BindForeignMethodFn = Box<dyn Fn(&str, &str, bool, &str) -> Option<ForeignMethodFn>>;
pub type BindForeignClassFn = Box<dyn Fn(&str, &str) -> ForeignClassMethods>;
pub type WriteFn = Box<dyn Fn(&str)>;
pub type ErrorFn = Box<dyn Fn(&ErrorReport<'_>)>;

/// 创建解释器时注入的回调
///
/// 解释器在遇到 `import`、外部方法或外部类时同步调用这些回调，
/// 回调可能在 `update`/`draw` 调用内部被重入。
pub struct VmConfiguration {
    /// `(importer, name) -> 规范模块名`
    pub resolve_module: ResolveModuleFn,
    /// `规范模块名 -> 源码`
    pub load_module: LoadModuleFn,
    /// `(module, class, is_static, signature) -> 原生方法`
    pub bind_foreign_method: BindForeignMethodFn,
    /// `(module, class) -> allocate/finalize`
    pub bind_foreign_class: BindForeignClassFn,
    /// `System.print` 输出
    pub write: WriteFn,
    /// 编译/运行时错误输出
    pub error: ErrorFn,
    /// 原生方法通过 [`Slots::host`] 访问的引擎状态
    pub user_data: HostBindings,
}

impl fmt::Debug for VmConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VmConfiguration")
            .field("user_data", &self.user_data)
            .finish_non_exhaustive()
    }
}

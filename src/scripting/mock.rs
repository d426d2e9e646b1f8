//! 测试用解释器
//!
//! 只模拟绑定层测试用到的那部分 Wren：槽位、列表、外部对象、句柄，
//! 以及逐行解释的一小段语句：
//! - `import "name" for A, B`
//! - `class`/`foreign class` 定义；类体内的 `foreign` 声明、`construct` 和单行方法
//! - `var name = Class.method()`，结果是该类的新实例
//! - `System.print("text")` 与 `Fiber.abort("message")`
//!
//! 顶层出现其它语句视为编译错误；方法体内的其它语句被忽略。
//! 槽位越界或类型不符时直接 panic，与真实解释器的断言一致。

use crate::bindings::protocol::HostBindings;
use crate::bindings::registry::ForeignClassMethods;
use crate::config::ScriptConfig;
use crate::scripting::callbacks;
use crate::scripting::modules::BUILTIN_MODULES;
use crate::scripting::vm::{
    BindForeignClassFn, BindForeignMethodFn, ErrorFn, ErrorKind, ErrorReport, ForeignMethodFn,
    Handle, InterpretResult, LoadModuleFn, ResolveModuleFn, ScriptVm, SlotType, Slots,
    VmConfiguration, WriteFn,
};
use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::iter;
use std::rc::Rc;

/// 槽位中的值
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    List(Rc<RefCell<Vec<Value>>>),
    /// 外部对象，索引指向 `MockVm::foreigns`
    Foreign(usize),
    /// 脚本类的实例
    Object { id: u64, class: usize },
    Class(usize),
}

impl Value {
    pub fn list(values: &[f64]) -> Self {
        Value::List(Rc::new(RefCell::new(
            values.iter().map(|value| Value::Num(*value)).collect(),
        )))
    }

    pub fn str(text: &str) -> Self {
        Value::Str(text.to_string())
    }

    /// 全部元素都是数字的列表
    pub fn as_nums(&self) -> Option<Vec<f64>> {
        match self {
            Value::List(items) => items
                .borrow()
                .iter()
                .map(|item| match item {
                    Value::Num(value) => Some(*value),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    fn slot_type(&self) -> SlotType {
        match self {
            Value::Null => SlotType::Null,
            Value::Bool(_) => SlotType::Bool,
            Value::Num(_) => SlotType::Num,
            Value::Str(_) => SlotType::String,
            Value::List(_) => SlotType::List,
            Value::Foreign(_) => SlotType::Foreign,
            Value::Object { .. } | Value::Class(_) => SlotType::Unknown,
        }
    }
}

/// 一次通过调用句柄发起的调用
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub signature: String,
    pub receiver: Value,
    pub args: Vec<Value>,
}

/// 源码中的一条 `foreign` 声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ForeignDeclaration {
    pub class: String,
    pub signature: String,
    pub is_static: bool,
}

/// 捕获 `System.print` 输出和错误报告
#[derive(Debug, Clone, Default)]
pub(crate) struct Captured {
    output: Rc<RefCell<String>>,
    errors: Rc<RefCell<Vec<String>>>,
}

impl Captured {
    /// 替换配置中的输出回调
    pub fn install(config: &mut VmConfiguration) -> Self {
        let captured = Captured::default();
        let output = captured.output.clone();
        config.write = Box::new(move |text| output.borrow_mut().push_str(text));
        let errors = captured.errors.clone();
        config.error = Box::new(move |report| errors.borrow_mut().push(report.to_string()));
        captured
    }

    pub fn output(&self) -> String {
        self.output.borrow().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }
}

struct Callbacks {
    resolve_module: ResolveModuleFn,
    load_module: LoadModuleFn,
    bind_foreign_method: BindForeignMethodFn,
    bind_foreign_class: BindForeignClassFn,
    write: WriteFn,
    error: ErrorFn,
}

struct ScriptMethod {
    line: u32,
    body: String,
}

struct MockClass {
    name: String,
    module: String,
    lifecycle: ForeignClassMethods,
    foreign_methods: HashMap<(bool, String), ForeignMethodFn>,
    script_methods: HashMap<(bool, String), ScriptMethod>,
    constructors: HashSet<String>,
}

struct ForeignObject {
    class: usize,
    data: Box<dyn Any>,
}

enum HandleTarget {
    Value(Value),
    Method(String),
}

type Outcome = Result<(), InterpretResult>;

pub(crate) struct MockVm {
    callbacks: Callbacks,
    host: HostBindings,
    slots: Vec<Value>,
    modules: HashMap<String, HashMap<String, Value>>,
    classes: Vec<MockClass>,
    foreigns: Vec<Option<ForeignObject>>,
    handles: HashMap<u64, HandleTarget>,
    next_handle: u64,
    next_object: u64,
    calls: Vec<RecordedCall>,
    aborted: Option<String>,
}

impl MockVm {
    /// 使用默认配置、已载入全部内嵌模块的解释器
    pub fn standalone() -> Self {
        let mut vm = <MockVm as ScriptVm>::new(callbacks::configure(&ScriptConfig::default()));
        for module in BUILTIN_MODULES {
            let result = vm.interpret(module.name, module.source);
            assert!(
                result.is_success(),
                "built-in module {} failed: {:?}",
                module.name,
                result
            );
        }
        vm
    }

    pub fn load_slots(&mut self, values: Vec<Value>) {
        self.slots = values;
    }

    pub fn slot(&self, slot: usize) -> &Value {
        &self.slots[slot]
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    pub fn live_handles(&self) -> usize {
        self.handles.len()
    }

    pub fn take_abort(&mut self) -> Option<String> {
        self.aborted.take()
    }

    /// 直接调用外部类的原生静态方法，返回槽位 0 或中止信息
    pub fn invoke_static(
        &mut self,
        class_name: &str,
        signature: &str,
        args: Vec<Value>,
    ) -> Result<Value, String> {
        let class = self.class_index(class_name);
        let function = self.foreign_method(class, true, signature);
        self.load_slots(iter::once(Value::Class(class)).chain(args).collect());
        self.run_foreign(function)
    }

    /// 以外部对象为接收者调用原生实例方法
    pub fn invoke_method(
        &mut self,
        receiver: &Value,
        signature: &str,
        args: Vec<Value>,
    ) -> Result<Value, String> {
        let class = self.foreign_class_of(receiver);
        let function = self.foreign_method(class, false, signature);
        self.load_slots(iter::once(receiver.clone()).chain(args).collect());
        self.run_foreign(function)
    }

    /// 调用外部类的 allocate
    pub fn construct(&mut self, class_name: &str, args: Vec<Value>) -> Result<Value, String> {
        let class = self.class_index(class_name);
        let allocate = self.classes[class]
            .lifecycle
            .allocate
            .ok_or_else(|| format!("{} has no allocator", class_name))?;
        self.load_slots(iter::once(Value::Class(class)).chain(args).collect());
        let value = self.run_foreign(allocate)?;
        match value {
            Value::Foreign(_) => Ok(value),
            other => panic!("allocate for {} left {:?} in slot 0", class_name, other),
        }
    }

    pub fn foreign<T: 'static>(&self, value: &Value) -> Option<&T> {
        match value {
            Value::Foreign(index) => self.foreigns.get(*index)?.as_ref()?.data.downcast_ref(),
            _ => None,
        }
    }

    /// 回收外部对象，调用其类的 finalize
    pub fn release_object(&mut self, value: &Value) {
        let Value::Foreign(index) = value else {
            panic!("{:?} is not a foreign object", value);
        };
        if let Some(object) = self.foreigns[*index].take() {
            self.finalize(object);
        }
    }

    fn finalize(&self, mut object: ForeignObject) {
        if let Some(finalize) = self.classes[object.class].lifecycle.finalize {
            finalize(object.data.as_mut());
        }
    }

    fn class_index(&self, name: &str) -> usize {
        self.classes
            .iter()
            .position(|class| class.name == name)
            .unwrap_or_else(|| panic!("class {} is not defined", name))
    }

    fn foreign_class_of(&self, receiver: &Value) -> usize {
        match receiver {
            Value::Foreign(index) => self.foreigns[*index]
                .as_ref()
                .map(|object| object.class)
                .unwrap_or_else(|| panic!("foreign object {} was released", index)),
            other => panic!("{:?} is not a foreign object", other),
        }
    }

    fn foreign_method(&self, class: usize, is_static: bool, signature: &str) -> ForeignMethodFn {
        *self.classes[class]
            .foreign_methods
            .get(&(is_static, signature.to_string()))
            .unwrap_or_else(|| {
                panic!(
                    "{} has no foreign method {} (static: {})",
                    self.classes[class].name, signature, is_static
                )
            })
    }

    fn run_foreign(&mut self, function: ForeignMethodFn) -> Result<Value, String> {
        self.aborted = None;
        function(self);
        match self.aborted.take() {
            Some(message) => Err(message),
            None => Ok(self.slots[0].clone()),
        }
    }

    fn new_handle(&mut self, target: HandleTarget) -> Handle {
        self.next_handle += 1;
        self.handles.insert(self.next_handle, target);
        Handle::from_raw(self.next_handle)
    }

    fn define(&mut self, module: &str, name: &str, value: Value) {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(name.to_string(), value);
    }

    fn lookup(&self, module: &str, name: &str) -> Option<Value> {
        self.modules.get(module)?.get(name).cloned()
    }

    fn type_name(&self, value: &Value) -> String {
        match value {
            Value::Null => "Null".to_string(),
            Value::Bool(_) => "Bool".to_string(),
            Value::Num(_) => "Num".to_string(),
            Value::Str(_) => "String".to_string(),
            Value::List(_) => "List".to_string(),
            Value::Foreign(index) => match &self.foreigns[*index] {
                Some(object) => self.classes[object.class].name.clone(),
                None => "released object".to_string(),
            },
            Value::Object { class, .. } => self.classes[*class].name.clone(),
            Value::Class(class) => format!("{} metaclass", self.classes[*class].name),
        }
    }

    // ==================== 错误报告 ====================

    fn compile_error(&self, module: &str, line: u32, message: &str) -> InterpretResult {
        (self.callbacks.error)(&ErrorReport {
            kind: ErrorKind::Compile,
            module: Some(module),
            line: Some(line),
            message,
        });
        InterpretResult::CompileError
    }

    fn runtime_error(&self, message: &str, frame: Option<(&str, u32)>) -> InterpretResult {
        (self.callbacks.error)(&ErrorReport {
            kind: ErrorKind::Runtime,
            module: None,
            line: None,
            message,
        });
        if let Some((module, line)) = frame {
            (self.callbacks.error)(&ErrorReport {
                kind: ErrorKind::StackTrace,
                module: Some(module),
                line: Some(line),
                message: "(script)",
            });
        }
        InterpretResult::RuntimeError
    }

    // ==================== 解释 ====================

    fn run_module(&mut self, module: &str, source: &str) -> Outcome {
        let mut current_class = None;
        let mut last_line = 0;
        for (index, raw) in source.lines().enumerate() {
            let line = index as u32 + 1;
            last_line = line;
            let text = raw.trim();
            if text.is_empty() || text.starts_with("//") {
                continue;
            }

            if let Some(class) = current_class {
                if text == "}" {
                    current_class = None;
                } else {
                    self.class_member(module, line, class, text)?;
                }
                continue;
            }

            if let Some(header) = text.strip_prefix("foreign class ") {
                current_class = self.define_class(module, line, header, true)?;
            } else if let Some(header) = text.strip_prefix("class ") {
                current_class = self.define_class(module, line, header, false)?;
            } else if let Some(declaration) = text.strip_prefix("var ") {
                self.define_variable(module, line, declaration)?;
            } else {
                self.statement(module, line, text, true)?;
            }
        }

        if current_class.is_some() {
            return Err(self.compile_error(module, last_line, "Expect '}' after class body."));
        }
        Ok(())
    }

    /// 返回类体仍然打开时的类索引
    fn define_class(
        &mut self,
        module: &str,
        line: u32,
        header: &str,
        foreign: bool,
    ) -> Result<Option<usize>, InterpretResult> {
        let Some((name, rest)) = header.split_once('{') else {
            return Err(self.compile_error(module, line, "Expect '{' after class name."));
        };
        let name = name.trim();
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(self.compile_error(module, line, "Expect class name."));
        }

        let lifecycle = if foreign {
            (self.callbacks.bind_foreign_class)(module, name)
        } else {
            ForeignClassMethods::default()
        };

        let index = self.classes.len();
        self.classes.push(MockClass {
            name: name.to_string(),
            module: module.to_string(),
            lifecycle,
            foreign_methods: HashMap::new(),
            script_methods: HashMap::new(),
            constructors: HashSet::new(),
        });
        self.define(module, name, Value::Class(index));

        Ok(if rest.trim() == "}" { None } else { Some(index) })
    }

    fn class_member(&mut self, module: &str, line: u32, class: usize, text: &str) -> Outcome {
        if let Some(declaration) = text.strip_prefix("foreign ") {
            let (is_static, declaration) = split_static(declaration);
            let signature = signature_of(declaration);
            let class_name = self.classes[class].name.clone();
            return match (self.callbacks.bind_foreign_method)(module, &class_name, is_static, &signature) {
                Some(function) => {
                    self.classes[class]
                        .foreign_methods
                        .insert((is_static, signature), function);
                    Ok(())
                }
                None => Err(self.runtime_error(
                    &format!(
                        "Could not find foreign method '{}' for class {} in module '{}'.",
                        signature, class_name, module
                    ),
                    Some((module, line)),
                )),
            };
        }

        if let Some(declaration) = text.strip_prefix("construct ") {
            let head = split_body(declaration).map_or(declaration, |(head, _)| head);
            self.classes[class].constructors.insert(signature_of(head));
            return Ok(());
        }

        let (is_static, declaration) = split_static(text);
        let Some((head, body)) = split_body(declaration) else {
            return Err(self.compile_error(module, line, "Expect '{' to begin method body."));
        };
        self.classes[class].script_methods.insert(
            (is_static, signature_of(head)),
            ScriptMethod {
                line,
                body: body.to_string(),
            },
        );
        Ok(())
    }

    fn define_variable(&mut self, module: &str, line: u32, declaration: &str) -> Outcome {
        let (name, value) = match declaration.split_once('=') {
            Some((name, expression)) => (name.trim(), self.evaluate(module, line, expression.trim())?),
            None => (declaration.trim(), Value::Null),
        };
        if name.is_empty() {
            return Err(self.compile_error(module, line, "Expect variable name."));
        }
        self.define(module, name, value);
        Ok(())
    }

    fn evaluate(&mut self, module: &str, line: u32, expression: &str) -> Result<Value, InterpretResult> {
        match expression {
            "null" => return Ok(Value::Null),
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            _ => {}
        }
        if let Ok(number) = expression.parse::<f64>() {
            return Ok(Value::Num(number));
        }
        if let Some(text) = string_literal(expression) {
            return Ok(Value::str(text));
        }

        let Some((class_name, method)) = expression.split_once('.') else {
            return Err(self.compile_error(
                module,
                line,
                &format!("Error at '{}': Expected expression.", expression),
            ));
        };
        let signature = signature_of(method);
        let class = match self.lookup(module, class_name) {
            Some(Value::Class(class)) => class,
            Some(other) => {
                let message = format!("{} does not implement '{}'.", self.type_name(&other), signature);
                return Err(self.runtime_error(&message, Some((module, line))));
            }
            None => {
                return Err(self.compile_error(
                    module,
                    line,
                    &format!("Variable '{}' is used but not defined.", class_name),
                ))
            }
        };

        let key = (true, signature.clone());
        if let Some(method) = self.classes[class].script_methods.get(&key) {
            let body = method.body.clone();
            let frame = (self.classes[class].module.clone(), method.line);
            self.statement(&frame.0, frame.1, &body, false)?;
        } else if !self.classes[class].constructors.contains(&signature) {
            let message = format!("{} metaclass does not implement '{}'.", self.classes[class].name, signature);
            return Err(self.runtime_error(&message, Some((module, line))));
        }

        self.next_object += 1;
        Ok(Value::Object {
            id: self.next_object,
            class,
        })
    }

    fn statement(&mut self, module: &str, line: u32, text: &str, top_level: bool) -> Outcome {
        if let Some(rest) = text.strip_prefix("import ") {
            return self.import(module, line, rest);
        }
        if let Some(argument) = call_argument(text, "System.print(") {
            (self.callbacks.write)(argument);
            (self.callbacks.write)("\n");
            return Ok(());
        }
        if let Some(argument) = call_argument(text, "Fiber.abort(") {
            return Err(self.runtime_error(argument, Some((module, line))));
        }
        if top_level {
            return Err(self.compile_error(
                module,
                line,
                &format!("Error at '{}': Expected statement.", text),
            ));
        }
        Ok(())
    }

    fn import(&mut self, module: &str, line: u32, rest: &str) -> Outcome {
        let rest = rest.trim();
        let (quoted, names) = match rest.split_once(" for ") {
            Some((quoted, names)) => (quoted.trim(), Some(names)),
            None => (rest, None),
        };
        let Some(name) = string_literal(quoted) else {
            return Err(self.compile_error(module, line, "Expect a string after 'import'."));
        };

        let Some(resolved) = (self.callbacks.resolve_module)(module, name) else {
            let message = format!("Could not resolve module '{}' imported from '{}'.", name, module);
            return Err(self.runtime_error(&message, Some((module, line))));
        };

        if !self.modules.contains_key(&resolved) {
            let Some(source) = (self.callbacks.load_module)(&resolved) else {
                let message = format!("Could not load module '{}'.", resolved);
                return Err(self.runtime_error(&message, Some((module, line))));
            };
            self.modules.insert(resolved.clone(), HashMap::new());
            self.run_module(&resolved, &source)?;
        }

        for variable in names.into_iter().flat_map(|names| names.split(',')) {
            let variable = variable.trim();
            let Some(value) = self.lookup(&resolved, variable) else {
                let message = format!(
                    "Could not find a variable named '{}' in module '{}'.",
                    variable, resolved
                );
                return Err(self.runtime_error(&message, Some((module, line))));
            };
            self.define(module, variable, value);
        }
        Ok(())
    }

    fn dispatch(&mut self, receiver: &Value, signature: &str) -> Outcome {
        let (class, is_static) = match receiver {
            Value::Object { class, .. } => (*class, false),
            Value::Class(class) => (*class, true),
            Value::Foreign(index) if self.foreigns[*index].is_some() => {
                (self.foreign_class_of(receiver), false)
            }
            other => {
                let message = format!("{} does not implement '{}'.", self.type_name(other), signature);
                return Err(self.runtime_error(&message, None));
            }
        };

        let key = (is_static, signature.to_string());
        let module = self.classes[class].module.clone();
        if let Some(function) = self.classes[class].foreign_methods.get(&key).copied() {
            return match self.run_foreign(function) {
                Ok(_) => Ok(()),
                Err(message) => Err(self.runtime_error(&message, Some((module.as_str(), 0)))),
            };
        }
        if let Some(method) = self.classes[class].script_methods.get(&key) {
            let (line, body) = (method.line, method.body.clone());
            return self.statement(&module, line, &body, false);
        }

        let message = format!("{} does not implement '{}'.", self.type_name(receiver), signature);
        Err(self.runtime_error(&message, None))
    }
}

impl Drop for MockVm {
    fn drop(&mut self) {
        let live: Vec<_> = self.foreigns.iter_mut().filter_map(Option::take).collect();
        for object in live {
            self.finalize(object);
        }
    }
}

impl Slots for MockVm {
    fn ensure_slots(&mut self, count: usize) {
        if self.slots.len() < count {
            self.slots.resize(count, Value::Null);
        }
    }

    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn slot_type(&self, slot: usize) -> SlotType {
        self.slots[slot].slot_type()
    }

    fn get_slot_bool(&self, slot: usize) -> bool {
        match self.slots[slot] {
            Value::Bool(value) => value,
            ref other => panic!("slot {} holds {:?}, not a Bool", slot, other),
        }
    }

    fn get_slot_double(&self, slot: usize) -> f64 {
        match self.slots[slot] {
            Value::Num(value) => value,
            ref other => panic!("slot {} holds {:?}, not a Num", slot, other),
        }
    }

    fn get_slot_string(&self, slot: usize) -> Option<String> {
        match &self.slots[slot] {
            Value::Str(text) => Some(text.clone()),
            _ => None,
        }
    }

    fn set_slot_bool(&mut self, slot: usize, value: bool) {
        self.slots[slot] = Value::Bool(value);
    }

    fn set_slot_double(&mut self, slot: usize, value: f64) {
        self.slots[slot] = Value::Num(value);
    }

    fn set_slot_string(&mut self, slot: usize, value: &str) {
        self.slots[slot] = Value::str(value);
    }

    fn set_slot_null(&mut self, slot: usize) {
        self.slots[slot] = Value::Null;
    }

    fn set_slot_new_list(&mut self, slot: usize) {
        self.slots[slot] = Value::List(Rc::new(RefCell::new(Vec::new())));
    }

    fn get_list_count(&self, list_slot: usize) -> usize {
        match &self.slots[list_slot] {
            Value::List(items) => items.borrow().len(),
            other => panic!("slot {} holds {:?}, not a List", list_slot, other),
        }
    }

    fn get_list_element(&mut self, list_slot: usize, index: usize, element_slot: usize) {
        let element = match &self.slots[list_slot] {
            Value::List(items) => items.borrow()[index].clone(),
            other => panic!("slot {} holds {:?}, not a List", list_slot, other),
        };
        self.slots[element_slot] = element;
    }

    fn insert_in_list(&mut self, list_slot: usize, index: isize, element_slot: usize) {
        let element = self.slots[element_slot].clone();
        match &self.slots[list_slot] {
            Value::List(items) => {
                let mut items = items.borrow_mut();
                let at = if index < 0 {
                    items.len() as isize + 1 + index
                } else {
                    index
                };
                items.insert(at as usize, element);
            }
            other => panic!("slot {} holds {:?}, not a List", list_slot, other),
        }
    }

    fn set_slot_new_foreign(&mut self, slot: usize, class_slot: usize, data: Box<dyn Any>) {
        let class = match self.slots[class_slot] {
            Value::Class(class) => class,
            ref other => panic!("slot {} holds {:?}, not a class", class_slot, other),
        };
        self.foreigns.push(Some(ForeignObject { class, data }));
        self.slots[slot] = Value::Foreign(self.foreigns.len() - 1);
    }

    fn get_slot_foreign(&mut self, slot: usize) -> Option<&mut (dyn Any + 'static)> {
        match self.slots.get(slot) {
            Some(Value::Foreign(index)) => self
                .foreigns
                .get_mut(*index)?
                .as_mut()
                .map(|object| object.data.as_mut()),
            _ => None,
        }
    }

    fn get_variable(&mut self, module: &str, name: &str, slot: usize) {
        let value = self
            .lookup(module, name)
            .unwrap_or_else(|| panic!("variable {} is not defined in module {}", name, module));
        self.slots[slot] = value;
    }

    fn has_variable(&self, module: &str, name: &str) -> bool {
        self.lookup(module, name).is_some()
    }

    fn abort_fiber(&mut self, message: &str) {
        self.aborted = Some(message.to_string());
    }

    fn host(&mut self) -> &mut HostBindings {
        &mut self.host
    }
}

impl ScriptVm for MockVm {
    fn new(config: VmConfiguration) -> Self {
        let VmConfiguration {
            resolve_module,
            load_module,
            bind_foreign_method,
            bind_foreign_class,
            write,
            error,
            user_data,
        } = config;

        MockVm {
            callbacks: Callbacks {
                resolve_module,
                load_module,
                bind_foreign_method,
                bind_foreign_class,
                write,
                error,
            },
            host: user_data,
            slots: Vec::new(),
            modules: HashMap::new(),
            classes: Vec::new(),
            foreigns: Vec::new(),
            handles: HashMap::new(),
            next_handle: 0,
            next_object: 0,
            calls: Vec::new(),
            aborted: None,
        }
    }

    fn interpret(&mut self, module: &str, source: &str) -> InterpretResult {
        self.modules.entry(module.to_string()).or_default();
        match self.run_module(module, source) {
            Ok(()) => InterpretResult::Success,
            Err(result) => result,
        }
    }

    fn make_call_handle(&mut self, signature: &str) -> Handle {
        self.new_handle(HandleTarget::Method(signature.to_string()))
    }

    fn call(&mut self, method: &Handle) -> InterpretResult {
        let signature = match self.handles.get(&method.raw()) {
            Some(HandleTarget::Method(signature)) => signature.clone(),
            _ => panic!("handle {} is not a call handle", method.raw()),
        };
        let arity = signature.matches('_').count();
        assert!(
            self.slots.len() > arity,
            "call to {} needs {} slots",
            signature,
            arity + 1
        );

        let receiver = self.slots[0].clone();
        self.calls.push(RecordedCall {
            signature: signature.clone(),
            receiver: receiver.clone(),
            args: self.slots[1..=arity].to_vec(),
        });

        match self.dispatch(&receiver, &signature) {
            Ok(()) => InterpretResult::Success,
            Err(result) => result,
        }
    }

    fn get_slot_handle(&mut self, slot: usize) -> Handle {
        let value = self.slots[slot].clone();
        self.new_handle(HandleTarget::Value(value))
    }

    fn set_slot_handle(&mut self, slot: usize, handle: &Handle) {
        let value = match self.handles.get(&handle.raw()) {
            Some(HandleTarget::Value(value)) => value.clone(),
            _ => panic!("handle {} does not hold a value", handle.raw()),
        };
        self.slots[slot] = value;
    }

    fn release_handle(&mut self, handle: Handle) {
        assert!(
            self.handles.remove(&handle.raw()).is_some(),
            "handle {} released twice",
            handle.raw()
        );
    }
}

// ==================== 源码辅助 ====================

/// 由声明计算签名：`draw(x, y)` -> `draw(_,_)`，`x=(value)` -> `x=(_)`，`width` -> `width`
pub(crate) fn signature_of(declaration: &str) -> String {
    let declaration = declaration.trim();
    match declaration.split_once('(') {
        None => declaration.to_string(),
        Some((name, rest)) => {
            let params = rest.split(')').next().unwrap_or_default();
            let arity = params.split(',').filter(|p| !p.trim().is_empty()).count();
            format!("{}({})", name.trim(), vec!["_"; arity].join(","))
        }
    }
}

/// 列出源码中所有 `foreign` 方法声明
pub(crate) fn foreign_declarations(source: &str) -> Vec<ForeignDeclaration> {
    let mut class = String::new();
    let mut declarations = Vec::new();
    for line in source.lines().map(str::trim) {
        let header = line
            .strip_prefix("foreign class ")
            .or_else(|| line.strip_prefix("class "));
        if let Some(header) = header {
            class = header.split('{').next().unwrap_or_default().trim().to_string();
        } else if let Some(declaration) = line.strip_prefix("foreign ") {
            let (is_static, declaration) = split_static(declaration);
            declarations.push(ForeignDeclaration {
                class: class.clone(),
                signature: signature_of(declaration),
                is_static,
            });
        }
    }
    declarations
}

fn split_static(declaration: &str) -> (bool, &str) {
    match declaration.strip_prefix("static ") {
        Some(rest) => (true, rest),
        None => (false, declaration),
    }
}

/// `head { body }` 拆成头部和方法体
fn split_body(text: &str) -> Option<(&str, &str)> {
    let open = text.find('{')?;
    let close = text.rfind('}')?;
    if close < open {
        return None;
    }
    Some((text[..open].trim(), text[open + 1..close].trim()))
}

fn string_literal(text: &str) -> Option<&str> {
    text.strip_prefix('"')?.strip_suffix('"')
}

fn call_argument<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let argument = text.strip_prefix(prefix)?.strip_suffix(')')?.trim();
    Some(string_literal(argument).unwrap_or(argument))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_of() {
        assert_eq!(signature_of("draw(x, y, color)"), "draw(_,_,_)");
        assert_eq!(signature_of("clear()"), "clear()");
        assert_eq!(signature_of("width"), "width");
        assert_eq!(signature_of("volume=(value)"), "volume=(_)");
        assert_eq!(signature_of("+(other)"), "+(_)");
    }

    #[test]
    fn test_foreign_declarations() {
        let declarations = foreign_declarations(
            "class Timer {\n  foreign static delta\n}\nforeign class Sound {\n  foreign play()\n  stop() { }\n}",
        );
        assert_eq!(
            declarations,
            vec![
                ForeignDeclaration {
                    class: "Timer".to_string(),
                    signature: "delta".to_string(),
                    is_static: true,
                },
                ForeignDeclaration {
                    class: "Sound".to_string(),
                    signature: "play()".to_string(),
                    is_static: false,
                },
            ]
        );
    }

    #[test]
    fn test_list_slots() {
        let mut vm = MockVm::standalone();
        vm.load_slots(vec![Value::Null, Value::Num(1.0)]);
        vm.set_slot_new_list(0);
        vm.insert_in_list(0, -1, 1);
        vm.set_slot_double(1, 0.0);
        vm.insert_in_list(0, 0, 1);
        assert_eq!(vm.slot(0).as_nums(), Some(vec![0.0, 1.0]));
        assert_eq!(vm.get_list_count(0), 2);
    }
}

//! 核心宏定义
//!
//! 提供统一的宏来减少代码重复

/// 为结构体实现Default trait的宏
///
/// 使用示例:
/// ```rust
/// struct MyStruct {
///     field1: u32,
///     field2: String,
/// }
///
/// tico_wren::impl_default!(MyStruct {
///     field1: 0,
///     field2: String::new(),
/// });
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}

/// 定义一个原生方法
///
/// 方法体返回 `SlotResult<()>`，可以直接用 `?` 读取参数。
/// 生成的函数签名是 `fn(&mut dyn Slots)`，可以直接放进绑定表；
/// 方法体返回错误时中止当前 fiber，错误信息交给解释器报告。
///
/// 使用示例:
/// ```rust,ignore
/// foreign_fn! {
///     /// Timer.delta
///     fn timer_delta(vm) {
///         let delta = vm.host().time.delta_time;
///         vm.set_slot_double(0, delta as f64);
///         Ok(())
///     }
/// }
/// ```
#[macro_export]
macro_rules! foreign_fn {
    ($(
        $(#[$meta:meta])*
        $vis:vis fn $name:ident($vm:ident) $body:block
    )*) => {
        $(
            $(#[$meta])*
            $vis fn $name(vm: &mut dyn $crate::scripting::Slots) {
                fn body(
                    $vm: &mut dyn $crate::scripting::Slots,
                ) -> $crate::core::error::SlotResult<()> $body

                if let Err(err) = body(vm) {
                    $crate::tracing::trace!(target: "bindings", "{} aborted: {}", stringify!($name), err);
                    vm.abort_fiber(&err.to_string());
                }
            }
        )*
    };
}

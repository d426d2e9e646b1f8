//! 原生绑定层
//!
//! 脚本通过 `import "tico.xxx"` 引入内嵌模块，模块里的 `foreign` 声明在类定义时
//! 由解释器回调解析到这里的原生函数。原生函数不直接操作引擎，
//! 而是把 [`BindingCommand`] 推入命令队列，由引擎在帧末统一消费。
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  main.wren / 用户模块                         │
//! │        │ import "tico.graphics" ...           │
//! │        v                                      │
//! │  内嵌模块 (bindings/wren/*.wren)              │
//! │        │ foreign static clear(color)          │
//! │        v                                      │
//! │  ClassRegistry ──> foreign_fn! 原生函数       │
//! │                          │                    │
//! │                          v                    │
//! │  HostBindings: 输入/时间状态 + CommandQueue    │
//! │                          │                    │
//! │                          v                    │
//! │  引擎 (渲染、音频、资源)                       │
//! └──────────────────────────────────────────────┘
//! ```

pub mod audio;
pub mod graphics;
pub mod input;
pub mod marshal;
pub mod math;
pub mod protocol;
pub mod registry;
pub mod timer;

pub use marshal::{to_color, to_rectangle, Color, Rectangle};
pub use protocol::{BindingCommand, CommandQueue, HostBindings, InputState, TimeState};
pub use registry::{ClassBinding, ClassRegistry, ForeignClassMethods, MethodBinding};

/// 引擎内置的原生类，按注册顺序排列
pub static BUILTIN_CLASSES: &[ClassBinding] = &[
    graphics::RENDER,
    input::INPUT,
    timer::TIMER,
    graphics::TEXTURE,
    graphics::COLORF,
    audio::SOUND,
    audio::AUDIO,
    graphics::CANVAS,
    math::VECTOR2,
];

//! 脚本会话
//!
//! 管理一个解释器从创建到销毁的完整生命周期：
//!
//! ```text
//! Uninitialized → Configuring → BootstrapAttempted ─┬→ Ready
//!                                                   └→ NotLoaded
//! ```
//!
//! 启动时只看项目根目录下是否存在 `main.wren`。存在时在 `tico_game` 模块中执行
//! 两行引导脚本，取得全局变量 `g` 的持久句柄以及 `update(_)`、`draw()` 的调用句柄；
//! 不存在或引导失败时进入 `NotLoaded`，之后每帧的 `update`/`draw` 都不做任何事。

use crate::bindings::protocol::{BindingCommand, HostBindings};
use crate::bindings::registry::ClassRegistry;
use crate::config::ScriptConfig;
use crate::core::error::ScriptResult;
use crate::scripting::callbacks;
use crate::scripting::modules::{resolve_module_name, ModuleLoader};
use crate::scripting::vm::{Handle, InterpretResult, ScriptVm, VmConfiguration};

/// 入口模块名，对应项目根目录下的 `main.wren`
pub const ENTRY_MODULE: &str = "main";

/// 引导脚本所在的模块
pub const GAME_MODULE: &str = "tico_game";

/// 引导脚本定义的全局变量
pub const GAME_VARIABLE: &str = "g";

/// 引导脚本
pub const BOOTSTRAP_SOURCE: &str = "import \"main\" for Game\nvar g = Game.load()";

pub const UPDATE_SIGNATURE: &str = "update(_)";
pub const DRAW_SIGNATURE: &str = "draw()";

/// 会话生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Configuring,
    BootstrapAttempted,
    /// 引导成功，每帧调用脚本
    Ready,
    /// 没有入口文件或引导失败，终止状态
    NotLoaded,
}

struct GameHandles {
    game: Handle,
    update: Handle,
    draw: Handle,
}

/// 脚本会话
///
/// 独占解释器以及从它派生的所有句柄，销毁时一并释放。
pub struct VmSession<V: ScriptVm> {
    vm: V,
    state: LifecycleState,
    handles: Option<GameHandles>,
}

impl<V: ScriptVm> VmSession<V> {
    /// 按配置创建解释器并引导入口脚本
    ///
    /// 只有配置或原生类表校验失败时返回错误；找不到入口脚本不是错误。
    pub fn new(config: &ScriptConfig) -> ScriptResult<Self> {
        config.validate()?;
        transition(LifecycleState::Uninitialized, LifecycleState::Configuring);
        Self::with_configuration(config, callbacks::configure(config))
    }

    /// 使用给定的解释器回调创建会话
    pub fn with_configuration(
        config: &ScriptConfig,
        vm_config: VmConfiguration,
    ) -> ScriptResult<Self> {
        if config.validate_bindings {
            ClassRegistry::builtin().validate()?;
        }

        let mut session = VmSession {
            vm: V::new(vm_config),
            state: LifecycleState::Configuring,
            handles: None,
        };
        session.bootstrap(&ModuleLoader::new(config.project_root.clone()));
        Ok(session)
    }

    fn set_state(&mut self, next: LifecycleState) {
        transition(self.state, next);
        self.state = next;
    }

    fn bootstrap(&mut self, loader: &ModuleLoader) {
        self.set_state(LifecycleState::BootstrapAttempted);

        let entry = resolve_module_name(GAME_MODULE, ENTRY_MODULE);
        if !loader.file_exists(&entry) {
            tracing::error!(
                target: "scripting",
                "{} not found in {:?}, scripts are disabled",
                entry,
                loader.root()
            );
            self.set_state(LifecycleState::NotLoaded);
            return;
        }

        let result = self.vm.interpret(GAME_MODULE, BOOTSTRAP_SOURCE);
        if !result.is_success() || !self.vm.has_variable(GAME_MODULE, GAME_VARIABLE) {
            tracing::error!(
                target: "scripting",
                "Bootstrap of {} failed ({:?}), scripts are disabled",
                entry,
                result
            );
            self.set_state(LifecycleState::NotLoaded);
            return;
        }

        self.vm.ensure_slots(1);
        self.vm.get_variable(GAME_MODULE, GAME_VARIABLE, 0);
        let game = self.vm.get_slot_handle(0);
        let update = self.vm.make_call_handle(UPDATE_SIGNATURE);
        let draw = self.vm.make_call_handle(DRAW_SIGNATURE);
        self.handles = Some(GameHandles { game, update, draw });
        self.set_state(LifecycleState::Ready);
    }

    /// 每帧调用一次 `g.update(dt)`
    ///
    /// 脚本错误由解释器的错误回调报告，这里只返回解释器的结果。
    pub fn update(&mut self, dt: f64) -> Option<InterpretResult> {
        let handles = self.handles.as_ref()?;
        self.vm.host().time.advance(dt as f32);
        self.vm.ensure_slots(2);
        self.vm.set_slot_handle(0, &handles.game);
        self.vm.set_slot_double(1, dt);
        Some(self.vm.call(&handles.update))
    }

    /// 每帧调用一次 `g.draw()`
    pub fn draw(&mut self) -> Option<InterpretResult> {
        let handles = self.handles.as_ref()?;
        self.vm.ensure_slots(1);
        self.vm.set_slot_handle(0, &handles.game);
        Some(self.vm.call(&handles.draw))
    }

    /// 释放所有句柄，只在会话析构时调用
    fn unload(&mut self) {
        if let Some(GameHandles { game, update, draw }) = self.handles.take() {
            self.vm.release_handle(game);
            self.vm.release_handle(update);
            self.vm.release_handle(draw);
            self.set_state(LifecycleState::NotLoaded);
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LifecycleState::Ready
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn vm(&self) -> &V {
        &self.vm
    }

    pub fn vm_mut(&mut self) -> &mut V {
        &mut self.vm
    }

    /// 引擎写入输入/时间状态的入口
    pub fn host_mut(&mut self) -> &mut HostBindings {
        self.vm.host()
    }

    /// 取出本帧脚本产生的命令
    pub fn drain_commands(&mut self) -> Vec<BindingCommand> {
        self.vm.host().drain_commands()
    }
}

impl<V: ScriptVm> Drop for VmSession<V> {
    fn drop(&mut self) {
        self.unload();
    }
}

fn transition(from: LifecycleState, to: LifecycleState) {
    tracing::debug!(target: "scripting", "Script session {:?} -> {:?}", from, to);
}

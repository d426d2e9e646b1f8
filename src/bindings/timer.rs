//! 计时绑定 (`tico.timer`)

use super::registry::{ClassBinding, MethodBinding};
use crate::foreign_fn;

static TIMER_METHODS: &[MethodBinding] = &[
    MethodBinding::new("s_delta", timer_delta),
    MethodBinding::new("s_time", timer_time),
    MethodBinding::new("s_fps", timer_fps),
];

pub const TIMER: ClassBinding = ClassBinding::statics("Timer", TIMER_METHODS);

foreign_fn! {
    fn timer_delta(vm) {
        let delta = vm.host().time.delta_time;
        vm.set_slot_double(0, delta as f64);
        Ok(())
    }

    fn timer_time(vm) {
        let total = vm.host().time.total_time;
        vm.set_slot_double(0, total);
        Ok(())
    }

    fn timer_fps(vm) {
        let fps = vm.host().time.fps;
        vm.set_slot_double(0, fps.round() as f64);
        Ok(())
    }
}

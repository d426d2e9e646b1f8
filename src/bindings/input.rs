//! 输入绑定 (`tico.input`)

use super::marshal::{set_slot_num_list, slot_num, slot_string};
use super::registry::{ClassBinding, MethodBinding};
use crate::foreign_fn;

static INPUT_METHODS: &[MethodBinding] = &[
    MethodBinding::new("s_isKeyDown(_)", input_is_key_down),
    MethodBinding::new("s_isKeyPressed(_)", input_is_key_pressed),
    MethodBinding::new("s_isMouseDown(_)", input_is_mouse_down),
    MethodBinding::new("s_mouseX", input_mouse_x),
    MethodBinding::new("s_mouseY", input_mouse_y),
    MethodBinding::new("s_mousePosition", input_mouse_position),
];

pub const INPUT: ClassBinding = ClassBinding::statics("Input", INPUT_METHODS);

foreign_fn! {
    fn input_is_key_down(vm) {
        let key = slot_string(vm, 1, "key")?;
        let down = vm.host().input.is_key_down(&key);
        vm.set_slot_bool(0, down);
        Ok(())
    }

    fn input_is_key_pressed(vm) {
        let key = slot_string(vm, 1, "key")?;
        let pressed = vm.host().input.is_key_pressed(&key);
        vm.set_slot_bool(0, pressed);
        Ok(())
    }

    /// 0 左键，1 右键，2 中键
    fn input_is_mouse_down(vm) {
        let button = slot_num(vm, 1, "button")?;
        let down = button >= 0.0 && vm.host().input.is_mouse_down(button as usize);
        vm.set_slot_bool(0, down);
        Ok(())
    }

    fn input_mouse_x(vm) {
        let x = vm.host().input.mouse_position[0];
        vm.set_slot_double(0, x as f64);
        Ok(())
    }

    fn input_mouse_y(vm) {
        let y = vm.host().input.mouse_position[1];
        vm.set_slot_double(0, y as f64);
        Ok(())
    }

    fn input_mouse_position(vm) {
        let [x, y] = vm.host().input.mouse_position;
        set_slot_num_list(vm, 0, &[x as f64, y as f64]);
        Ok(())
    }
}

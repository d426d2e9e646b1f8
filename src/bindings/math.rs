//! 数学绑定 (`tico.math`)
//!
//! `Vector2` 的运算返回新实例：先把类读到临时槽位，再在槽位 0 创建外部对象。

use super::marshal::{foreign_mut, slot_f32};
use super::registry::{ClassBinding, MethodBinding};
use crate::core::error::SlotResult;
use crate::foreign_fn;
use crate::scripting::vm::Slots;
use glam::Vec2;
use std::any::Any;

/// `Vector2` 所在的模块
pub const MATH_MODULE: &str = "tico.math";

/// 二维向量实例数据
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector2Data(pub Vec2);

static VECTOR2_METHODS: &[MethodBinding] = &[
    MethodBinding::new("x", vector2_x),
    MethodBinding::new("y", vector2_y),
    MethodBinding::new("x=(_)", vector2_set_x),
    MethodBinding::new("y=(_)", vector2_set_y),
    MethodBinding::new("+(_)", vector2_add),
    MethodBinding::new("-(_)", vector2_sub),
    MethodBinding::new("*(_)", vector2_scale),
    MethodBinding::new("length", vector2_length),
    MethodBinding::new("dot(_)", vector2_dot),
    MethodBinding::new("normalized", vector2_normalized),
];

pub const VECTOR2: ClassBinding =
    ClassBinding::foreign("Vector2", vector2_allocate, vector2_finalize, VECTOR2_METHODS);

fn receiver(vm: &mut dyn Slots) -> SlotResult<Vec2> {
    Ok(foreign_mut::<Vector2Data>(vm, 0, "Vector2")?.0)
}

fn operand(vm: &mut dyn Slots) -> SlotResult<Vec2> {
    Ok(foreign_mut::<Vector2Data>(vm, 1, "other")?.0)
}

/// 把结果作为新的 `Vector2` 放到槽位 0
fn return_vector(vm: &mut dyn Slots, value: Vec2) {
    vm.ensure_slots(3);
    vm.get_variable(MATH_MODULE, "Vector2", 2);
    vm.set_slot_new_foreign(0, 2, Box::new(Vector2Data(value)));
}

foreign_fn! {
    /// `Vector2.new(x, y)`
    fn vector2_allocate(vm) {
        let x = slot_f32(vm, 1, "x")?;
        let y = slot_f32(vm, 2, "y")?;
        vm.set_slot_new_foreign(0, 0, Box::new(Vector2Data(Vec2::new(x, y))));
        Ok(())
    }

    fn vector2_x(vm) {
        let value = receiver(vm)?;
        vm.set_slot_double(0, value.x as f64);
        Ok(())
    }

    fn vector2_y(vm) {
        let value = receiver(vm)?;
        vm.set_slot_double(0, value.y as f64);
        Ok(())
    }

    fn vector2_set_x(vm) {
        let x = slot_f32(vm, 1, "x")?;
        foreign_mut::<Vector2Data>(vm, 0, "Vector2")?.0.x = x;
        Ok(())
    }

    fn vector2_set_y(vm) {
        let y = slot_f32(vm, 1, "y")?;
        foreign_mut::<Vector2Data>(vm, 0, "Vector2")?.0.y = y;
        Ok(())
    }

    fn vector2_add(vm) {
        let sum = receiver(vm)? + operand(vm)?;
        return_vector(vm, sum);
        Ok(())
    }

    fn vector2_sub(vm) {
        let difference = receiver(vm)? - operand(vm)?;
        return_vector(vm, difference);
        Ok(())
    }

    fn vector2_scale(vm) {
        let scalar = slot_f32(vm, 1, "scalar")?;
        let scaled = receiver(vm)? * scalar;
        return_vector(vm, scaled);
        Ok(())
    }

    fn vector2_length(vm) {
        let length = receiver(vm)?.length();
        vm.set_slot_double(0, length as f64);
        Ok(())
    }

    fn vector2_dot(vm) {
        let dot = receiver(vm)?.dot(operand(vm)?);
        vm.set_slot_double(0, dot as f64);
        Ok(())
    }

    /// 零向量归一化后仍是零向量
    fn vector2_normalized(vm) {
        let normalized = receiver(vm)?.normalize_or_zero();
        return_vector(vm, normalized);
        Ok(())
    }
}

fn vector2_finalize(_data: &mut (dyn Any + 'static)) {}

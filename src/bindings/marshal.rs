//! 槽位数据转换
//!
//! 把脚本侧的值转换为原生类型：数字、字符串、外部对象，
//! 以及把列表转换为定长的 [`Color`]/[`Rectangle`]。
//!
//! 列表转换规则：按顺序读取 `0..count` 的元素；
//! 元素少于定长时其余字段保持默认值（颜色为白色，矩形为 0），
//! 多出的元素被忽略；槽位不是列表或元素不是数字时返回 [`SlotError`]。

use crate::core::error::{SlotError, SlotResult};
use crate::scripting::vm::{SlotType, Slots};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// RGBA8 颜色
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// 从数字构造，超出 `0..=255` 的分量饱和截断
    pub fn from_components(components: [f64; 4]) -> Self {
        let [r, g, b, a] = components;
        Self::new(r as u8, g as u8, b as u8, a as u8)
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// 矩形
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_components(components: [f64; 4]) -> Self {
        let [x, y, width, height] = components;
        Self::new(x as f32, y as f32, width as f32, height as f32)
    }
}

/// 读取数字参数
pub fn slot_num(vm: &dyn Slots, slot: usize, what: &'static str) -> SlotResult<f64> {
    if vm.slot_type(slot) != SlotType::Num {
        return Err(SlotError::num(what));
    }
    Ok(vm.get_slot_double(slot))
}

pub fn slot_f32(vm: &dyn Slots, slot: usize, what: &'static str) -> SlotResult<f32> {
    slot_num(vm, slot, what).map(|value| value as f32)
}

/// 读取字符串参数
pub fn slot_string(vm: &dyn Slots, slot: usize, what: &'static str) -> SlotResult<String> {
    if vm.slot_type(slot) != SlotType::String {
        return Err(SlotError::string(what));
    }
    vm.get_slot_string(slot).ok_or(SlotError::string(what))
}

/// 读取外部对象的数据
pub fn foreign_mut<'a, T: 'static>(
    vm: &'a mut dyn Slots,
    slot: usize,
    what: &'static str,
) -> SlotResult<&'a mut T> {
    vm.get_slot_foreign(slot)
        .and_then(|data| data.downcast_mut::<T>())
        .ok_or(SlotError::Foreign(what))
}

/// 取一个不与参数冲突的临时槽位
///
/// 槽位 0 是接收者，不能用作临时槽位。
fn scratch_slot(vm: &mut dyn Slots) -> usize {
    let scratch = vm.slot_count();
    vm.ensure_slots(scratch + 1);
    scratch
}

/// 把数字列表读到定长数组，`values` 提供缺省值
fn read_num_list<const N: usize>(
    vm: &mut dyn Slots,
    slot: usize,
    what: &'static str,
    mut values: [f64; N],
) -> SlotResult<[f64; N]> {
    if vm.slot_type(slot) != SlotType::List {
        return Err(SlotError::list(what));
    }

    let count = vm.get_list_count(slot).min(N);
    let scratch = scratch_slot(vm);
    for (index, value) in values.iter_mut().enumerate().take(count) {
        vm.get_list_element(slot, index, scratch);
        *value = slot_num(vm, scratch, what)?;
    }
    Ok(values)
}

/// 把 `[r, g, b, a]` 列表转换为颜色
pub fn to_color(vm: &mut dyn Slots, slot: usize) -> SlotResult<Color> {
    read_num_list(vm, slot, "Color", [255.0; 4]).map(Color::from_components)
}

/// 把 `[x, y, width, height]` 列表转换为矩形
pub fn to_rectangle(vm: &mut dyn Slots, slot: usize) -> SlotResult<Rectangle> {
    read_num_list(vm, slot, "Rectangle", [0.0; 4]).map(Rectangle::from_components)
}

/// 在槽位中创建数字列表
pub fn set_slot_num_list(vm: &mut dyn Slots, slot: usize, values: &[f64]) {
    let scratch = scratch_slot(vm);
    vm.set_slot_new_list(slot);
    for value in values {
        vm.set_slot_double(scratch, *value);
        vm.insert_in_list(slot, -1, scratch);
    }
}

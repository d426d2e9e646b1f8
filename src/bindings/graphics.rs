//! 图形绑定 (`tico.graphics`)
//!
//! `Render` 只有静态方法；`Texture`、`ColorF`、`Canvas` 是外部类，
//! 纹理与画布的数据只保存引擎资源 id，真正的加载和绘制由引擎消费命令队列完成。

use super::marshal::{
    foreign_mut, set_slot_num_list, slot_f32, slot_num, slot_string, to_color, to_rectangle,
    Rectangle,
};
use super::protocol::{BindingCommand, CommandQueue, ResourceId};
use super::registry::{ClassBinding, MethodBinding};
use crate::core::error::SlotResult;
use crate::foreign_fn;
use crate::scripting::vm::Slots;
use glam::Vec4;
use std::any::Any;

/// 纹理实例数据
#[derive(Debug)]
pub struct TextureData {
    pub id: ResourceId,
    queue: CommandQueue,
}

/// 浮点颜色实例数据
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorFData(pub Vec4);

/// 画布实例数据
#[derive(Debug)]
pub struct CanvasData {
    pub id: ResourceId,
    pub width: u32,
    pub height: u32,
    queue: CommandQueue,
}

static RENDER_METHODS: &[MethodBinding] = &[
    MethodBinding::new("s_clear(_)", render_clear),
    MethodBinding::new("s_drawRectangle(_,_,_,_,_)", render_draw_rectangle),
    MethodBinding::new("s_fillRectangle(_,_,_,_,_)", render_fill_rectangle),
    MethodBinding::new("s_drawRect(_,_)", render_draw_rect),
    MethodBinding::new("s_fillRect(_,_)", render_fill_rect),
    MethodBinding::new("s_drawCircle(_,_,_,_)", render_draw_circle),
    MethodBinding::new("s_fillCircle(_,_,_,_)", render_fill_circle),
    MethodBinding::new("s_drawLine(_,_,_,_,_)", render_draw_line),
    MethodBinding::new("s_drawText(_,_,_,_)", render_draw_text),
];

static TEXTURE_METHODS: &[MethodBinding] = &[
    MethodBinding::new("width", texture_width),
    MethodBinding::new("height", texture_height),
    MethodBinding::new("draw(_,_,_)", texture_draw),
    MethodBinding::new("drawPart(_,_,_,_)", texture_draw_part),
];

static COLORF_METHODS: &[MethodBinding] = &[
    MethodBinding::new("r", colorf_r),
    MethodBinding::new("g", colorf_g),
    MethodBinding::new("b", colorf_b),
    MethodBinding::new("a", colorf_a),
    MethodBinding::new("r=(_)", colorf_set_r),
    MethodBinding::new("g=(_)", colorf_set_g),
    MethodBinding::new("b=(_)", colorf_set_b),
    MethodBinding::new("a=(_)", colorf_set_a),
    MethodBinding::new("toList", colorf_to_list),
];

static CANVAS_METHODS: &[MethodBinding] = &[
    MethodBinding::new("width", canvas_width),
    MethodBinding::new("height", canvas_height),
    MethodBinding::new("attach()", canvas_attach),
    MethodBinding::new("detach()", canvas_detach),
    MethodBinding::new("draw(_,_,_)", canvas_draw),
];

pub const RENDER: ClassBinding = ClassBinding::statics("Render", RENDER_METHODS);
pub const TEXTURE: ClassBinding =
    ClassBinding::foreign("Texture", texture_allocate, texture_finalize, TEXTURE_METHODS);
pub const COLORF: ClassBinding =
    ClassBinding::foreign("ColorF", colorf_allocate, colorf_finalize, COLORF_METHODS);
pub const CANVAS: ClassBinding =
    ClassBinding::foreign("Canvas", canvas_allocate, canvas_finalize, CANVAS_METHODS);

// ==================== Render ====================

fn draw_rectangle(vm: &mut dyn Slots, fill: bool) -> SlotResult<()> {
    let x = slot_f32(vm, 1, "x")?;
    let y = slot_f32(vm, 2, "y")?;
    let width = slot_f32(vm, 3, "width")?;
    let height = slot_f32(vm, 4, "height")?;
    let color = to_color(vm, 5)?;
    vm.host().push(BindingCommand::DrawRectangle {
        rect: Rectangle::new(x, y, width, height),
        color,
        fill,
    });
    Ok(())
}

fn draw_rect(vm: &mut dyn Slots, fill: bool) -> SlotResult<()> {
    let rect = to_rectangle(vm, 1)?;
    let color = to_color(vm, 2)?;
    vm.host()
        .push(BindingCommand::DrawRectangle { rect, color, fill });
    Ok(())
}

fn draw_circle(vm: &mut dyn Slots, fill: bool) -> SlotResult<()> {
    let x = slot_f32(vm, 1, "x")?;
    let y = slot_f32(vm, 2, "y")?;
    let radius = slot_f32(vm, 3, "radius")?;
    let color = to_color(vm, 4)?;
    vm.host().push(BindingCommand::DrawCircle {
        x,
        y,
        radius,
        color,
        fill,
    });
    Ok(())
}

foreign_fn! {
    fn render_clear(vm) {
        let color = to_color(vm, 1)?;
        vm.host().push(BindingCommand::Clear { color });
        Ok(())
    }

    fn render_draw_rectangle(vm) {
        draw_rectangle(vm, false)
    }

    fn render_fill_rectangle(vm) {
        draw_rectangle(vm, true)
    }

    fn render_draw_rect(vm) {
        draw_rect(vm, false)
    }

    fn render_fill_rect(vm) {
        draw_rect(vm, true)
    }

    fn render_draw_circle(vm) {
        draw_circle(vm, false)
    }

    fn render_fill_circle(vm) {
        draw_circle(vm, true)
    }

    fn render_draw_line(vm) {
        let from = [slot_f32(vm, 1, "x0")?, slot_f32(vm, 2, "y0")?];
        let to = [slot_f32(vm, 3, "x1")?, slot_f32(vm, 4, "y1")?];
        let color = to_color(vm, 5)?;
        vm.host().push(BindingCommand::DrawLine { from, to, color });
        Ok(())
    }

    fn render_draw_text(vm) {
        let text = slot_string(vm, 1, "text")?;
        let x = slot_f32(vm, 2, "x")?;
        let y = slot_f32(vm, 3, "y")?;
        let color = to_color(vm, 4)?;
        vm.host().push(BindingCommand::DrawText { text, x, y, color });
        Ok(())
    }
}

// ==================== Texture ====================

foreign_fn! {
    /// `Texture.load(path)`
    fn texture_allocate(vm) {
        let path = slot_string(vm, 1, "path")?;
        let host = vm.host();
        let id = host.next_resource_id();
        host.push(BindingCommand::LoadTexture { texture: id, path });
        let queue = host.commands().clone();
        vm.set_slot_new_foreign(0, 0, Box::new(TextureData { id, queue }));
        Ok(())
    }

    fn texture_width(vm) {
        let id = foreign_mut::<TextureData>(vm, 0, "Texture")?.id;
        let width = vm.host().texture_size(id).map_or(0, |size| size[0]);
        vm.set_slot_double(0, width as f64);
        Ok(())
    }

    fn texture_height(vm) {
        let id = foreign_mut::<TextureData>(vm, 0, "Texture")?.id;
        let height = vm.host().texture_size(id).map_or(0, |size| size[1]);
        vm.set_slot_double(0, height as f64);
        Ok(())
    }

    fn texture_draw(vm) {
        let texture = foreign_mut::<TextureData>(vm, 0, "Texture")?.id;
        let x = slot_f32(vm, 1, "x")?;
        let y = slot_f32(vm, 2, "y")?;
        let color = to_color(vm, 3)?;
        vm.host().push(BindingCommand::DrawTexture {
            texture,
            x,
            y,
            part: None,
            color,
        });
        Ok(())
    }

    fn texture_draw_part(vm) {
        let texture = foreign_mut::<TextureData>(vm, 0, "Texture")?.id;
        let part = to_rectangle(vm, 1)?;
        let x = slot_f32(vm, 2, "x")?;
        let y = slot_f32(vm, 3, "y")?;
        let color = to_color(vm, 4)?;
        vm.host().push(BindingCommand::DrawTexture {
            texture,
            x,
            y,
            part: Some(part),
            color,
        });
        Ok(())
    }
}

fn texture_finalize(data: &mut (dyn Any + 'static)) {
    if let Some(texture) = data.downcast_mut::<TextureData>() {
        tracing::trace!(target: "bindings", "Texture {} finalized", texture.id);
        texture
            .queue
            .push(BindingCommand::UnloadTexture { texture: texture.id });
    }
}

// ==================== ColorF ====================

fn colorf_get(vm: &mut dyn Slots, index: usize) -> SlotResult<()> {
    let color = foreign_mut::<ColorFData>(vm, 0, "ColorF")?.0;
    vm.set_slot_double(0, color[index] as f64);
    Ok(())
}

fn colorf_set(vm: &mut dyn Slots, index: usize) -> SlotResult<()> {
    let value = slot_f32(vm, 1, "value")?;
    foreign_mut::<ColorFData>(vm, 0, "ColorF")?.0[index] = value;
    Ok(())
}

foreign_fn! {
    /// `ColorF.new(r, g, b, a)`
    fn colorf_allocate(vm) {
        let r = slot_f32(vm, 1, "r")?;
        let g = slot_f32(vm, 2, "g")?;
        let b = slot_f32(vm, 3, "b")?;
        let a = slot_f32(vm, 4, "a")?;
        vm.set_slot_new_foreign(0, 0, Box::new(ColorFData(Vec4::new(r, g, b, a))));
        Ok(())
    }

    fn colorf_r(vm) { colorf_get(vm, 0) }
    fn colorf_g(vm) { colorf_get(vm, 1) }
    fn colorf_b(vm) { colorf_get(vm, 2) }
    fn colorf_a(vm) { colorf_get(vm, 3) }
    fn colorf_set_r(vm) { colorf_set(vm, 0) }
    fn colorf_set_g(vm) { colorf_set(vm, 1) }
    fn colorf_set_b(vm) { colorf_set(vm, 2) }
    fn colorf_set_a(vm) { colorf_set(vm, 3) }

    fn colorf_to_list(vm) {
        let color = foreign_mut::<ColorFData>(vm, 0, "ColorF")?.0;
        let components = color.to_array().map(|c| c as f64);
        set_slot_num_list(vm, 0, &components);
        Ok(())
    }
}

fn colorf_finalize(_data: &mut (dyn Any + 'static)) {}

// ==================== Canvas ====================

foreign_fn! {
    /// `Canvas.new(width, height)`
    fn canvas_allocate(vm) {
        let width = slot_num(vm, 1, "width")? as u32;
        let height = slot_num(vm, 2, "height")? as u32;
        let host = vm.host();
        let id = host.next_resource_id();
        host.push(BindingCommand::CreateCanvas {
            canvas: id,
            width,
            height,
        });
        let queue = host.commands().clone();
        vm.set_slot_new_foreign(
            0,
            0,
            Box::new(CanvasData {
                id,
                width,
                height,
                queue,
            }),
        );
        Ok(())
    }

    fn canvas_width(vm) {
        let width = foreign_mut::<CanvasData>(vm, 0, "Canvas")?.width;
        vm.set_slot_double(0, width as f64);
        Ok(())
    }

    fn canvas_height(vm) {
        let height = foreign_mut::<CanvasData>(vm, 0, "Canvas")?.height;
        vm.set_slot_double(0, height as f64);
        Ok(())
    }

    fn canvas_attach(vm) {
        let canvas = foreign_mut::<CanvasData>(vm, 0, "Canvas")?.id;
        vm.host().push(BindingCommand::AttachCanvas { canvas });
        Ok(())
    }

    fn canvas_detach(vm) {
        foreign_mut::<CanvasData>(vm, 0, "Canvas")?;
        vm.host().push(BindingCommand::DetachCanvas);
        Ok(())
    }

    fn canvas_draw(vm) {
        let canvas = foreign_mut::<CanvasData>(vm, 0, "Canvas")?.id;
        let x = slot_f32(vm, 1, "x")?;
        let y = slot_f32(vm, 2, "y")?;
        let color = to_color(vm, 3)?;
        vm.host().push(BindingCommand::DrawCanvas { canvas, x, y, color });
        Ok(())
    }
}

fn canvas_finalize(data: &mut (dyn Any + 'static)) {
    if let Some(canvas) = data.downcast_mut::<CanvasData>() {
        tracing::trace!(target: "bindings", "Canvas {} finalized", canvas.id);
        canvas
            .queue
            .push(BindingCommand::UnloadCanvas { canvas: canvas.id });
    }
}

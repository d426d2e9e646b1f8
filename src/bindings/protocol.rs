//! Host Command Protocol
//!
//! Native methods never talk to the renderer or the mixer directly. They
//! translate script calls into [`BindingCommand`]s pushed onto a shared
//! [`CommandQueue`], and read the per-frame [`InputState`]/[`TimeState`]
//! snapshot that the engine loop writes into [`HostBindings`].

use super::marshal::{Color, Rectangle};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

/// Engine resource id handed out by [`HostBindings::next_resource_id`]
pub type ResourceId = u32;

/// Commands sent from scripts to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BindingCommand {
    // Render
    Clear {
        color: Color,
    },
    DrawRectangle {
        rect: Rectangle,
        color: Color,
        fill: bool,
    },
    DrawCircle {
        x: f32,
        y: f32,
        radius: f32,
        color: Color,
        fill: bool,
    },
    DrawLine {
        from: [f32; 2],
        to: [f32; 2],
        color: Color,
    },
    DrawText {
        text: String,
        x: f32,
        y: f32,
        color: Color,
    },

    // Texture
    LoadTexture {
        texture: ResourceId,
        path: String,
    },
    DrawTexture {
        texture: ResourceId,
        x: f32,
        y: f32,
        part: Option<Rectangle>,
        color: Color,
    },
    UnloadTexture {
        texture: ResourceId,
    },

    // Canvas
    CreateCanvas {
        canvas: ResourceId,
        width: u32,
        height: u32,
    },
    AttachCanvas {
        canvas: ResourceId,
    },
    DetachCanvas,
    DrawCanvas {
        canvas: ResourceId,
        x: f32,
        y: f32,
        color: Color,
    },
    UnloadCanvas {
        canvas: ResourceId,
    },

    // Audio
    LoadSound {
        sound: ResourceId,
        path: String,
    },
    PlaySound {
        sound: ResourceId,
    },
    StopSound {
        sound: ResourceId,
    },
    PauseSound {
        sound: ResourceId,
    },
    SetSoundVolume {
        sound: ResourceId,
        volume: f32,
    },
    UnloadSound {
        sound: ResourceId,
    },
    SetMasterVolume {
        volume: f32,
    },
    StopAllSounds,
}

/// Shared command queue for Script -> Engine communication
///
/// Cloning shares the same queue; foreign objects keep a clone so their
/// finalizers can still report released resources.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    commands: Rc<RefCell<VecDeque<BindingCommand>>>,
}

impl CommandQueue {
    pub fn push(&self, cmd: BindingCommand) {
        self.commands.borrow_mut().push_back(cmd);
    }

    pub fn drain(&self) -> Vec<BindingCommand> {
        self.commands.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.borrow().is_empty()
    }
}

/// Keyboard and mouse snapshot for the current frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Keys held down this frame
    pub keys_down: HashSet<String>,
    /// Keys that went down this frame
    pub keys_pressed: HashSet<String>,
    pub mouse_position: [f32; 2],
    /// Left, right, middle
    pub mouse_buttons: [bool; 3],
}

impl InputState {
    pub fn is_key_down(&self, key: &str) -> bool {
        self.keys_down.contains(key)
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.keys_pressed.contains(key)
    }

    pub fn is_mouse_down(&self, button: usize) -> bool {
        self.mouse_buttons.get(button).copied().unwrap_or(false)
    }
}

/// Frame timing snapshot
#[derive(Debug, Clone, Default)]
pub struct TimeState {
    pub delta_time: f32,
    pub total_time: f64,
    pub frame_count: u64,
    pub fps: f32,
}

impl TimeState {
    /// Advance by one frame
    pub fn advance(&mut self, delta_time: f32) {
        self.delta_time = delta_time;
        self.total_time += delta_time as f64;
        self.frame_count += 1;
        self.fps = if delta_time > 0.0 { 1.0 / delta_time } else { 0.0 };
    }
}

/// Engine-side state shared with native methods (the interpreter's user data)
#[derive(Debug, Default)]
pub struct HostBindings {
    pub input: InputState,
    pub time: TimeState,
    commands: CommandQueue,
    texture_sizes: HashMap<ResourceId, [u32; 2]>,
    next_resource_id: ResourceId,
}

impl HostBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build on an existing queue so the engine can keep its own clone
    pub fn with_queue(commands: CommandQueue) -> Self {
        Self {
            commands,
            ..Self::default()
        }
    }

    pub fn commands(&self) -> &CommandQueue {
        &self.commands
    }

    pub fn push(&self, cmd: BindingCommand) {
        self.commands.push(cmd);
    }

    /// Take every command queued since the last drain
    pub fn drain_commands(&self) -> Vec<BindingCommand> {
        self.commands.drain()
    }

    /// Allocate a new resource id, starting at 1
    pub fn next_resource_id(&mut self) -> ResourceId {
        self.next_resource_id += 1;
        self.next_resource_id
    }

    /// Called by the engine once a texture is decoded
    pub fn set_texture_size(&mut self, texture: ResourceId, width: u32, height: u32) {
        self.texture_sizes.insert(texture, [width, height]);
    }

    pub fn texture_size(&self, texture: ResourceId) -> Option<[u32; 2]> {
        self.texture_sizes.get(&texture).copied()
    }

    pub fn forget_texture(&mut self, texture: ResourceId) {
        self.texture_sizes.remove(&texture);
    }
}

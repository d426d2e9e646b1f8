//! 音频绑定 (`tico.audio`)

use super::marshal::{foreign_mut, slot_f32, slot_string};
use super::protocol::{BindingCommand, CommandQueue, ResourceId};
use super::registry::{ClassBinding, MethodBinding};
use crate::foreign_fn;
use std::any::Any;

/// 声音实例数据
#[derive(Debug)]
pub struct SoundData {
    pub id: ResourceId,
    queue: CommandQueue,
}

static SOUND_METHODS: &[MethodBinding] = &[
    MethodBinding::new("play()", sound_play),
    MethodBinding::new("stop()", sound_stop),
    MethodBinding::new("pause()", sound_pause),
    MethodBinding::new("volume=(_)", sound_set_volume),
];

static AUDIO_METHODS: &[MethodBinding] = &[
    MethodBinding::new("s_masterVolume=(_)", audio_set_master_volume),
    MethodBinding::new("s_stopAll()", audio_stop_all),
];

pub const SOUND: ClassBinding =
    ClassBinding::foreign("Sound", sound_allocate, sound_finalize, SOUND_METHODS);
pub const AUDIO: ClassBinding = ClassBinding::statics("Audio", AUDIO_METHODS);

foreign_fn! {
    /// `Sound.load(path)`
    fn sound_allocate(vm) {
        let path = slot_string(vm, 1, "path")?;
        let host = vm.host();
        let id = host.next_resource_id();
        host.push(BindingCommand::LoadSound { sound: id, path });
        let queue = host.commands().clone();
        vm.set_slot_new_foreign(0, 0, Box::new(SoundData { id, queue }));
        Ok(())
    }

    fn sound_play(vm) {
        let sound = foreign_mut::<SoundData>(vm, 0, "Sound")?.id;
        vm.host().push(BindingCommand::PlaySound { sound });
        Ok(())
    }

    fn sound_stop(vm) {
        let sound = foreign_mut::<SoundData>(vm, 0, "Sound")?.id;
        vm.host().push(BindingCommand::StopSound { sound });
        Ok(())
    }

    fn sound_pause(vm) {
        let sound = foreign_mut::<SoundData>(vm, 0, "Sound")?.id;
        vm.host().push(BindingCommand::PauseSound { sound });
        Ok(())
    }

    /// 音量限制在 0.0 - 1.0
    fn sound_set_volume(vm) {
        let sound = foreign_mut::<SoundData>(vm, 0, "Sound")?.id;
        let volume = slot_f32(vm, 1, "volume")?.clamp(0.0, 1.0);
        vm.host().push(BindingCommand::SetSoundVolume { sound, volume });
        Ok(())
    }

    fn audio_set_master_volume(vm) {
        let volume = slot_f32(vm, 1, "volume")?.clamp(0.0, 1.0);
        vm.host().push(BindingCommand::SetMasterVolume { volume });
        Ok(())
    }

    fn audio_stop_all(vm) {
        vm.host().push(BindingCommand::StopAllSounds);
        Ok(())
    }
}

fn sound_finalize(data: &mut (dyn Any + 'static)) {
    if let Some(sound) = data.downcast_mut::<SoundData>() {
        tracing::trace!(target: "bindings", "Sound {} finalized", sound.id);
        sound
            .queue
            .push(BindingCommand::UnloadSound { sound: sound.id });
    }
}

//! Shared test doubles for capture and playback tests.

use std::sync::{Mutex, PoisonError};

use glam::DVec3;

use crate::action::{BlockPos, ItemPayload, Transform};
use crate::host::{Host, LiveActor, SoundEffect};

/// Payloads whose first byte is this tag decode to "block" items in
/// [`RecordingHost::is_block_item`].
pub const BLOCK_ITEM_TAG: u8 = 1;

/// Live actor double with a settable transform; `None` simulates a
/// disconnect.
pub struct TestActor {
    transform: Mutex<Option<Transform>>,
}

impl TestActor {
    pub fn new(transform: Option<Transform>) -> Self {
        Self {
            transform: Mutex::new(transform),
        }
    }

    pub fn set_transform(&self, transform: Transform) {
        *self.lock() = Some(transform);
    }

    pub fn disconnect(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Transform>> {
        self.transform.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LiveActor for TestActor {
    fn transform(&self) -> Option<Transform> {
        *self.lock()
    }
}

/// Host double that records every callback; items decode to their raw
/// payload bytes.
#[derive(Default)]
pub struct RecordingHost {
    pub chats: Vec<(String, String)>,
    pub swings: u32,
    pub equips: Vec<(u8, Option<Vec<u8>>)>,
    pub spawned_items: Vec<(Vec<u8>, DVec3, DVec3)>,
    pub arrows: Vec<(DVec3, f32, f32, f32, bool)>,
    pub sounds: Vec<(SoundEffect, f32, f32)>,
    pub placed: Vec<(Vec<u8>, BlockPos)>,
    pub skin_updates: Vec<String>,
    /// When set, every payload decodes as corrupt
    pub reject_items: bool,
}

impl Host for RecordingHost {
    type Item = Vec<u8>;

    fn decode_item(&mut self, payload: &ItemPayload) -> Option<Self::Item> {
        if self.reject_items {
            None
        } else {
            Some(payload.as_bytes().to_vec())
        }
    }

    fn is_block_item(&self, item: &Self::Item) -> bool {
        item.first().copied() == Some(BLOCK_ITEM_TAG)
    }

    fn broadcast_chat(&mut self, speaker: &str, message: &str) {
        self.chats.push((speaker.to_string(), message.to_string()));
    }

    fn swing_arm(&mut self) {
        self.swings += 1;
    }

    fn equip(&mut self, slot: u8, item: Option<Self::Item>) {
        self.equips.push((slot, item));
    }

    fn spawn_item(&mut self, item: Self::Item, position: DVec3, velocity: DVec3) {
        self.spawned_items.push((item, position, velocity));
    }

    fn spawn_arrow(&mut self, position: DVec3, yaw: f32, pitch: f32, speed: f32, can_pickup: bool) {
        self.arrows.push((position, yaw, pitch, speed, can_pickup));
    }

    fn play_sound(&mut self, effect: SoundEffect, volume: f32, pitch: f32) {
        self.sounds.push((effect, volume, pitch));
    }

    fn place_block(&mut self, item: Self::Item, position: BlockPos) {
        self.placed.push((item, position));
    }

    fn sync_skin_source(&mut self, value: &str) {
        self.skin_updates.push(value.to_string());
    }
}

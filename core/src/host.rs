//! Host engine interface
//!
//! This core never touches the simulation directly. The host implements
//! [`LiveActor`] so a capture worker can sample a player's transform, and
//! [`Host`] so a [`PlaybackActor`](crate::playback::PlaybackActor) can
//! dispatch replayed actions back into the world. Item encoding, entity
//! spawning, chat transport, and block placement all stay on the host side.

use glam::DVec3;

use crate::action::{BlockPos, ItemPayload, Transform};

/// A live, player-controlled actor being captured.
///
/// Implementations must be callable from the capture worker thread.
pub trait LiveActor: Send + Sync {
    /// Current transform, or `None` once the actor has disconnected.
    ///
    /// `None` terminates the capture session; everything sampled so far is
    /// finalized and persisted.
    fn transform(&self) -> Option<Transform>;
}

/// Sound effects replay can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Bow string release
    BowRelease,
}

/// Engine callbacks consumed by playback dispatch.
///
/// `Item` is the host's own item-stack type; payload blobs recorded during
/// capture are decoded back into it before any item-dependent side effect.
pub trait Host {
    type Item;

    /// Decode a recorded item payload.
    ///
    /// `None` marks the payload as corrupt; the dispatcher skips the
    /// action's item-dependent side effect and keeps ticking.
    fn decode_item(&mut self, payload: &ItemPayload) -> Option<Self::Item>;

    /// Whether the item places a block when used.
    fn is_block_item(&self, item: &Self::Item) -> bool;

    /// Broadcast a chat line attributed to `speaker`.
    fn broadcast_chat(&mut self, speaker: &str, message: &str);

    /// Trigger the playback actor's arm-swing animation.
    fn swing_arm(&mut self);

    /// Set or clear an equipment slot.
    fn equip(&mut self, slot: u8, item: Option<Self::Item>);

    /// Spawn a dropped-item entity with an initial velocity.
    fn spawn_item(&mut self, item: Self::Item, position: DVec3, velocity: DVec3);

    /// Spawn an arrow from `position` along the given view angles.
    ///
    /// `speed` is the velocity scale; `can_pickup` marks the arrow as
    /// recoverable.
    fn spawn_arrow(&mut self, position: DVec3, yaw: f32, pitch: f32, speed: f32, can_pickup: bool);

    /// Play a sound effect at the playback actor.
    fn play_sound(&mut self, effect: SoundEffect, volume: f32, pitch: f32);

    /// Place a block from `item` at the recorded position with neutral
    /// orientation.
    fn place_block(&mut self, item: Self::Item, position: BlockPos);

    /// Update the host-replicated skin-source field for the playback
    /// actor.
    fn sync_skin_source(&mut self, value: &str);
}

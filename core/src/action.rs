//! Capture data model
//!
//! Defines the typed action records that make up a capture: discrete events
//! (chat, swings, equipment changes, projectiles, block placement) and
//! continuous pose samples, each stamped with a tick offset from session
//! start.

use glam::DVec3;

/// Maximum bow charge in ticks. Charges above this are treated as a full
/// draw.
pub const MAX_ARROW_CHARGE: u8 = 20;

/// Identity of a live actor being captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u64);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Opaque serialized item stack.
///
/// The host engine owns the encoding; this core only carries the bytes
/// through capture, storage, and playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPayload {
    bytes: Vec<u8>,
}

impl ItemPayload {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Integer world position for block placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// A live actor's sampled transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World position (feet)
    pub position: DVec3,
    /// Body yaw in degrees
    pub yaw: f32,
    /// Look pitch in degrees
    pub pitch: f32,
}

impl Transform {
    pub fn new(position: DVec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
        }
    }
}

/// One captured action.
///
/// Closed over every kind a capture can contain; playback dispatch matches
/// exhaustively so a new kind cannot be silently ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Chat line issued by the actor
    Chat { message: String },
    /// Arm swing (attack/use animation)
    Swipe,
    /// Equipment slot change; `None` clears the slot
    Equip { slot: u8, item: Option<ItemPayload> },
    /// Item tossed out of the inventory
    Drop { item: ItemPayload },
    /// Bow released after `charge` ticks of draw
    ShootArrow { charge: u8 },
    /// Block placed from the held item
    PlaceBlock { item: ItemPayload, position: BlockPos },
    /// Continuous transform sample; feeds interpolation, never the
    /// discrete dispatch switch
    Pose {
        position: DVec3,
        yaw: f32,
        pitch: f32,
    },
}

impl Action {
    /// Whether this is a continuous pose sample rather than a discrete
    /// event.
    pub fn is_pose(&self) -> bool {
        matches!(self, Action::Pose { .. })
    }
}

/// One tick-stamped entry of an [`ActionLog`](crate::log::ActionLog).
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    /// Tick offset from session start; non-decreasing within a log
    pub tick: u64,
    pub action: Action,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_id_display() {
        assert_eq!(ActorId(7).to_string(), "actor#7");
    }

    #[test]
    fn test_pose_predicate() {
        let pose = Action::Pose {
            position: DVec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
        };
        assert!(pose.is_pose());
        assert!(!Action::Swipe.is_pose());
        assert!(
            !Action::Chat {
                message: "hi".to_string()
            }
            .is_pose()
        );
    }

    #[test]
    fn test_item_payload_accessors() {
        let payload = ItemPayload::from_bytes(vec![1, 2, 3]);
        assert_eq!(payload.as_bytes(), &[1, 2, 3]);
        assert_eq!(payload.len(), 3);
        assert!(!payload.is_empty());
        assert!(ItemPayload::from_bytes(Vec::new()).is_empty());
    }
}

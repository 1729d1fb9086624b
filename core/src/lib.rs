//! Mocap Core - Actor record/replay engine
//!
//! Captures a live actor's transform and discrete actions at tick
//! granularity and replays them deterministically through a scripted
//! stand-in actor inside a host simulation.
//!
//! # Architecture
//!
//! - [`SessionRegistry`] - gates capture session creation/termination;
//!   at most one session per actor and per output name
//! - [`CaptureSession`] - samples one live actor on a background cadence
//!   and appends to its [`ActionLog`]
//! - [`LogStore`] - durable `.mocap` persistence with atomic replace
//! - [`PlaybackActor`] - consumes an action queue one record per
//!   simulation tick, dispatching discrete actions through [`Host`] and
//!   interpolating continuous motion

pub mod action;
pub mod binary;
pub mod capture;
pub mod config;
pub mod host;
#[cfg(test)]
mod integration;
pub mod log;
pub mod playback;
pub mod storage;
#[cfg(test)]
pub mod test_utils;

// Re-export the data model
pub use action::{Action, ActionRecord, ActorId, BlockPos, ItemPayload, MAX_ARROW_CHARGE, Transform};
pub use log::ActionLog;

// Re-export capture types
pub use capture::{CaptureError, CaptureSession, SessionRegistry, SessionState};

// Re-export playback types
pub use playback::{EYE_HEIGHT, MoveTarget, PlaybackActor, PlaybackState};

// Re-export host-facing traits
pub use host::{Host, LiveActor, SoundEffect};

// Re-export storage and format types
pub use binary::{BinaryReader, BinaryWriter, LogFlags, LogMetadata};
pub use config::MocapConfig;
pub use storage::{LOG_EXTENSION, LogStore};

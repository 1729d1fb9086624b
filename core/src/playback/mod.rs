//! Playback
//!
//! A [`PlaybackActor`] is a scripted stand-in driven once per simulation
//! tick: it consumes at most one action record from its owned queue,
//! dispatches discrete actions through the host, and integrates continuous
//! motion toward its current interpolation target.

mod actor;

pub use actor::{EYE_HEIGHT, MoveTarget, PlaybackActor, PlaybackState};

//! Capture pipeline
//!
//! A [`CaptureSession`] binds one live actor to one in-progress
//! [`ActionLog`](crate::log::ActionLog) and a background sampling worker;
//! the [`SessionRegistry`] gates session creation and termination so no two
//! captures ever claim the same actor or output name.

mod registry;
mod session;

pub use registry::{CaptureError, SessionRegistry};
pub use session::{CaptureSession, SessionState};

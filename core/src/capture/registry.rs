//! Session registry
//!
//! Process-wide table of active capture sessions. Every compound check
//! (prune, per-actor lookup, cross-session name scan, insert) runs inside
//! one critical section, so two racing starts can never claim the same
//! actor or the same output name.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use hashbrown::HashMap;

use crate::action::ActorId;
use crate::capture::{CaptureSession, SessionState};
use crate::config::MocapConfig;
use crate::host::LiveActor;
use crate::storage::LogStore;

/// Registry-level capture errors, surfaced to the command collaborator as
/// user-facing text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// The actor already has an active capture session
    #[error("already recording this actor")]
    AlreadyRecording,
    /// Another active session is writing to the same log name
    #[error("'{0}.mocap' is already being recorded to")]
    NameInUse(String),
    /// The actor has no active capture session
    #[error("not recording this actor")]
    NotRecording,
    /// The log name cannot be used as a file stem
    #[error("invalid log name '{0}'")]
    InvalidName(String),
    /// Finalizing the capture log failed; captured records were reported
    /// but could not be persisted
    #[error("failed to save capture log: {0}")]
    Storage(String),
}

/// Map from live-actor identity to its active capture session.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<ActorId, Arc<CaptureSession>>>,
    store: Arc<LogStore>,
    sample_interval: Duration,
}

impl SessionRegistry {
    pub fn new(store: LogStore, sample_interval: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            store: Arc::new(store),
            sample_interval,
        }
    }

    /// Build a registry from engine configuration.
    pub fn from_config(config: &MocapConfig) -> Self {
        Self::new(
            LogStore::new(config.storage.resolved_dir(), config.storage.compress),
            config.capture.sample_interval(),
        )
    }

    /// Start capturing `actor_id` into a log named `name`
    /// (case-insensitive).
    ///
    /// Fails with [`CaptureError::AlreadyRecording`] if the actor has an
    /// active session, and with [`CaptureError::NameInUse`] if any active
    /// session already targets `name`. Failure has no side effects.
    pub fn start_session(
        &self,
        actor_id: ActorId,
        name: &str,
        actor: Arc<dyn LiveActor>,
    ) -> Result<Arc<CaptureSession>, CaptureError> {
        let name = validate_name(name)?;

        let mut sessions = self.lock_sessions();

        // Sessions finalized by the worker (actor disconnect) stay mapped
        // until the next registry mutation; drop them before the checks.
        sessions.retain(|_, session| session.state() != SessionState::Stopped);

        if sessions.contains_key(&actor_id) {
            return Err(CaptureError::AlreadyRecording);
        }
        if sessions.values().any(|session| session.log_name() == name) {
            return Err(CaptureError::NameInUse(name));
        }

        let session = Arc::new(CaptureSession::begin(
            actor_id,
            &name,
            actor,
            self.store.clone(),
            self.sample_interval,
        ));
        sessions.insert(actor_id, session.clone());

        tracing::info!(actor = %actor_id, log = %session.log_name(), "capture session started");
        Ok(session)
    }

    /// Stop the actor's capture session and persist its log.
    ///
    /// Returns the name the log was saved under. The mapping is removed
    /// under the registry lock; joining the worker and writing the file
    /// happen outside it so other sessions are never stalled.
    pub fn stop_session(&self, actor_id: ActorId) -> Result<String, CaptureError> {
        let session = self
            .lock_sessions()
            .remove(&actor_id)
            .ok_or(CaptureError::NotRecording)?;

        match session.finish() {
            Ok(path) => {
                tracing::info!(
                    actor = %actor_id,
                    path = %path.display(),
                    "capture session stopped"
                );
                Ok(session.log_name().to_string())
            }
            Err(e) => {
                tracing::error!(actor = %actor_id, error = %e, "failed to save capture log");
                Err(CaptureError::Storage(e.to_string()))
            }
        }
    }

    /// Current session for `actor_id`, if any. Non-mutating.
    pub fn lookup(&self, actor_id: ActorId) -> Option<Arc<CaptureSession>> {
        self.lock_sessions().get(&actor_id).cloned()
    }

    /// Whether any active session targets `name` (case-insensitive).
    pub fn is_name_in_use(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.lock_sessions()
            .values()
            .any(|session| session.is_capturing() && session.log_name() == name)
    }

    /// Number of sessions currently capturing.
    pub fn active_count(&self) -> usize {
        self.lock_sessions()
            .values()
            .filter(|session| session.is_capturing())
            .count()
    }

    fn lock_sessions(&self) -> MutexGuard<'_, HashMap<ActorId, Arc<CaptureSession>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Lowercase and validate a log name so it is safe as a file stem.
fn validate_name(name: &str) -> Result<String, CaptureError> {
    let name = name.to_lowercase();
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(CaptureError::InvalidName(name))
    }
}

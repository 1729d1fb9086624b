//! Capture session
//!
//! One live actor, one in-progress action log, one background sampling
//! worker. The worker runs on its own cadence, decoupled from the
//! simulation tick thread: it blocks on a stop channel with a timeout, so
//! sampling never busy-waits and shutdown wakes it immediately.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::action::{Action, ActorId};
use crate::binary::LogMetadata;
use crate::host::LiveActor;
use crate::log::ActionLog;
use crate::storage::LogStore;

/// Capture session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created but not yet sampling
    Idle,
    /// Worker is sampling; discrete actions are accepted
    Capturing,
    /// Finalized; never reused
    Stopped,
}

const STATE_IDLE: u8 = 0;
const STATE_CAPTURING: u8 = 1;
const STATE_STOPPED: u8 = 2;

/// State shared between the session handle and its worker thread.
struct SessionShared {
    state: AtomicU8,
    /// Advisory flag the worker observes each iteration
    capture: AtomicBool,
    /// Tick offset of the next pose sample
    tick: AtomicU64,
    log: Mutex<ActionLog>,
}

impl SessionShared {
    fn state(&self) -> SessionState {
        match self.state.load(Ordering::Acquire) {
            STATE_IDLE => SessionState::Idle,
            STATE_CAPTURING => SessionState::Capturing,
            _ => SessionState::Stopped,
        }
    }

    /// Transition `Capturing -> Stopped`. Returns true for exactly one
    /// caller; the winner is the one that persists the log.
    fn try_stop(&self) -> bool {
        self.state
            .compare_exchange(
                STATE_CAPTURING,
                STATE_STOPPED,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    // A poisoned lock only means a sampler panicked mid-append; the
    // records already in the log are still worth saving.
    fn lock_log(&self) -> MutexGuard<'_, ActionLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An in-progress capture of one live actor.
///
/// Created through
/// [`SessionRegistry::start_session`](crate::capture::SessionRegistry::start_session),
/// which guarantees at most one session per actor and per output name.
pub struct CaptureSession {
    actor_id: ActorId,
    log_name: String,
    started_at: DateTime<Utc>,
    sample_interval: Duration,
    shared: Arc<SessionShared>,
    store: Arc<LogStore>,
    stop_tx: Sender<()>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("actor_id", &self.actor_id)
            .field("log_name", &self.log_name)
            .field("started_at", &self.started_at)
            .field("sample_interval", &self.sample_interval)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl CaptureSession {
    /// Start capturing `actor_id` into a log named `name`.
    pub(crate) fn begin(
        actor_id: ActorId,
        name: &str,
        actor: Arc<dyn LiveActor>,
        store: Arc<LogStore>,
        sample_interval: Duration,
    ) -> Self {
        let log_name = name.to_lowercase();
        let started_at = Utc::now();
        let shared = Arc::new(SessionShared {
            state: AtomicU8::new(STATE_IDLE),
            capture: AtomicBool::new(true),
            tick: AtomicU64::new(0),
            log: Mutex::new(ActionLog::new(&log_name)),
        });
        let meta = LogMetadata {
            name: log_name.clone(),
            recorded_at: started_at,
            sample_interval_ms: sample_interval.as_millis() as u64,
        };

        let (stop_tx, stop_rx) = mpsc::channel();
        shared.state.store(STATE_CAPTURING, Ordering::Release);
        let handle = std::thread::spawn({
            let shared = shared.clone();
            let store = store.clone();
            move || run_worker(shared, actor, store, stop_rx, sample_interval, meta)
        });

        Self {
            actor_id,
            log_name,
            started_at,
            sample_interval,
            shared,
            store,
            stop_tx,
            worker: Mutex::new(Some(handle)),
        }
    }

    pub fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    /// Name the log will be saved under (lowercased).
    pub fn log_name(&self) -> &str {
        &self.log_name
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    pub fn is_capturing(&self) -> bool {
        self.state() == SessionState::Capturing
    }

    /// Tick offset the next pose sample will be stamped with.
    pub fn current_tick(&self) -> u64 {
        self.shared.tick.load(Ordering::Acquire)
    }

    /// Number of records captured so far.
    pub fn recorded_len(&self) -> usize {
        self.shared.lock_log().len()
    }

    /// Append a discrete action stamped with the current tick offset.
    ///
    /// Returns false (and records nothing) once the session has left
    /// `Capturing`.
    pub fn record_action(&self, action: Action) -> bool {
        self.record_action_at(self.current_tick(), action)
    }

    /// Append a discrete action stamped with a detection-time tick.
    ///
    /// The log clamps `tick` up to the last appended tick if the stamp
    /// lost a race with the sampling counter.
    pub fn record_action_at(&self, tick: u64, action: Action) -> bool {
        if !self.is_capturing() {
            return false;
        }
        self.shared.lock_log().append(tick, action);
        true
    }

    /// Stop the worker, finalize the log, and persist it.
    ///
    /// If the worker already finalized the session (actor disconnect),
    /// this returns the path it was saved under without writing again.
    pub(crate) fn finish(&self) -> std::io::Result<PathBuf> {
        self.shared.capture.store(false, Ordering::Release);
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.lock_worker().take() {
            let _ = handle.join();
        }

        if self.shared.try_stop() {
            let log = self.shared.lock_log().clone();
            self.store.save(&log, &self.metadata())
        } else {
            Ok(self.store.path_for(&self.log_name))
        }
    }

    fn metadata(&self) -> LogMetadata {
        LogMetadata {
            name: self.log_name.clone(),
            recorded_at: self.started_at,
            sample_interval_ms: self.sample_interval.as_millis() as u64,
        }
    }

    fn lock_worker(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Background sampling loop.
///
/// Waits out the sampling interval on the stop channel; a message (or a
/// dropped sender) means shutdown, a timeout means "take a sample". The
/// simulation thread is never blocked beyond the log append.
fn run_worker(
    shared: Arc<SessionShared>,
    actor: Arc<dyn LiveActor>,
    store: Arc<LogStore>,
    stop_rx: Receiver<()>,
    sample_interval: Duration,
    meta: LogMetadata,
) {
    loop {
        match stop_rx.recv_timeout(sample_interval) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        if !shared.capture.load(Ordering::Acquire) {
            break;
        }

        match actor.transform() {
            Some(transform) => {
                let tick = shared.tick.fetch_add(1, Ordering::AcqRel);
                shared.lock_log().append(
                    tick,
                    Action::Pose {
                        position: transform.position,
                        yaw: transform.yaw,
                        pitch: transform.pitch,
                    },
                );
            }
            None => {
                // The live actor disconnected mid-capture: finalize
                // whatever was sampled so far.
                tracing::info!(log = %meta.name, "live actor disconnected, finalizing capture");
                shared.capture.store(false, Ordering::Release);
                if shared.try_stop() {
                    let log = shared.lock_log().clone();
                    if let Err(e) = store.save(&log, &meta) {
                        tracing::error!(log = %meta.name, error = %e, "failed to save capture log");
                    }
                }
                break;
            }
        }
    }
}

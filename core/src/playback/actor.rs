//! Playback actor
//!
//! Replays a capture one simulation tick at a time. Discrete actions pop
//! off an owned FIFO queue and dispatch through an exhaustive match over
//! the record kinds; pose records never enter that switch and instead feed
//! the interpolation target, exactly like a network-smoothed entity.
//!
//! Every per-tick operation is total: corrupt item payloads are logged and
//! skipped, and nothing here can propagate a fault into the host tick
//! loop.

use std::collections::VecDeque;

use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::action::{Action, ActionRecord, MAX_ARROW_CHARGE};
use crate::host::{Host, SoundEffect};

/// Eye height above the feet, used as the toss origin for dropped items.
pub const EYE_HEIGHT: f64 = 1.62;

/// Idle velocity damping per tick.
const IDLE_DAMPING: f64 = 0.98;
/// Velocity magnitudes below this snap to exactly zero.
const VELOCITY_SNAP: f64 = 0.005;
/// Toss speed for dropped items.
const TOSS_SPEED: f32 = 0.3;

/// Active continuous-motion target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveTarget {
    pub position: DVec3,
    pub yaw: f32,
    pub pitch: f32,
    /// Ticks left until the target is reached
    pub remaining: u32,
}

/// Observable playback state, re-derived every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Empty queue, no interpolation target
    Idle,
    /// Queue non-empty or a target is active
    Animating,
}

/// Scripted stand-in actor driven by the host once per simulation tick.
pub struct PlaybackActor {
    display_name: String,
    skin_source: String,

    queue: VecDeque<ActionRecord>,
    target: Option<MoveTarget>,

    position: DVec3,
    prev_position: DVec3,
    velocity: DVec3,
    yaw: f32,
    pitch: f32,
    head_yaw: f32,

    limb_swing: f32,
    limb_swing_amount: f32,
    prev_limb_swing_amount: f32,

    item_in_use_ticks: u32,
    pose_window: u32,
    client_side: bool,

    rng: Pcg32,
}

impl PlaybackActor {
    /// Create an idle playback actor at the origin.
    ///
    /// `seed` fixes the scatter/pitch randomness so a replay is
    /// reproducible.
    pub fn new(display_name: impl Into<String>, seed: u64) -> Self {
        Self {
            display_name: display_name.into(),
            skin_source: String::new(),
            queue: VecDeque::new(),
            target: None,
            position: DVec3::ZERO,
            prev_position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            head_yaw: 0.0,
            limb_swing: 0.0,
            limb_swing_amount: 0.0,
            prev_limb_swing_amount: 0.0,
            item_in_use_ticks: 0,
            pose_window: crate::config::PlaybackConfig::default().pose_window,
            client_side: false,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn set_position(&mut self, position: DVec3) {
        self.position = position;
        self.prev_position = position;
    }

    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: DVec3) {
        self.velocity = velocity;
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn set_rotation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch;
    }

    pub fn head_yaw(&self) -> f32 {
        self.head_yaw
    }

    pub fn limb_swing(&self) -> f32 {
        self.limb_swing
    }

    pub fn limb_swing_amount(&self) -> f32 {
        self.limb_swing_amount
    }

    pub fn prev_limb_swing_amount(&self) -> f32 {
        self.prev_limb_swing_amount
    }

    /// Ticks the held item has been in use (bow draw pose etc.); restored
    /// by loaders, carried for the host's animation state.
    pub fn item_in_use_ticks(&self) -> u32 {
        self.item_in_use_ticks
    }

    pub fn set_item_in_use_ticks(&mut self, ticks: u32) {
        self.item_in_use_ticks = ticks;
    }

    /// Interpolation window applied to pose records arriving through the
    /// queue.
    pub fn pose_window(&self) -> u32 {
        self.pose_window
    }

    pub fn set_pose_window(&mut self, ticks: u32) {
        self.pose_window = ticks.max(1);
    }

    /// Render-only instances skip idle damping and head-yaw tracking.
    pub fn client_side(&self) -> bool {
        self.client_side
    }

    pub fn set_client_side(&mut self, client_side: bool) {
        self.client_side = client_side;
    }

    pub fn skin_source(&self) -> &str {
        &self.skin_source
    }

    /// Set the skin-source field and replicate it through the host.
    pub fn set_skin_source<H: Host>(&mut self, host: &mut H, value: impl Into<String>) {
        self.skin_source = value.into();
        host.sync_skin_source(&self.skin_source);
    }

    pub fn state(&self) -> PlaybackState {
        if self.queue.is_empty() && self.target.is_none() {
            PlaybackState::Idle
        } else {
            PlaybackState::Animating
        }
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Push one record onto the action queue.
    pub fn enqueue(&mut self, record: ActionRecord) {
        self.queue.push_back(record);
    }

    /// Bulk-preload records in order.
    pub fn enqueue_all(&mut self, records: impl IntoIterator<Item = ActionRecord>) {
        self.queue.extend(records);
    }

    /// Set the continuous-motion target (the pose channel).
    ///
    /// `increments` of zero snaps the transform immediately.
    pub fn set_move_target(&mut self, position: DVec3, yaw: f32, pitch: f32, increments: u32) {
        if increments == 0 {
            self.position = position;
            self.yaw = wrap_degrees(yaw);
            self.pitch = pitch;
            self.target = None;
        } else {
            self.target = Some(MoveTarget {
                position,
                yaw,
                pitch,
                remaining: increments,
            });
        }
    }

    pub fn move_target(&self) -> Option<&MoveTarget> {
        self.target.as_ref()
    }

    /// Per-tick update, invoked once per simulation tick by the host.
    ///
    /// Pops at most one record off the queue and dispatches it, then
    /// integrates continuous motion.
    pub fn tick<H: Host>(&mut self, host: &mut H) {
        if let Some(record) = self.queue.pop_front() {
            self.dispatch(record.action, host);
        }
        self.integrate();
    }

    /// Dispatch one action by kind.
    fn dispatch<H: Host>(&mut self, action: Action, host: &mut H) {
        match action {
            Action::Chat { message } => {
                host.broadcast_chat(&self.display_name, &message);
            }
            Action::Swipe => {
                host.swing_arm();
            }
            Action::Equip { slot, item } => match item {
                None => host.equip(slot, None),
                Some(payload) => match host.decode_item(&payload) {
                    Some(stack) => host.equip(slot, Some(stack)),
                    None => {
                        tracing::warn!(slot, "skipping equip with corrupt item payload");
                    }
                },
            },
            Action::Drop { item } => {
                let Some(stack) = host.decode_item(&item) else {
                    tracing::warn!("skipping drop with corrupt item payload");
                    return;
                };

                let yaw_rad = self.yaw.to_radians();
                let pitch_rad = self.pitch.to_radians();
                let mut velocity = DVec3::new(
                    f64::from(-yaw_rad.sin() * pitch_rad.cos() * TOSS_SPEED),
                    f64::from(-pitch_rad.sin() * TOSS_SPEED + 0.1),
                    f64::from(yaw_rad.cos() * pitch_rad.cos() * TOSS_SPEED),
                );

                // Small lateral scatter so stacked drops fan out.
                let angle = self.rng.random::<f32>() * std::f32::consts::TAU;
                let scatter = 0.02 * self.rng.random::<f32>();
                velocity.x += f64::from(angle.cos() * scatter);
                velocity.y +=
                    f64::from((self.rng.random::<f32>() - self.rng.random::<f32>()) * 0.1);
                velocity.z += f64::from(angle.sin() * scatter);

                let position = DVec3::new(
                    self.position.x,
                    self.position.y - 0.3 + EYE_HEIGHT,
                    self.position.z,
                );
                host.spawn_item(stack, position, velocity);
            }
            Action::ShootArrow { charge } => {
                let draw = f32::from(charge.min(MAX_ARROW_CHARGE)) / f32::from(MAX_ARROW_CHARGE);
                let mut power = (draw * draw + draw * 2.0) / 3.0;
                if power < 0.1 {
                    // Below the minimum draw; the shot never happened.
                    return;
                }
                if power > 1.0 {
                    power = 1.0;
                }

                let pitch = 1.0 / (self.rng.random::<f32>() * 0.4 + 0.8);
                host.play_sound(SoundEffect::BowRelease, 1.0, pitch);
                host.spawn_arrow(self.position, self.yaw, self.pitch, power * 2.0, true);
            }
            Action::PlaceBlock { item, position } => {
                let Some(stack) = host.decode_item(&item) else {
                    tracing::warn!("skipping block placement with corrupt item payload");
                    return;
                };
                if host.is_block_item(&stack) {
                    host.place_block(stack, position);
                }
            }
            Action::Pose {
                position,
                yaw,
                pitch,
            } => {
                // Pose samples feed interpolation, never the discrete
                // switch.
                self.set_move_target(position, yaw, pitch, self.pose_window);
            }
        }
    }

    /// Continuous motion integration for one tick.
    fn integrate(&mut self) {
        match self.target.take() {
            Some(mut target) => {
                if target.remaining <= 1 {
                    // Final increment lands on the target with no
                    // fractional residue.
                    self.position = target.position;
                    self.yaw = wrap_degrees(target.yaw);
                    self.pitch = target.pitch;
                } else {
                    let remaining = target.remaining;
                    self.position += (target.position - self.position) / f64::from(remaining);
                    self.yaw += wrap_degrees(target.yaw - self.yaw) / remaining as f32;
                    self.pitch += (target.pitch - self.pitch) / remaining as f32;
                    target.remaining = remaining - 1;
                    self.target = Some(target);
                }
            }
            None => {
                if !self.client_side {
                    self.velocity *= IDLE_DAMPING;
                }
            }
        }

        self.velocity.x = snap_axis(self.velocity.x);
        self.velocity.y = snap_axis(self.velocity.y);
        self.velocity.z = snap_axis(self.velocity.z);

        if !self.client_side {
            self.head_yaw = self.yaw;
        }

        // Limb swing amplitude follows horizontal displacement.
        self.prev_limb_swing_amount = self.limb_swing_amount;
        let dx = self.position.x - self.prev_position.x;
        let dz = self.position.z - self.prev_position.z;
        let swing = ((dx * dx + dz * dz).sqrt() as f32 * 4.0).min(1.0);
        self.limb_swing_amount += (swing - self.limb_swing_amount) * 0.4;
        self.limb_swing += self.limb_swing_amount;

        self.prev_position = self.position;
    }
}

/// Wrap an angle in degrees to `[-180, 180)`.
fn wrap_degrees(mut degrees: f32) -> f32 {
    degrees %= 360.0;
    if degrees >= 180.0 {
        degrees -= 360.0;
    }
    if degrees < -180.0 {
        degrees += 360.0;
    }
    degrees
}

fn snap_axis(v: f64) -> f64 {
    if v.abs() < VELOCITY_SNAP { 0.0 } else { v }
}

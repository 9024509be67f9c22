//! Centralised rider, control-law and stepping constants.
//!
//! Every tuneable value lives here so it can be found and reasoned about in
//! one place.  [`crate::config::RiderConfig`] mirrors the runtime-tunable
//! subset and uses these as its defaults; the step-loop values are fixed.
//!
//! Units are the physics engine's: metres, kilograms, seconds, radians.

use std::f32::consts::PI;

// ── Control law ───────────────────────────────────────────────────────────────

/// Absolute maximum target speed of the wheel motor (rad/s).
pub const MAXIMUM_SPEED: f32 = 8.0;

/// Motor speed change per 60 Hz frame while a direction is held.
///
/// At 0.0375 the wheel reaches `MAXIMUM_SPEED` after ~213 frames (~3.5 s).
pub const SPEED_INCREMENT_FACTOR: f32 = 0.0375;

/// Below this absolute tilt the rider is upright and only leans into motion.
pub const MAX_SAFE_ANGLE: f32 = PI / 32.0;

/// Below this absolute tilt a wobble can still be corrected.
pub const MAX_CORRECTABLE_ANGLE: f32 = PI / 8.0;

/// Lower (exclusive) edge of the collapsed band.
pub const COLLAPSED_ANGLE_MIN: f32 = PI / 2.0;

/// Upper (exclusive) edge of the collapsed band.  Beyond it the rider is
/// nearly inverted and is left to fall freely.
pub const COLLAPSED_ANGLE_MAX: f32 = PI * 0.75;

/// Torque applied to the shaft to correct a wobble.
pub const CORRECTION_ANGULAR_FORCE: f32 = 4.0;

/// Torque applied to the shaft to hoist a collapsed rider using ground leverage.
pub const HOIST_ANGULAR_FORCE: f32 = 30.0;

/// Horizontal force pushing the torso into the direction of travel (lean).
pub const TORSO_PUSH_FORCE_X: f32 = 0.05;

/// Tilt correction only runs while the last input is more recent than this.
pub const ACTIVITY_WINDOW_MS: f32 = 1000.0;

/// Damping gain of the wheel's velocity motor.
///
/// Rapier softens a velocity motor by roughly `1 / (dt · factor)`.  At 1000
/// that is 0.06 at 60 Hz, so the wheel holds its commanded speed within a
/// step like a hard velocity constraint.  Small gains leave it lagging.
pub const WHEEL_MOTOR_FACTOR: f32 = 1000.0;

// ── Masses ────────────────────────────────────────────────────────────────────

/// Total mass of the rider's body (everything except the unicycle).
pub const PLAYER_MASS: f32 = 0.1;

/// Total mass of the unicycle, split evenly between wheel and shaft.
pub const UNICYCLE_MASS: f32 = 0.4;

pub const TORSO_WEIGHT_PROP: f32 = 0.5;
pub const LEG_TOP_WEIGHT_PROP: f32 = 0.07;
pub const LEG_BOTTOM_WEIGHT_PROP: f32 = 0.09;
pub const ARM_TOP_WEIGHT_PROP: f32 = 0.025;
pub const ARM_BOTTOM_WEIGHT_PROP: f32 = 0.025;
pub const HEAD_WEIGHT_PROP: f32 = 0.07;
pub const HAT_WEIGHT_PROP: f32 = 0.01;

// ── Surfaces ──────────────────────────────────────────────────────────────────

/// Friction of the tyre against terrain.  Combined with `Max`, so it wins
/// over the terrain's own coefficient.
pub const TYRE_FRICTION: f32 = 1.25;

/// Bounciness of the tyre against terrain.
pub const TYRE_RESTITUTION: f32 = 0.4;

/// Friction of every other surface.
pub const DEFAULT_FRICTION: f32 = 0.3;

/// Vertical gravity (m/s²).
pub const GRAVITY_Y: f32 = -9.78;

// ── World step loop ───────────────────────────────────────────────────────────

/// Fixed internal physics step (seconds).
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Maximum internal steps taken per frame.
pub const MAX_SUBSTEPS: u32 = 10;

/// Real frame deltas above this are treated as zero (ms).
///
/// Guards against a huge catch-up step after the host was paused or hidden.
pub const MAX_FRAME_DELTA_MS: f32 = 500.0;

/// Milliseconds in one frame of the 60 Hz baseline used by `timeMultiplier`.
pub const BASELINE_FRAME_MS: f32 = 1000.0 / 60.0;

// ── Position history ──────────────────────────────────────────────────────────

/// Number of wheel positions kept for the trailing light / camera target.
pub const POSITION_HISTORY_LEN: usize = 30;

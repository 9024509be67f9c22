//! Runtime rider configuration loaded from `assets/rider.toml`.
//!
//! [`RiderConfig`] is a Bevy [`Resource`] that mirrors the tunable constants
//! in [`crate::constants`].  At startup, [`load_rider_config`] reads
//! `assets/rider.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the constants you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<RiderConfig>` to any system parameter list and read values
//! with `config.maximum_speed`, `config.hoist_angular_force`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `RiderConfig::default()`.

use crate::constants::*;
use crate::error::{
    validate_angle_bands, validate_mass, validate_maximum_speed, validate_motor_factor,
    RiderError, RiderResult,
};
use bevy::prelude::*;
use serde::Deserialize;

/// Default location of the config file, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/rider.toml";

/// Runtime-tunable control-law, mass and surface configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Angles are radians.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RiderConfig {
    // ── Control law ──────────────────────────────────────────────────────────
    pub maximum_speed: f32,
    pub speed_increment_factor: f32,
    pub max_safe_angle: f32,
    pub max_correctable_angle: f32,
    pub collapsed_angle_min: f32,
    pub collapsed_angle_max: f32,
    pub correction_angular_force: f32,
    pub hoist_angular_force: f32,
    pub torso_push_force_x: f32,
    pub activity_window_ms: f32,
    pub wheel_motor_factor: f32,

    // ── Masses ───────────────────────────────────────────────────────────────
    pub player_mass: f32,
    pub unicycle_mass: f32,

    // ── Surfaces / world ─────────────────────────────────────────────────────
    pub tyre_friction: f32,
    pub tyre_restitution: f32,
    pub default_friction: f32,
    pub gravity_y: f32,
}

impl Default for RiderConfig {
    fn default() -> Self {
        Self {
            // Control law
            maximum_speed: MAXIMUM_SPEED,
            speed_increment_factor: SPEED_INCREMENT_FACTOR,
            max_safe_angle: MAX_SAFE_ANGLE,
            max_correctable_angle: MAX_CORRECTABLE_ANGLE,
            collapsed_angle_min: COLLAPSED_ANGLE_MIN,
            collapsed_angle_max: COLLAPSED_ANGLE_MAX,
            correction_angular_force: CORRECTION_ANGULAR_FORCE,
            hoist_angular_force: HOIST_ANGULAR_FORCE,
            torso_push_force_x: TORSO_PUSH_FORCE_X,
            activity_window_ms: ACTIVITY_WINDOW_MS,
            wheel_motor_factor: WHEEL_MOTOR_FACTOR,
            // Masses
            player_mass: PLAYER_MASS,
            unicycle_mass: UNICYCLE_MASS,
            // Surfaces / world
            tyre_friction: TYRE_FRICTION,
            tyre_restitution: TYRE_RESTITUTION,
            default_friction: DEFAULT_FRICTION,
            gravity_y: GRAVITY_Y,
        }
    }
}

impl RiderConfig {
    /// Parse a TOML document and validate the result.
    ///
    /// `path` is only used to label errors.
    pub fn from_toml_str(contents: &str, path: &str) -> RiderResult<Self> {
        let config: RiderConfig =
            toml::from_str(contents).map_err(|e| RiderError::ConfigParse {
                path: path.to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the control law or the solver cannot work with.
    pub fn validate(&self) -> RiderResult<()> {
        validate_maximum_speed(self.maximum_speed)?;
        validate_angle_bands(
            self.max_safe_angle,
            self.max_correctable_angle,
            self.collapsed_angle_min,
            self.collapsed_angle_max,
        )?;
        validate_motor_factor(self.wheel_motor_factor)?;
        validate_mass("PLAYER_MASS", self.player_mass)?;
        validate_mass("UNICYCLE_MASS", self.unicycle_mass)?;
        Ok(())
    }
}

/// Startup system: attempt to load `assets/rider.toml` and overwrite the
/// `RiderConfig` resource with the values present in the file.
///
/// Missing keys retain their compiled defaults.  Parse or validation errors
/// are logged but do not abort the simulation.  A missing file is not an error.
pub fn load_rider_config(mut config: ResMut<RiderConfig>) {
    match std::fs::read_to_string(CONFIG_PATH) {
        Ok(contents) => match RiderConfig::from_toml_str(&contents, CONFIG_PATH) {
            Ok(loaded) => {
                *config = loaded;
                println!("✓ Loaded rider config from {CONFIG_PATH}");
            }
            Err(e) => {
                warn!("{e}; using defaults");
            }
        },
        Err(_) => {
            println!("ℹ No {CONFIG_PATH} found; using compiled defaults");
        }
    }
}

//! Rider-specific error types.
//!
//! Steady-state simulation never produces these: the control loop is plain
//! arithmetic over already-validated physics state.  They surface at the
//! edges instead, when a skeleton blueprint is wired, when `assets/rider.toml`
//! is loaded, or when a ride script is parsed.
//!
//! ## Usage
//!
//! ```rust
//! use unicyclist::error::{validate_maximum_speed, RiderResult};
//!
//! fn check(speed: f32) -> RiderResult<()> {
//!     validate_maximum_speed(speed)?;
//!     Ok(())
//! }
//! # assert!(check(8.0).is_ok());
//! ```

use std::fmt;

/// Top-level error enum for the rider crate.
#[derive(Debug, Clone, PartialEq)]
pub enum RiderError {
    /// A joint names an endpoint body that the blueprint never declared.
    /// This is a construction-time programming error.
    MissingBody {
        /// Joint being wired.
        joint: String,
        /// Endpoint that could not be resolved.
        body: String,
    },

    /// Two bodies in one blueprint claim the same role.
    DuplicateBody {
        body: String,
    },

    /// A joint the rider cannot work without is absent from the blueprint.
    MissingJoint {
        joint: String,
    },

    /// Config constant is outside its safe operating range.
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },

    /// `rider.toml` could not be parsed.
    ConfigParse {
        path: String,
        message: String,
    },

    /// A ride script segment was malformed.
    Script {
        segment: String,
        reason: &'static str,
    },
}

impl fmt::Display for RiderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiderError::MissingBody { joint, body } => write!(
                f,
                "joint '{}' references body '{}' which is not part of the skeleton",
                joint, body
            ),
            RiderError::DuplicateBody { body } => {
                write!(f, "body '{}' is declared more than once", body)
            }
            RiderError::MissingJoint { joint } => {
                write!(f, "skeleton has no '{}' joint", joint)
            }
            RiderError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
            RiderError::ConfigParse { path, message } => {
                write!(f, "failed to parse {}: {}", path, message)
            }
            RiderError::Script { segment, reason } => {
                write!(f, "bad ride script segment '{}': {}", segment, reason)
            }
        }
    }
}

impl std::error::Error for RiderError {}

/// Convenience alias: a `Result` using `RiderError` as the error type.
pub type RiderResult<T> = Result<T, RiderError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless the motor speed ceiling is strictly positive and finite.
pub fn validate_maximum_speed(value: f32) -> RiderResult<()> {
    if !value.is_finite() || value <= 0.0 {
        Err(RiderError::UnsafeConstant {
            name: "MAXIMUM_SPEED",
            value,
            safe_range: "(0.0, ∞)",
        })
    } else {
        Ok(())
    }
}

/// Returns an error if a mass is not strictly positive.
///
/// Rapier rejects zero-mass dynamic bodies in joints with NaN impulses.
pub fn validate_mass(name: &'static str, value: f32) -> RiderResult<()> {
    if !value.is_finite() || value <= 0.0 {
        Err(RiderError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    } else {
        Ok(())
    }
}

/// Returns an error if the wheel motor gain is not strictly positive.
pub fn validate_motor_factor(value: f32) -> RiderResult<()> {
    if !value.is_finite() || value <= 0.0 {
        Err(RiderError::UnsafeConstant {
            name: "WHEEL_MOTOR_FACTOR",
            value,
            safe_range: "(0.0, ∞)",
        })
    } else {
        Ok(())
    }
}

/// Returns an error unless the tilt thresholds are ordered
/// `0 < safe < correctable ≤ collapsed_min < collapsed_max ≤ π`.
///
/// The control law assumes the posture zones are disjoint; overlapping bands
/// would let the hoist and the gentle correction fight each other.
pub fn validate_angle_bands(
    safe: f32,
    correctable: f32,
    collapsed_min: f32,
    collapsed_max: f32,
) -> RiderResult<()> {
    let ordered = 0.0 < safe
        && safe < correctable
        && correctable <= collapsed_min
        && collapsed_min < collapsed_max
        && collapsed_max <= std::f32::consts::PI;
    if ordered {
        Ok(())
    } else {
        Err(RiderError::UnsafeConstant {
            name: "ANGLE_BANDS",
            value: safe,
            safe_range: "0 < safe < correctable <= collapsed_min < collapsed_max <= π",
        })
    }
}

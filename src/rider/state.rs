//! Rider components.
//!
//! All ECS components that describe a rider live here.  Systems that mutate
//! them are elsewhere:
//! - [`crate::contact`]: contact counters
//! - [`crate::balance`]: motor speed, corrective forces, position history

use bevy::prelude::*;
use std::fmt;

// ── Roles ─────────────────────────────────────────────────────────────────────

/// Which of a mirrored limb pair a body belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Back,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Front, Side::Back];

    /// Lateral sign used when mirroring attachment offsets (`Front` = −1).
    pub fn sign(self) -> f32 {
        match self {
            Side::Front => -1.0,
            Side::Back => 1.0,
        }
    }

    fn index(self) -> usize {
        match self {
            Side::Front => 0,
            Side::Back => 1,
        }
    }
}

/// Named role of a body within the skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyRole {
    Wheel,
    Shaft,
    Torso,
    LegTop(Side),
    LegBottom(Side),
    ArmTop(Side),
    ArmBottom(Side),
    Head,
    Hat,
}

impl fmt::Display for BodyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyRole::Wheel => write!(f, "wheel"),
            BodyRole::Shaft => write!(f, "shaft"),
            BodyRole::Torso => write!(f, "torso"),
            BodyRole::LegTop(side) => write!(f, "legTop[{side:?}]"),
            BodyRole::LegBottom(side) => write!(f, "legBottom[{side:?}]"),
            BodyRole::ArmTop(side) => write!(f, "armTop[{side:?}]"),
            BodyRole::ArmBottom(side) => write!(f, "armBottom[{side:?}]"),
            BodyRole::Head => write!(f, "head"),
            BodyRole::Hat => write!(f, "hat"),
        }
    }
}

/// Named role of a joint within the skeleton.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointRole {
    ShaftWheel,
    ShaftTorso,
    LegSections(Side),
    LegTopShaft(Side),
    LegBottomWheel(Side),
    ArmSections(Side),
    TorsoArmTop(Side),
    TorsoHead,
    HeadHat,
}

impl fmt::Display for JointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JointRole::ShaftWheel => write!(f, "shaft-wheel"),
            JointRole::ShaftTorso => write!(f, "shaft-torso"),
            JointRole::LegSections(side) => write!(f, "legSections[{side:?}]"),
            JointRole::LegTopShaft(side) => write!(f, "legTop-shaft[{side:?}]"),
            JointRole::LegBottomWheel(side) => write!(f, "legBottom-wheel[{side:?}]"),
            JointRole::ArmSections(side) => write!(f, "armSections[{side:?}]"),
            JointRole::TorsoArmTop(side) => write!(f, "torso-armTop[{side:?}]"),
            JointRole::TorsoHead => write!(f, "torso-head"),
            JointRole::HeadHat => write!(f, "head-hat"),
        }
    }
}

// ── Components ────────────────────────────────────────────────────────────────

/// Marker for a rider root entity.  The root has no physics of its own; it
/// owns the control state and the named references to the rider's bodies.
#[derive(Component, Debug)]
pub struct Rider;

/// Attached to every body of a rider, pointing back to its root.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiderPart {
    pub rider: Entity,
    pub role: BodyRole,
}

/// Bodies of one limb pair member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimbBodies {
    pub top: Entity,
    pub bottom: Entity,
}

/// Non-owning named references to every body and joint of one rider.
///
/// Built once by [`crate::rider::spawn_rider`] and never changed afterwards.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Skeleton {
    pub wheel: Entity,
    pub shaft: Entity,
    pub torso: Entity,
    pub head: Entity,
    pub hat: Entity,
    pub legs: [LimbBodies; 2],
    pub arms: [LimbBodies; 2],
    /// Joint entity carrying the shaft↔wheel motor.
    pub wheel_motor: Entity,
    /// Every joint entity, in wiring order.
    pub joints: Vec<(JointRole, Entity)>,
}

impl Skeleton {
    pub fn leg(&self, side: Side) -> LimbBodies {
        self.legs[side.index()]
    }

    pub fn arm(&self, side: Side) -> LimbBodies {
        self.arms[side.index()]
    }

    /// Every body entity with its role.
    pub fn bodies(&self) -> Vec<(BodyRole, Entity)> {
        let mut bodies = vec![
            (BodyRole::Wheel, self.wheel),
            (BodyRole::Shaft, self.shaft),
            (BodyRole::Torso, self.torso),
        ];
        for side in Side::BOTH {
            let leg = self.leg(side);
            let arm = self.arm(side);
            bodies.push((BodyRole::LegTop(side), leg.top));
            bodies.push((BodyRole::LegBottom(side), leg.bottom));
            bodies.push((BodyRole::ArmTop(side), arm.top));
            bodies.push((BodyRole::ArmBottom(side), arm.bottom));
        }
        bodies.push((BodyRole::Head, self.head));
        bodies.push((BodyRole::Hat, self.hat));
        bodies
    }

    pub fn joint(&self, role: JointRole) -> Option<Entity> {
        self.joints
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, e)| *e)
    }
}

/// Directional intent supplied by the input collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    pub fn is_active(self) -> bool {
        !matches!(self, Direction::None)
    }

    /// −1 for `Left`, +1 for `Right`, 0 for `None`.
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
            Direction::None => 0.0,
        }
    }
}

/// Per-rider control state: current intent and when it was last active.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct RiderControl {
    direction: Direction,
    /// Wall-clock milliseconds of the last step that saw an active direction.
    /// `None` until the first input ever arrives.
    last_active_ms: Option<f64>,
}

impl RiderControl {
    /// The single setter exposed to the input collaborator.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn last_active_ms(&self) -> Option<f64> {
        self.last_active_ms
    }

    /// Stamp `now_ms` if a direction is held and return the time since the last
    /// activity.  A rider that never received input has been idle forever.
    pub fn observe(&mut self, now_ms: f64) -> f64 {
        if self.direction.is_active() {
            self.last_active_ms = Some(now_ms);
        }
        match self.last_active_ms {
            Some(last) => now_ms - last,
            None => f64::INFINITY,
        }
    }
}

/// Target angular speed of the shaft↔wheel motor.
///
/// Lives on the motor's joint entity; `sync_wheel_motor_system` mirrors it
/// into the `ImpulseJoint` before each physics step.  A positive speed pedals
/// forward: the wheel turns clockwise and rolls toward +x.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelMotor {
    pub speed: f32,
}

impl WheelMotor {
    /// Target for the joint, which drives wheel minus shaft angular velocity.
    /// Counter-clockwise is positive there, so forward is negative.
    pub fn joint_velocity(self) -> f32 {
        -self.speed
    }
}

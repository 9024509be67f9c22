//! Pure skeleton blueprint: bodies, shapes, masses and joints of one rider.
//!
//! The blueprint is plain data with no ECS or physics handles, so the mass
//! budget and the joint table can be checked without spawning anything.
//! [`crate::rider::spawn_rider`] turns it into entities.
//!
//! Bodies are placed by walking the joint tree out from the wheel hub, so
//! every joint starts closed and inside its limits.  Each leg is solved so its
//! pedal sits on its crank pivot; the elbows start half bent.
//!
//! ## Joint table
//!
//! | Joint | A | B | Motor | Limits |
//! |-------|---|---|-------|--------|
//! | shaft-wheel | shaft | wheel | speed 0 | - |
//! | shaft-torso | shaft | torso | - | ±0.05π |
//! | leg sections ×2 | legTop | legBottom | - | lower 0.2π |
//! | legTop-shaft ×2 | legTop | shaft | - | - |
//! | legBottom-wheel ×2 | legBottom | wheel | - | - |
//! | arm sections ×2 | armBottom | armTop | - | 0.12π … 0.7π |
//! | torso-armTop ×2 | torso | armTop | - | −0.3π … 0.2π |
//! | torso-head | torso | head | - | ±0.05π |
//! | head-hat | head | hat | lock | - |
//!
//! Joints are wired as they are declared: a joint whose endpoint body has not
//! been pushed yet is rejected on the spot.

use super::state::{BodyRole, JointRole, Side};
use crate::config::RiderConfig;
use crate::constants::*;
use crate::error::{RiderError, RiderResult};
use crate::surface::SurfaceMaterial;
use bevy::prelude::*;
use std::f32::consts::PI;

// ── Dimensions ────────────────────────────────────────────────────────────────

pub const WHEEL_RADIUS: f32 = 0.36;
/// Horizontal distance from the wheel hub to each pedal crank pivot.
const CRANK_LENGTH: f32 = 0.12;

const SHAFT_HEIGHT: f32 = 0.7;
const SHAFT_WIDTH: f32 = 0.04;
const SEAT_HEIGHT: f32 = 0.05;
const SEAT_WIDTH: f32 = 0.3;
const PELVIS_WIDTH: f32 = 0.2;

const TORSO_WIDTH: f32 = 0.25;
const TORSO_HEIGHT: f32 = 0.5;

const LEG_WIDTH: f32 = 0.15;
const LEG_SEGMENT_LENGTH: f32 = 0.4;

const ARM_WIDTH: f32 = 0.125;
const ARM_SEGMENT_LENGTH: f32 = 0.25;

const HEAD_RADIUS: f32 = TORSO_WIDTH / 2.0;
const NECK_HEIGHT: f32 = HEAD_RADIUS * 0.5;
const NECK_WIDTH: f32 = HEAD_RADIUS;

const HAT_BRIM_RADIUS: f32 = HEAD_RADIUS * 1.2;
const HAT_BRIM_HEIGHT: f32 = 0.01;
const HAT_TOP_RADIUS: f32 = HEAD_RADIUS * 0.8;
const HAT_TOP_HEIGHT: f32 = HEAD_RADIUS;

/// Wheel axle on the shaft.
const SHAFT_AXLE: Vec2 = Vec2::new(0.0, -SHAFT_HEIGHT / 2.0);
/// Pelvis centre on the shaft, where the torso attaches.
const SEAT_PIVOT: Vec2 = Vec2::new(0.0, SHAFT_HEIGHT / 2.0 + SEAT_HEIGHT + PELVIS_WIDTH / 2.0);
/// Top of the seat, where both thighs attach.  0.75 m above the axle, which
/// keeps every crank position within the legs' reach.
const HIP_PIVOT: Vec2 = Vec2::new(0.0, SHAFT_HEIGHT / 2.0 + SEAT_HEIGHT);
/// Waist on the torso, seated on the pelvis.
const TORSO_WAIST: Vec2 = Vec2::new(0.0, -TORSO_HEIGHT / 2.0 + TORSO_HEIGHT / 8.0);
/// Shoulder line on the torso, shared by both arms and the neck.
const SHOULDER_PIVOT: Vec2 = Vec2::new(0.0, TORSO_HEIGHT / 2.0 - ARM_WIDTH / 2.0);
/// Base of the neck on the head.
const NECK_PIVOT: Vec2 = Vec2::new(0.0, -(HEAD_RADIUS + NECK_HEIGHT));
/// Hat centre in the head's frame.
const HAT_OFFSET: Vec2 = Vec2::new(
    0.0,
    HEAD_RADIUS * 0.75 + HAT_TOP_HEIGHT / 2.0 + HAT_BRIM_HEIGHT,
);
/// Pedal position on the lower leg.
const PEDAL_PIVOT: Vec2 = Vec2::new(-0.175, -0.28);
/// Starting elbow bend, near the middle of its limits.
const ELBOW_BEND: f32 = PI * 0.4;

// ── Plan types ────────────────────────────────────────────────────────────────

/// Collision geometry of one shape.  Sizes are full extents, not half extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Box { width: f32, height: f32 },
    Circle { radius: f32 },
}

/// One shape attached to a body at a local offset and angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapePlan {
    pub geometry: Geometry,
    pub offset: Vec2,
    pub angle: f32,
}

impl ShapePlan {
    fn centered(geometry: Geometry) -> Self {
        Self::at(geometry, Vec2::ZERO)
    }

    fn at(geometry: Geometry, offset: Vec2) -> Self {
        Self {
            geometry,
            offset,
            angle: 0.0,
        }
    }
}

/// One rigid body of the skeleton.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPlan {
    pub role: BodyRole,
    pub mass: f32,
    /// World-space spawn position.
    pub position: Vec2,
    /// Spawn rotation (radians, counter-clockwise).
    pub angle: f32,
    pub material: SurfaceMaterial,
    pub shapes: Vec<ShapePlan>,
}

/// Independently enabled revolute limits (radians, B relative to A).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngleLimits {
    pub lower: Option<f32>,
    pub upper: Option<f32>,
}

impl AngleLimits {
    pub const NONE: AngleLimits = AngleLimits {
        lower: None,
        upper: None,
    };

    fn between(lower: f32, upper: f32) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    fn symmetric(amplitude: f32) -> Self {
        Self::between(-amplitude, amplitude)
    }

    fn lower_only(lower: f32) -> Self {
        Self {
            lower: Some(lower),
            upper: None,
        }
    }

    pub fn is_limited(&self) -> bool {
        self.lower.is_some() || self.upper.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointKind {
    /// Shared pivot, optionally limited and/or motorised.
    Revolute {
        pivot_a: Vec2,
        pivot_b: Vec2,
        limits: AngleLimits,
        /// Initial motor target speed; `None` means no motor.
        motor: Option<f32>,
    },
    /// Rigid weld: B sits at `offset_b` in A's frame.
    Lock { offset_b: Vec2 },
}

/// One constraint between two bodies of the skeleton.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointPlan {
    pub role: JointRole,
    pub body_a: BodyRole,
    pub body_b: BodyRole,
    pub kind: JointKind,
}

impl JointPlan {
    fn revolute(
        role: JointRole,
        (body_a, pivot_a): (BodyRole, Vec2),
        (body_b, pivot_b): (BodyRole, Vec2),
        limits: AngleLimits,
    ) -> Self {
        Self {
            role,
            body_a,
            body_b,
            kind: JointKind::Revolute {
                pivot_a,
                pivot_b,
                limits,
                motor: None,
            },
        }
    }
}

/// Spawn placement of one body.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pose {
    position: Vec2,
    angle: f32,
}

impl Pose {
    fn upright(position: Vec2) -> Self {
        Self {
            position,
            angle: 0.0,
        }
    }

    /// World position of a point in this body's frame.
    fn world(&self, local: Vec2) -> Vec2 {
        self.position + Vec2::from_angle(self.angle).rotate(local)
    }

    /// Pose of a body turned to `angle` whose `pivot` sits on this body's `anchor`.
    fn joined(&self, anchor: Vec2, pivot: Vec2, angle: f32) -> Self {
        Self {
            position: self.world(anchor) - Vec2::from_angle(angle).rotate(pivot),
            angle,
        }
    }
}

/// Thigh and shin poses that put the hip on `hip` and the pedal pivot on
/// `pedal`.  The knee bends forward, the only way its limit allows.
fn leg_pose(hip: Vec2, pedal: Vec2) -> (Pose, Pose) {
    let half = LEG_SEGMENT_LENGTH / 2.0;
    let thigh = Vec2::new(0.0, -LEG_SEGMENT_LENGTH);
    let shin = PEDAL_PIVOT - Vec2::new(0.0, half);
    let reach = pedal - hip;

    // Law of cosines gives the shin's component along the thigh.
    let along = (thigh.length_squared() + shin.length_squared() - reach.length_squared())
        / (2.0 * LEG_SEGMENT_LENGTH);
    let knee = (along / shin.length()).clamp(-1.0, 1.0).asin() - shin.y.atan2(shin.x);
    let hip_to_pedal = thigh + Vec2::from_angle(knee).rotate(shin);
    let thigh_angle = reach.y.atan2(reach.x) - hip_to_pedal.y.atan2(hip_to_pedal.x);

    let top = Pose::upright(hip).joined(Vec2::ZERO, Vec2::new(0.0, half), thigh_angle);
    let bottom = top.joined(
        Vec2::new(0.0, -half),
        Vec2::new(0.0, half),
        thigh_angle + knee,
    );
    (top, bottom)
}

/// Per-side attachment data for a mirrored limb pair.
#[derive(Debug, Clone, Copy)]
struct LimbSpec {
    side: Side,
    /// Crank pivot on the wheel where this side's foot is pinned.
    crank_pivot: Vec2,
}

fn limb_specs() -> [LimbSpec; 2] {
    Side::BOTH.map(|side| LimbSpec {
        side,
        crank_pivot: Vec2::new(CRANK_LENGTH * side.sign(), 0.0),
    })
}

// ── Blueprint ─────────────────────────────────────────────────────────────────

/// Ordered bodies and joints of one rider.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkeletonBlueprint {
    bodies: Vec<BodyPlan>,
    joints: Vec<JointPlan>,
}

impl SkeletonBlueprint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a body.  Roles must be unique.
    pub fn push_body(&mut self, body: BodyPlan) -> RiderResult<&mut Self> {
        if self.body(body.role).is_some() {
            return Err(RiderError::DuplicateBody {
                body: body.role.to_string(),
            });
        }
        self.bodies.push(body);
        Ok(self)
    }

    /// Wire a joint.  Both endpoints must already be declared.
    pub fn push_joint(&mut self, joint: JointPlan) -> RiderResult<&mut Self> {
        for endpoint in [joint.body_a, joint.body_b] {
            if self.body(endpoint).is_none() {
                return Err(RiderError::MissingBody {
                    joint: joint.role.to_string(),
                    body: endpoint.to_string(),
                });
            }
        }
        self.joints.push(joint);
        Ok(self)
    }

    pub fn bodies(&self) -> &[BodyPlan] {
        &self.bodies
    }

    pub fn joints(&self) -> &[JointPlan] {
        &self.joints
    }

    pub fn body(&self, role: BodyRole) -> Option<&BodyPlan> {
        self.bodies.iter().find(|b| b.role == role)
    }

    pub fn joint(&self, role: JointRole) -> Option<&JointPlan> {
        self.joints.iter().find(|j| j.role == role)
    }

    pub fn total_mass(&self) -> f32 {
        self.bodies.iter().map(|b| b.mass).sum()
    }

    /// The full unicycle rider at `spawn` (the wheel hub position).
    pub fn rider(spawn: Vec2, config: &RiderConfig) -> RiderResult<Self> {
        let player = config.player_mass;
        let unicycle = config.unicycle_mass;
        let mut bp = Self::new();

        let hub = Pose::upright(spawn);
        let seat = hub.joined(Vec2::ZERO, SHAFT_AXLE, 0.0);
        let chest = seat.joined(SEAT_PIVOT, TORSO_WAIST, 0.0);

        bp.push_body(wheel(spawn, unicycle * 0.5))?
            .push_body(shaft(seat.position, unicycle * 0.5))?
            .push_body(torso(chest.position, player * TORSO_WEIGHT_PROP))?;

        let mut shaft_wheel = JointPlan::revolute(
            JointRole::ShaftWheel,
            (BodyRole::Shaft, SHAFT_AXLE),
            (BodyRole::Wheel, Vec2::ZERO),
            AngleLimits::NONE,
        );
        if let JointKind::Revolute { motor, .. } = &mut shaft_wheel.kind {
            *motor = Some(0.0);
        }
        bp.push_joint(shaft_wheel)?.push_joint(JointPlan::revolute(
            JointRole::ShaftTorso,
            (BodyRole::Shaft, SEAT_PIVOT),
            (BodyRole::Torso, TORSO_WAIST),
            AngleLimits::symmetric(PI * 0.05),
        ))?;

        for limb in limb_specs() {
            bp.push_leg(seat.world(HIP_PIVOT), hub.world(limb.crank_pivot), limb, player)?;
        }
        for limb in limb_specs() {
            bp.push_arm(chest, limb, player)?;
        }

        let head_pose = chest.joined(SHOULDER_PIVOT, NECK_PIVOT, 0.0);
        bp.push_body(head(head_pose.position, player * HEAD_WEIGHT_PROP))?
            .push_body(hat(head_pose.world(HAT_OFFSET), player * HAT_WEIGHT_PROP))?
            .push_joint(JointPlan::revolute(
                JointRole::TorsoHead,
                (BodyRole::Torso, SHOULDER_PIVOT),
                (BodyRole::Head, NECK_PIVOT),
                AngleLimits::symmetric(PI * 0.05),
            ))?
            .push_joint(JointPlan {
                role: JointRole::HeadHat,
                body_a: BodyRole::Head,
                body_b: BodyRole::Hat,
                kind: JointKind::Lock {
                    offset_b: HAT_OFFSET,
                },
            })?;

        Ok(bp)
    }

    fn push_leg(
        &mut self,
        hip: Vec2,
        pedal: Vec2,
        limb: LimbSpec,
        player: f32,
    ) -> RiderResult<()> {
        let side = limb.side;
        let top = BodyRole::LegTop(side);
        let bottom = BodyRole::LegBottom(side);
        let half = LEG_SEGMENT_LENGTH / 2.0;
        let (thigh, shin) = leg_pose(hip, pedal);

        self.push_body(BodyPlan {
            role: top,
            mass: player * LEG_TOP_WEIGHT_PROP,
            position: thigh.position,
            angle: thigh.angle,
            material: SurfaceMaterial::Player,
            shapes: vec![
                ShapePlan::centered(Geometry::Box {
                    width: LEG_WIDTH,
                    height: LEG_SEGMENT_LENGTH,
                }),
                // knee
                ShapePlan::at(
                    Geometry::Circle {
                        radius: LEG_WIDTH / 2.0,
                    },
                    Vec2::new(0.0, -half),
                ),
            ],
        })?
        .push_body(BodyPlan {
            role: bottom,
            mass: player * LEG_BOTTOM_WEIGHT_PROP,
            position: shin.position,
            angle: shin.angle,
            material: SurfaceMaterial::Player,
            shapes: vec![
                ShapePlan::centered(Geometry::Box {
                    width: LEG_WIDTH,
                    height: LEG_SEGMENT_LENGTH,
                }),
                // shoe
                ShapePlan::at(
                    Geometry::Box {
                        width: 0.3,
                        height: 0.1,
                    },
                    Vec2::new(-0.075, -0.205),
                ),
                ShapePlan::at(Geometry::Circle { radius: 0.1 }, Vec2::new(-0.225, -0.155)),
                // pedal
                ShapePlan::at(
                    Geometry::Box {
                        width: 0.1,
                        height: 0.05,
                    },
                    PEDAL_PIVOT,
                ),
            ],
        })?
        .push_joint(JointPlan::revolute(
            JointRole::LegSections(side),
            (top, Vec2::new(0.0, -half)),
            (bottom, Vec2::new(0.0, half)),
            AngleLimits::lower_only(PI * 0.2),
        ))?
        .push_joint(JointPlan::revolute(
            JointRole::LegTopShaft(side),
            (top, Vec2::new(0.0, half)),
            (BodyRole::Shaft, HIP_PIVOT),
            AngleLimits::NONE,
        ))?
        .push_joint(JointPlan::revolute(
            JointRole::LegBottomWheel(side),
            (bottom, PEDAL_PIVOT),
            (BodyRole::Wheel, limb.crank_pivot),
            AngleLimits::NONE,
        ))?;
        Ok(())
    }

    fn push_arm(&mut self, chest: Pose, limb: LimbSpec, player: f32) -> RiderResult<()> {
        let side = limb.side;
        let top = BodyRole::ArmTop(side);
        let bottom = BodyRole::ArmBottom(side);
        let half = ARM_SEGMENT_LENGTH / 2.0;
        let upper = chest.joined(SHOULDER_PIVOT, Vec2::new(0.0, half), 0.0);
        let fore = upper.joined(Vec2::new(0.0, -half), Vec2::new(0.0, half), -ELBOW_BEND);
        let segment = Geometry::Box {
            width: ARM_WIDTH,
            height: ARM_SEGMENT_LENGTH,
        };

        self.push_body(BodyPlan {
            role: top,
            mass: player * ARM_TOP_WEIGHT_PROP,
            position: upper.position,
            angle: upper.angle,
            material: SurfaceMaterial::Player,
            shapes: vec![ShapePlan::centered(segment)],
        })?
        .push_body(BodyPlan {
            role: bottom,
            mass: player * ARM_BOTTOM_WEIGHT_PROP,
            position: fore.position,
            angle: fore.angle,
            material: SurfaceMaterial::Player,
            shapes: vec![
                // elbow
                ShapePlan::at(
                    Geometry::Circle {
                        radius: ARM_WIDTH / 2.0,
                    },
                    Vec2::new(0.0, half),
                ),
                // hand
                ShapePlan::at(
                    Geometry::Circle {
                        radius: ARM_WIDTH * 0.9 / 2.0,
                    },
                    Vec2::new(0.0, -ARM_SEGMENT_LENGTH * 1.2 / 2.0),
                ),
                ShapePlan::centered(segment),
            ],
        })?
        .push_joint(JointPlan::revolute(
            JointRole::ArmSections(side),
            (bottom, Vec2::new(0.0, half)),
            (top, Vec2::new(0.0, -half)),
            AngleLimits::between(PI * 0.12, PI * 0.7),
        ))?
        .push_joint(JointPlan::revolute(
            JointRole::TorsoArmTop(side),
            (BodyRole::Torso, SHOULDER_PIVOT),
            (top, Vec2::new(0.0, half)),
            AngleLimits::between(PI * -0.3, PI * 0.2),
        ))?;
        Ok(())
    }
}

// ── Single bodies ─────────────────────────────────────────────────────────────

fn wheel(position: Vec2, mass: f32) -> BodyPlan {
    BodyPlan {
        role: BodyRole::Wheel,
        mass,
        position,
        angle: 0.0,
        material: SurfaceMaterial::PlayerTyre,
        shapes: vec![ShapePlan::centered(Geometry::Circle {
            radius: WHEEL_RADIUS,
        })],
    }
}

fn shaft(position: Vec2, mass: f32) -> BodyPlan {
    BodyPlan {
        role: BodyRole::Shaft,
        mass,
        position,
        angle: 0.0,
        material: SurfaceMaterial::Player,
        shapes: vec![
            ShapePlan::centered(Geometry::Box {
                width: SHAFT_WIDTH,
                height: SHAFT_HEIGHT,
            }),
            // seat
            ShapePlan::at(
                Geometry::Box {
                    width: SEAT_WIDTH,
                    height: SEAT_HEIGHT,
                },
                Vec2::new(0.0, SHAFT_HEIGHT / 2.0 + SEAT_HEIGHT / 2.0),
            ),
            // pelvis
            ShapePlan::at(
                Geometry::Circle {
                    radius: PELVIS_WIDTH / 2.0,
                },
                SEAT_PIVOT,
            ),
        ],
    }
}

fn torso(position: Vec2, mass: f32) -> BodyPlan {
    BodyPlan {
        role: BodyRole::Torso,
        mass,
        position,
        angle: 0.0,
        material: SurfaceMaterial::Player,
        shapes: vec![
            // belly
            ShapePlan::at(
                Geometry::Box {
                    width: TORSO_WIDTH,
                    height: TORSO_HEIGHT - TORSO_WIDTH / 2.0,
                },
                Vec2::new(0.0, -TORSO_WIDTH / 4.0),
            ),
            // chest
            ShapePlan::at(
                Geometry::Circle {
                    radius: TORSO_WIDTH / 2.0,
                },
                Vec2::new(0.0, TORSO_HEIGHT / 2.0 - TORSO_WIDTH / 2.0),
            ),
        ],
    }
}

fn head(position: Vec2, mass: f32) -> BodyPlan {
    BodyPlan {
        role: BodyRole::Head,
        mass,
        position,
        angle: 0.0,
        material: SurfaceMaterial::Player,
        shapes: vec![
            ShapePlan::centered(Geometry::Circle {
                radius: HEAD_RADIUS,
            }),
            // neck, doubled in height so it overlaps the shoulders
            ShapePlan::at(
                Geometry::Box {
                    width: NECK_WIDTH,
                    height: NECK_HEIGHT * 2.0,
                },
                Vec2::new(0.0, -(HEAD_RADIUS + NECK_HEIGHT / 2.0)),
            ),
        ],
    }
}

fn hat(position: Vec2, mass: f32) -> BodyPlan {
    BodyPlan {
        role: BodyRole::Hat,
        mass,
        position,
        angle: 0.0,
        material: SurfaceMaterial::Player,
        shapes: vec![
            ShapePlan::centered(Geometry::Box {
                width: HAT_TOP_RADIUS * 2.0,
                height: HAT_TOP_HEIGHT,
            }),
            // brim
            ShapePlan::at(
                Geometry::Box {
                    width: HAT_BRIM_RADIUS * 2.0,
                    height: HAT_BRIM_HEIGHT,
                },
                Vec2::new(0.0, -(HAT_TOP_HEIGHT / 2.0 + HAT_BRIM_HEIGHT / 2.0)),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rider() -> SkeletonBlueprint {
        SkeletonBlueprint::rider(Vec2::new(0.0, 15.37), &RiderConfig::default()).unwrap()
    }

    fn pose(bp: &SkeletonBlueprint, role: BodyRole) -> Pose {
        let body = bp.body(role).unwrap();
        Pose {
            position: body.position,
            angle: body.angle,
        }
    }

    fn limits(bp: &SkeletonBlueprint, role: JointRole) -> AngleLimits {
        match bp.joint(role).unwrap().kind {
            JointKind::Revolute { limits, .. } => limits,
            JointKind::Lock { .. } => panic!("{role} is a lock"),
        }
    }

    #[test]
    fn has_every_named_body_and_joint() {
        let bp = rider();
        assert_eq!(bp.bodies().len(), 13);
        assert_eq!(bp.joints().len(), 15);
        for side in Side::BOTH {
            for role in [
                BodyRole::LegTop(side),
                BodyRole::LegBottom(side),
                BodyRole::ArmTop(side),
                BodyRole::ArmBottom(side),
            ] {
                assert!(bp.body(role).is_some(), "missing {role}");
            }
        }
    }

    #[test]
    fn mass_budget_splits_by_proportion() {
        let config = RiderConfig::default();
        let bp = rider();
        let mass = |role| bp.body(role).unwrap().mass;

        assert!((mass(BodyRole::Wheel) - config.unicycle_mass * 0.5).abs() < 1e-6);
        assert!((mass(BodyRole::Shaft) - config.unicycle_mass * 0.5).abs() < 1e-6);
        assert!((mass(BodyRole::Torso) - config.player_mass * 0.5).abs() < 1e-6);
        assert!((mass(BodyRole::LegBottom(Side::Back)) - config.player_mass * 0.09).abs() < 1e-6);
        assert!((mass(BodyRole::Hat) - config.player_mass * 0.01).abs() < 1e-6);

        // 0.5 + 2·(0.07 + 0.09 + 0.025 + 0.025) + 0.07 + 0.01 = 1.0
        let expected = config.player_mass + config.unicycle_mass;
        assert!(
            (bp.total_mass() - expected).abs() < 1e-5,
            "expected total {expected}, got {}",
            bp.total_mass()
        );
    }

    #[test]
    fn only_shaft_wheel_is_motorised() {
        let bp = rider();
        for joint in bp.joints() {
            let motor = match joint.kind {
                JointKind::Revolute { motor, .. } => motor,
                JointKind::Lock { .. } => None,
            };
            if joint.role == JointRole::ShaftWheel {
                assert_eq!(motor, Some(0.0));
            } else {
                assert_eq!(motor, None, "{} should have no motor", joint.role);
            }
        }
    }

    #[test]
    fn joint_limits_match_table() {
        let bp = rider();
        assert_eq!(limits(&bp, JointRole::ShaftWheel), AngleLimits::NONE);
        assert_eq!(
            limits(&bp, JointRole::ShaftTorso),
            AngleLimits::between(-PI * 0.05, PI * 0.05)
        );
        assert_eq!(
            limits(&bp, JointRole::LegSections(Side::Front)),
            AngleLimits {
                lower: Some(PI * 0.2),
                upper: None
            }
        );
        assert_eq!(
            limits(&bp, JointRole::ArmSections(Side::Back)),
            AngleLimits::between(PI * 0.12, PI * 0.7)
        );
        assert_eq!(
            limits(&bp, JointRole::TorsoArmTop(Side::Front)),
            AngleLimits::between(PI * -0.3, PI * 0.2)
        );
        assert!(!limits(&bp, JointRole::LegBottomWheel(Side::Back)).is_limited());
        assert!(matches!(
            bp.joint(JointRole::HeadHat).unwrap().kind,
            JointKind::Lock { .. }
        ));
    }

    #[test]
    fn limb_pairs_mirror_only_the_crank_pivot() {
        let bp = rider();
        let pivot = |side| match bp.joint(JointRole::LegBottomWheel(side)).unwrap().kind {
            JointKind::Revolute { pivot_b, .. } => pivot_b,
            JointKind::Lock { .. } => unreachable!(),
        };
        assert_eq!(pivot(Side::Front), Vec2::new(-0.12, 0.0));
        assert_eq!(pivot(Side::Back), Vec2::new(0.12, 0.0));

        let front = bp.body(BodyRole::LegTop(Side::Front)).unwrap();
        let back = bp.body(BodyRole::LegTop(Side::Back)).unwrap();
        assert_eq!(front.shapes, back.shapes);
        assert_eq!(front.mass, back.mass);
    }

    #[test]
    fn every_joint_starts_closed_and_within_limits() {
        let bp = rider();
        for joint in bp.joints() {
            let a = pose(&bp, joint.body_a);
            let b = pose(&bp, joint.body_b);
            match joint.kind {
                JointKind::Revolute {
                    pivot_a,
                    pivot_b,
                    limits,
                    ..
                } => {
                    let gap = a.world(pivot_a).distance(b.world(pivot_b));
                    assert!(gap < 1e-4, "{} opens by {gap}", joint.role);
                    let relative = b.angle - a.angle;
                    assert!(
                        limits.lower.is_none_or(|lower| relative >= lower - 1e-5)
                            && limits.upper.is_none_or(|upper| relative <= upper + 1e-5),
                        "{} starts at {relative} outside {limits:?}",
                        joint.role
                    );
                }
                JointKind::Lock { offset_b } => {
                    assert!(a.world(offset_b).distance(b.position) < 1e-4);
                    assert_eq!(a.angle, b.angle);
                }
            }
        }
    }

    #[test]
    fn knees_bend_forward_past_their_limit() {
        let bp = rider();
        for side in Side::BOTH {
            let thigh = pose(&bp, BodyRole::LegTop(side));
            let shin = pose(&bp, BodyRole::LegBottom(side));
            assert!(shin.angle - thigh.angle > PI * 0.2);
            // Knee ahead of the hip, toward the toes
            let hip = thigh.world(Vec2::new(0.0, LEG_SEGMENT_LENGTH / 2.0));
            let knee = thigh.world(Vec2::new(0.0, -LEG_SEGMENT_LENGTH / 2.0));
            assert!(knee.x < hip.x);
        }
    }

    #[test]
    fn pedal_linkage_closes_at_every_crank_angle() {
        let thigh = Vec2::new(0.0, -LEG_SEGMENT_LENGTH);
        let shin = PEDAL_PIVOT - Vec2::new(0.0, LEG_SEGMENT_LENGTH / 2.0);
        let span = |knee: f32| (thigh + Vec2::from_angle(knee).rotate(shin)).length();
        // The knee limit stops the leg short of straight
        let longest = span(PI * 0.2);
        let shortest = span(PI);

        // Hip height above the axle does not depend on how the shaft leans
        let hip = HIP_PIVOT - SHAFT_AXLE;
        for step in 0..72 {
            let turn = step as f32 * std::f32::consts::TAU / 72.0;
            let crank = Vec2::from_angle(turn).rotate(Vec2::new(CRANK_LENGTH, 0.0));
            let gap = hip.distance(crank);
            assert!(gap < longest - 0.02, "crank at {turn}: {gap} vs reach {longest}");
            assert!(gap > shortest, "crank at {turn}: {gap} vs fold {shortest}");
        }
    }

    #[test]
    fn legs_solve_onto_any_reachable_pedal() {
        let hip = Vec2::new(1.0, 2.0);
        for pedal in [
            Vec2::new(1.12, 1.25),
            Vec2::new(0.88, 1.25),
            Vec2::new(1.0, 1.13),
            Vec2::new(1.0, 1.37),
        ] {
            let (top, bottom) = leg_pose(hip, pedal);
            let half = LEG_SEGMENT_LENGTH / 2.0;
            assert!(top.world(Vec2::new(0.0, half)).distance(hip) < 1e-4);
            assert!(top
                .world(Vec2::new(0.0, -half))
                .distance(bottom.world(Vec2::new(0.0, half)))
                < 1e-4);
            assert!(bottom.world(PEDAL_PIVOT).distance(pedal) < 1e-4);
        }
    }

    #[test]
    fn positions_follow_spawn() {
        let a = SkeletonBlueprint::rider(Vec2::ZERO, &RiderConfig::default()).unwrap();
        let b = SkeletonBlueprint::rider(Vec2::new(5.0, -2.0), &RiderConfig::default()).unwrap();
        for (pa, pb) in a.bodies().iter().zip(b.bodies()) {
            let shift = pb.position - pa.position;
            assert!(shift.distance(Vec2::new(5.0, -2.0)) < 1e-4, "{} moved {shift}", pa.role);
            assert!((pb.angle - pa.angle).abs() < 1e-5);
        }
        let torso = a.body(BodyRole::Torso).unwrap().position;
        assert!(torso.distance(Vec2::new(0.0, 1.0375)) < 1e-5);
        let hat = a.body(BodyRole::Hat).unwrap().position;
        let head = a.body(BodyRole::Head).unwrap().position;
        assert!(head.distance(torso + Vec2::new(0.0, 0.375)) < 1e-5);
        assert!(hat.y > head.y);
    }

    #[test]
    fn joint_before_body_fails_fast() {
        let mut bp = SkeletonBlueprint::new();
        bp.push_body(wheel(Vec2::ZERO, 0.2)).unwrap();
        let err = bp
            .push_joint(JointPlan::revolute(
                JointRole::ShaftWheel,
                (BodyRole::Shaft, Vec2::ZERO),
                (BodyRole::Wheel, Vec2::ZERO),
                AngleLimits::NONE,
            ))
            .unwrap_err();
        assert_eq!(
            err,
            RiderError::MissingBody {
                joint: "shaft-wheel".into(),
                body: "shaft".into()
            }
        );
        assert!(bp.joints().is_empty());
    }

    #[test]
    fn duplicate_body_is_rejected() {
        let mut bp = SkeletonBlueprint::new();
        bp.push_body(wheel(Vec2::ZERO, 0.2)).unwrap();
        assert!(bp.push_body(wheel(Vec2::ONE, 0.2)).is_err());
        assert_eq!(bp.bodies().len(), 1);
    }

    #[test]
    fn tyre_is_the_only_tyre() {
        let bp = rider();
        let tyres: Vec<_> = bp
            .bodies()
            .iter()
            .filter(|b| b.material == SurfaceMaterial::PlayerTyre)
            .map(|b| b.role)
            .collect();
        assert_eq!(tyres, vec![BodyRole::Wheel]);
    }
}

//! Blueprint → entities.
//!
//! Every body becomes one entity carrying its rigid body, a compound collider
//! built from the blueprint shapes, its mass and surface response.  Every
//! joint becomes a child entity of its B body holding one `ImpulseJoint`
//! whose parent is the A body, so a body can take part in any number of
//! joints.  The rider root holds the [`Skeleton`] plus the per-rider control,
//! contact and history state.

use super::blueprint::{BodyPlan, Geometry, JointKind, JointPlan, SkeletonBlueprint};
use super::state::{
    BodyRole, JointRole, LimbBodies, Rider, RiderControl, RiderPart, Side, Skeleton, WheelMotor,
};
use crate::balance::BalanceReport;
use crate::config::RiderConfig;
use crate::contact::{ContactState, TrackedPart};
use crate::error::{RiderError, RiderResult};
use crate::history::PositionHistory;
use crate::surface::SurfaceMaterials;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use std::collections::HashMap;
use std::f32::consts::PI;

/// Every body role a complete skeleton needs.
fn required_bodies() -> Vec<BodyRole> {
    let mut roles = vec![
        BodyRole::Wheel,
        BodyRole::Shaft,
        BodyRole::Torso,
        BodyRole::Head,
        BodyRole::Hat,
    ];
    for side in Side::BOTH {
        roles.extend([
            BodyRole::LegTop(side),
            BodyRole::LegBottom(side),
            BodyRole::ArmTop(side),
            BodyRole::ArmBottom(side),
        ]);
    }
    roles
}

/// Build the standard rider blueprint at `spawn` and spawn it.
pub fn spawn_rider(
    commands: &mut Commands,
    spawn: Vec2,
    config: &RiderConfig,
    materials: &SurfaceMaterials,
) -> RiderResult<Entity> {
    let blueprint = SkeletonBlueprint::rider(spawn, config)?;
    spawn_blueprint(commands, &blueprint, config, materials)
}

/// Spawn any blueprint as a rider.
///
/// Completeness is checked before the first entity is created, so an error
/// leaves the world untouched.
pub fn spawn_blueprint(
    commands: &mut Commands,
    blueprint: &SkeletonBlueprint,
    config: &RiderConfig,
    materials: &SurfaceMaterials,
) -> RiderResult<Entity> {
    for role in required_bodies() {
        if blueprint.body(role).is_none() {
            return Err(RiderError::MissingBody {
                joint: "skeleton".to_string(),
                body: role.to_string(),
            });
        }
    }
    if blueprint.joint(JointRole::ShaftWheel).is_none() {
        return Err(RiderError::MissingJoint {
            joint: JointRole::ShaftWheel.to_string(),
        });
    }

    let wheel_spawn = blueprint
        .body(BodyRole::Wheel)
        .map(|b| b.position)
        .unwrap_or_default();

    let root = commands.spawn((Rider, Name::new("Rider"))).id();

    let mut bodies: HashMap<BodyRole, Entity> = HashMap::new();
    for plan in blueprint.bodies() {
        let entity = spawn_body(commands, root, plan, materials);
        bodies.insert(plan.role, entity);
    }

    let mut joints = Vec::with_capacity(blueprint.joints().len());
    for plan in blueprint.joints() {
        let entity = spawn_joint(commands, &bodies, plan, config)?;
        joints.push((plan.role, entity));
    }

    let skeleton = assemble_skeleton(&bodies, joints)?;
    commands.entity(root).insert((
        skeleton,
        RiderControl::default(),
        ContactState::default(),
        PositionHistory::new(wheel_spawn),
        BalanceReport::default(),
    ));

    info!(
        "Rider {root} spawned at ({:.2}, {:.2}): {} bodies, {} joints, {:.2} kg",
        wheel_spawn.x,
        wheel_spawn.y,
        blueprint.bodies().len(),
        blueprint.joints().len(),
        blueprint.total_mass()
    );
    Ok(root)
}

fn collider_for(plan: &BodyPlan) -> Collider {
    let shapes: Vec<(Vec2, f32, Collider)> = plan
        .shapes
        .iter()
        .map(|shape| {
            let collider = match shape.geometry {
                Geometry::Box { width, height } => Collider::cuboid(width / 2.0, height / 2.0),
                Geometry::Circle { radius } => Collider::ball(radius),
            };
            (shape.offset, shape.angle, collider)
        })
        .collect();
    Collider::compound(shapes)
}

fn spawn_body(
    commands: &mut Commands,
    root: Entity,
    plan: &BodyPlan,
    materials: &SurfaceMaterials,
) -> Entity {
    let response = materials.response(plan.material);
    let mut body = commands.spawn((
        RiderPart {
            rider: root,
            role: plan.role,
        },
        Name::new(plan.role.to_string()),
        plan.material,
        RigidBody::Dynamic,
        collider_for(plan),
        ColliderMassProperties::Mass(plan.mass),
        plan.material.collision_groups(),
        response.friction,
        response.restitution,
        Velocity::zero(),
        ExternalForce::default(),
        Sleeping::disabled(),
        Transform::from_translation(plan.position.extend(0.0))
            .with_rotation(Quat::from_rotation_z(plan.angle)),
    ));
    if TrackedPart::from_role(plan.role).is_some() {
        body.insert(ActiveEvents::COLLISION_EVENTS);
    }
    body.id()
}

fn spawn_joint(
    commands: &mut Commands,
    bodies: &HashMap<BodyRole, Entity>,
    plan: &JointPlan,
    config: &RiderConfig,
) -> RiderResult<Entity> {
    let lookup = |role: BodyRole| {
        bodies
            .get(&role)
            .copied()
            .ok_or_else(|| RiderError::MissingBody {
                joint: plan.role.to_string(),
                body: role.to_string(),
            })
    };
    let body_a = lookup(plan.body_a)?;
    let body_b = lookup(plan.body_b)?;

    let entity = match plan.kind {
        JointKind::Revolute {
            pivot_a,
            pivot_b,
            limits,
            motor,
        } => {
            let mut builder = RevoluteJointBuilder::new()
                .local_anchor1(pivot_a)
                .local_anchor2(pivot_b);
            if limits.is_limited() {
                // Rapier has no one-sided limit; a missing edge opens to a half turn.
                builder = builder.limits([limits.lower.unwrap_or(-PI), limits.upper.unwrap_or(PI)]);
            }
            if let Some(speed) = motor {
                builder = builder.motor_velocity(
                    WheelMotor { speed }.joint_velocity(),
                    config.wheel_motor_factor,
                );
            }
            let mut joint = commands.spawn((
                plan.role,
                Name::new(plan.role.to_string()),
                ImpulseJoint::new(body_a, builder.build()),
                ChildOf(body_b),
                Transform::default(),
            ));
            if let Some(speed) = motor {
                joint.insert(WheelMotor { speed });
            }
            joint.id()
        }
        JointKind::Lock { offset_b } => {
            let builder = FixedJointBuilder::new()
                .local_anchor1(offset_b)
                .local_anchor2(Vec2::ZERO);
            commands
                .spawn((
                    plan.role,
                    Name::new(plan.role.to_string()),
                    ImpulseJoint::new(body_a, builder.build()),
                    ChildOf(body_b),
                    Transform::default(),
                ))
                .id()
        }
    };
    Ok(entity)
}

fn assemble_skeleton(
    bodies: &HashMap<BodyRole, Entity>,
    joints: Vec<(JointRole, Entity)>,
) -> RiderResult<Skeleton> {
    let body = |role: BodyRole| {
        bodies
            .get(&role)
            .copied()
            .ok_or_else(|| RiderError::MissingBody {
                joint: "skeleton".to_string(),
                body: role.to_string(),
            })
    };
    let limb = |top: BodyRole, bottom: BodyRole| -> RiderResult<LimbBodies> {
        Ok(LimbBodies {
            top: body(top)?,
            bottom: body(bottom)?,
        })
    };
    let wheel_motor = joints
        .iter()
        .find(|(role, _)| *role == JointRole::ShaftWheel)
        .map(|(_, e)| *e)
        .ok_or_else(|| RiderError::MissingJoint {
            joint: JointRole::ShaftWheel.to_string(),
        })?;

    Ok(Skeleton {
        wheel: body(BodyRole::Wheel)?,
        shaft: body(BodyRole::Shaft)?,
        torso: body(BodyRole::Torso)?,
        head: body(BodyRole::Head)?,
        hat: body(BodyRole::Hat)?,
        legs: [
            limb(BodyRole::LegTop(Side::Front), BodyRole::LegBottom(Side::Front))?,
            limb(BodyRole::LegTop(Side::Back), BodyRole::LegBottom(Side::Back))?,
        ],
        arms: [
            limb(BodyRole::ArmTop(Side::Front), BodyRole::ArmBottom(Side::Front))?,
            limb(BodyRole::ArmTop(Side::Back), BodyRole::ArmBottom(Side::Back))?,
        ],
        wheel_motor,
        joints,
    })
}

//! Balance controller: the per-frame control law and the systems around it.
//!
//! ## Control law
//!
//! Once per frame, after the world has advanced, [`balance_step`] turns the
//! shaft tilt, contact state and directional intent into a [`BalanceCommand`]:
//!
//! | Posture | |tilt| | Wheel grounded: action |
//! |---------|--------|------------------------|
//! | Upright | < π/32 | motor; torso lean `±0.05` while a direction is held |
//! | Wobbling | < π/8 | motor; shaft torque `∓4` while input is < 1 s old |
//! | Collapsed | (π/2, 0.75π) | shaft torque `∓30` while torso grounded and a direction is held |
//! | Falling | anything else | motor only |
//!
//! The sign of every corrective torque opposes the tilt.  An airborne wheel
//! leaves motor speed and forces untouched for the frame.
//!
//! ## Force lifetime
//!
//! Commands are written into `ExternalForce` and `WheelMotor`.  The next
//! physics tick consumes them; [`release_consumed_forces_system`] zeroes
//! every rider force after each tick so a push lasts exactly one internal step.

use crate::config::{load_rider_config, RiderConfig};
use crate::contact::{contact_tracking_system, ContactState};
use crate::history::PositionHistory;
use crate::rider::{Direction, Rider, RiderControl, RiderPart, Skeleton, WheelMotor};
use crate::step_loop::{advance_world_system, simulation_active, FrameAdvance, PhysicsTick};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use bevy::time::Real;
use std::f32::consts::{PI, TAU};

// ── Angle and posture ─────────────────────────────────────────────────────────

/// Reduce any angle into `(-π, π]`.
pub fn normalize_angle(raw: f32) -> f32 {
    let a = raw % TAU;
    if a <= -PI {
        a + TAU
    } else if a > PI {
        a - TAU
    } else {
        a
    }
}

/// Tilt zone of the shaft.  Every band edge is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Posture {
    #[default]
    Upright,
    /// Tilted but still correctable.
    Wobbling,
    /// Lying on the ground, recoverable with a hoist.
    Collapsed,
    /// Between the correctable and collapsed bands, or nearly inverted.
    Falling,
}

impl Posture {
    /// Classify a normalized angle.
    pub fn classify(angle: f32, config: &RiderConfig) -> Self {
        let tilt = angle.abs();
        if tilt < config.max_safe_angle {
            Posture::Upright
        } else if tilt < config.max_correctable_angle {
            Posture::Wobbling
        } else if tilt > config.collapsed_angle_min && tilt < config.collapsed_angle_max {
            Posture::Collapsed
        } else {
            Posture::Falling
        }
    }

    pub fn is_collapsed(self) -> bool {
        self == Posture::Collapsed
    }
}

// ── Control law ───────────────────────────────────────────────────────────────

/// Everything the control law reads for one rider and one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceInput {
    /// Raw shaft angle (radians, any range).
    pub shaft_angle: f32,
    pub direction: Direction,
    pub contacts: ContactState,
    /// Milliseconds since a direction was last held; infinite if never.
    pub time_since_active_ms: f64,
    pub motor_speed: f32,
    /// Frame delta relative to a 60 Hz frame.
    pub time_multiplier: f32,
}

/// What the control law wants written back this frame.  `None` means leave
/// the current value alone.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BalanceCommand {
    pub angle: f32,
    pub posture: Posture,
    pub motor_speed: Option<f32>,
    /// Force on the torso, applied at its centre of mass.
    pub torso_force: Option<Vec2>,
    /// Torque on the shaft.
    pub shaft_torque: Option<f32>,
}

/// Next motor target: ramp toward the held direction, snap to 0 when released.
pub fn next_motor_speed(current: f32, direction: Direction, increment: f32, maximum: f32) -> f32 {
    match direction {
        Direction::None => 0.0,
        held => (current + increment * held.sign()).clamp(-maximum, maximum),
    }
}

/// The control law.  Pure: reads the input, returns the writes.
pub fn balance_step(input: &BalanceInput, config: &RiderConfig) -> BalanceCommand {
    let angle = normalize_angle(input.shaft_angle);
    let posture = Posture::classify(angle, config);
    let mut command = BalanceCommand {
        angle,
        posture,
        ..Default::default()
    };

    if !input.contacts.wheel_on_terrain() {
        return command;
    }

    let direction = input.direction;
    if !posture.is_collapsed() {
        let increment = config.speed_increment_factor * input.time_multiplier;
        command.motor_speed = Some(next_motor_speed(
            input.motor_speed,
            direction,
            increment,
            config.maximum_speed,
        ));
    }

    let against_tilt = if angle > 0.0 { -1.0 } else { 1.0 };
    match posture {
        Posture::Upright => {
            if direction.is_active() {
                command.torso_force = Some(Vec2::new(config.torso_push_force_x * direction.sign(), 0.0));
            }
        }
        Posture::Collapsed => {
            if input.contacts.torso_on_terrain() && direction.is_active() {
                command.shaft_torque = Some(config.hoist_angular_force * against_tilt);
            }
        }
        Posture::Wobbling => {
            if input.time_since_active_ms < f64::from(config.activity_window_ms) {
                command.shaft_torque = Some(config.correction_angular_force * against_tilt);
            }
        }
        Posture::Falling => {}
    }

    command
}

// ── Components ────────────────────────────────────────────────────────────────

/// Last control-law outcome for one rider, for telemetry and inspection.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct BalanceReport {
    pub posture: Posture,
    pub angle: f32,
    pub motor_speed: f32,
}

// ── Systems ───────────────────────────────────────────────────────────────────

fn shaft_angle(transform: &Transform) -> f32 {
    transform.rotation.to_euler(EulerRot::ZYX).0
}

/// Run the control law for every rider once per frame, after the advance.
#[allow(clippy::type_complexity)]
pub fn balance_control_system(
    frame: Res<FrameAdvance>,
    time: Res<Time<Real>>,
    config: Res<RiderConfig>,
    mut riders: Query<
        (
            &Skeleton,
            &mut RiderControl,
            &ContactState,
            &mut PositionHistory,
            &mut BalanceReport,
        ),
        With<Rider>,
    >,
    bodies: Query<&Transform, With<RiderPart>>,
    mut forces: Query<&mut ExternalForce, With<RiderPart>>,
    mut motors: Query<&mut WheelMotor>,
) {
    let now_ms = time.elapsed_secs_f64() * 1000.0;

    for (skeleton, mut control, contacts, mut history, mut report) in riders.iter_mut() {
        let Ok(shaft) = bodies.get(skeleton.shaft) else {
            continue;
        };
        let time_since_active_ms = control.observe(now_ms);
        let motor_speed = motors
            .get(skeleton.wheel_motor)
            .map(|m| m.speed)
            .unwrap_or_default();

        let command = balance_step(
            &BalanceInput {
                shaft_angle: shaft_angle(shaft),
                direction: control.direction(),
                contacts: *contacts,
                time_since_active_ms,
                motor_speed,
                time_multiplier: frame.time_multiplier,
            },
            &config,
        );

        if let Some(speed) = command.motor_speed {
            if let Ok(mut motor) = motors.get_mut(skeleton.wheel_motor) {
                motor.speed = speed;
            }
        }
        if let Some(force) = command.torso_force {
            if let Ok(mut external) = forces.get_mut(skeleton.torso) {
                external.force = force;
                external.torque = 0.0;
            }
        }
        if let Some(torque) = command.shaft_torque {
            if let Ok(mut external) = forces.get_mut(skeleton.shaft) {
                external.torque = torque;
            }
        }

        *report = BalanceReport {
            posture: command.posture,
            angle: command.angle,
            motor_speed: command.motor_speed.unwrap_or(motor_speed),
        };

        if let Ok(wheel) = bodies.get(skeleton.wheel) {
            history.push(wheel.translation.truncate());
        }
    }
}

/// Mirror each `WheelMotor` into its revolute joint before Rapier reads joints.
pub fn sync_wheel_motor_system(
    config: Res<RiderConfig>,
    mut motors: Query<(&WheelMotor, &mut ImpulseJoint), Changed<WheelMotor>>,
) {
    for (motor, mut joint) in motors.iter_mut() {
        if let TypedJoint::RevoluteJoint(revolute) = &mut joint.data {
            revolute.set_motor_velocity(motor.joint_velocity(), config.wheel_motor_factor);
        }
    }
}

/// Zero rider forces once a physics tick has consumed them.
pub fn release_consumed_forces_system(mut forces: Query<&mut ExternalForce, With<RiderPart>>) {
    for mut external in forces.iter_mut() {
        if external.force != Vec2::ZERO || external.torque != 0.0 {
            *external = ExternalForce::default();
        }
    }
}

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Config, contact tracking, motor sync and the balance controller.
///
/// Expects [`crate::step_loop::StepLoopPlugin`] to drive `PhysicsTick`.
pub struct RiderPlugin;

impl Plugin for RiderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RiderConfig>()
            .init_resource::<FrameAdvance>()
            .add_message::<CollisionEvent>()
            .add_systems(Startup, load_rider_config)
            .add_systems(
                PhysicsTick,
                (
                    sync_wheel_motor_system.before(PhysicsSet::SyncBackend),
                    (contact_tracking_system, release_consumed_forces_system)
                        .after(PhysicsSet::Writeback),
                ),
            )
            .add_systems(
                Update,
                balance_control_system
                    .after(advance_world_system)
                    .run_if(simulation_active),
            );
    }
}

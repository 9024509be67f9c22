//! Rider physics with Rapier in the loop.
//!
//! These tests add the real `RapierPhysicsPlugin` to `PhysicsTick`, driven by
//! the step loop at 60 Hz, with the rider's wheel resting on a wide platform.
//!
//! Covered scenarios:
//! 1. An idle rider stays on the platform without being thrown.
//! 2. Holding Right rides toward +x, holding Left toward −x.
//! 3. The wheel turns at the commanded motor speed, clockwise for forward.

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy::transform::TransformPlugin;
use bevy_rapier2d::prelude::*;
use std::time::Duration;

use unicyclist::balance::RiderPlugin;
use unicyclist::config::RiderConfig;
use unicyclist::contact::ContactState;
use unicyclist::rider::blueprint::WHEEL_RADIUS;
use unicyclist::rider::{spawn_rider, Direction, RiderControl, Skeleton, WheelMotor};
use unicyclist::step_loop::{PhysicsTick, StepLoopPlugin};
use unicyclist::surface::{terrain_platform, SurfaceMaterials, PLATFORM_HEIGHT};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Platform top sits at y = 0.
const PLATFORM_WIDTH: f32 = 18.0;

fn physics_app() -> App {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        TransformPlugin,
        RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0).in_schedule(PhysicsTick),
        StepLoopPlugin,
        RiderPlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / 60.0,
    )));
    // Startup, Rapier context, step clock baseline
    app.update();
    app
}

/// Spawn the platform and a rider whose wheel rests on it at x = 0.
fn spawn_course(app: &mut App, with_platform: bool) -> Entity {
    app.world_mut()
        .run_system_once(move |mut commands: Commands| {
            let materials = SurfaceMaterials::default();
            if with_platform {
                commands.spawn(terrain_platform(
                    Vec2::new(0.0, -PLATFORM_HEIGHT / 2.0),
                    PLATFORM_WIDTH,
                    &materials,
                ));
            }
            spawn_rider(
                &mut commands,
                Vec2::new(0.0, WHEEL_RADIUS),
                &RiderConfig::default(),
                &materials,
            )
        })
        .expect("system runs")
        .expect("rider spawns")
}

fn skeleton(app: &App, rider: Entity) -> Skeleton {
    app.world().get::<Skeleton>(rider).unwrap().clone()
}

fn wheel_position(app: &App, rider: Entity) -> Vec2 {
    let wheel = skeleton(app, rider).wheel;
    app.world()
        .get::<Transform>(wheel)
        .unwrap()
        .translation
        .truncate()
}

fn wheel_grounded(app: &App, rider: Entity) -> bool {
    app.world()
        .get::<ContactState>(rider)
        .unwrap()
        .wheel_on_terrain()
}

fn steer(app: &mut App, rider: Entity, direction: Direction) {
    app.world_mut()
        .get_mut::<RiderControl>(rider)
        .unwrap()
        .set_direction(direction);
}

/// Hold `direction` for `frames` frames and return how far the wheel moved.
fn ride(direction: Direction, frames: usize) -> f32 {
    let mut app = physics_app();
    let rider = spawn_course(&mut app, true);
    let start = wheel_position(&app, rider);
    steer(&mut app, rider, direction);
    for _ in 0..frames {
        app.update();
    }
    wheel_position(&app, rider).x - start.x
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn idle_rider_stays_on_platform() {
    let mut app = physics_app();
    let rider = spawn_course(&mut app, true);

    let mut grounded_frames = 0;
    let mut highest = f32::MIN;
    for _ in 0..120 {
        app.update();
        if wheel_grounded(&app, rider) {
            grounded_frames += 1;
        }
        highest = highest.max(wheel_position(&app, rider).y);
    }

    let wheel = wheel_position(&app, rider);
    assert!(
        grounded_frames >= 110,
        "wheel grounded for only {grounded_frames} of 120 frames"
    );
    assert!(
        highest < WHEEL_RADIUS + 0.05,
        "wheel lifted to {highest}, rest height is {WHEEL_RADIUS}"
    );
    assert!(wheel.x.abs() < 1.5, "idle wheel drifted to x = {}", wheel.x);
}

#[test]
fn holding_right_rides_forward() {
    let moved = ride(Direction::Right, 150);
    assert!(moved > 0.3, "wheel moved {moved} holding Right");
}

#[test]
fn holding_left_rides_backward() {
    let moved = ride(Direction::Left, 150);
    assert!(moved < -0.3, "wheel moved {moved} holding Left");
}

#[test]
fn wheel_tracks_commanded_motor_speed() {
    let mut app = physics_app();
    let world = app.world_mut();
    let mut contexts = world.query::<&mut RapierConfiguration>();
    for mut config in contexts.iter_mut(world) {
        config.gravity = Vec2::ZERO;
    }
    // Floating free, so the controller never touches the motor
    let rider = spawn_course(&mut app, false);
    let sk = skeleton(&app, rider);
    app.world_mut()
        .get_mut::<WheelMotor>(sk.wheel_motor)
        .unwrap()
        .speed = 4.0;

    for _ in 0..60 {
        app.update();
    }

    let spin = |body| app.world().get::<Velocity>(body).unwrap().angvel;
    let relative = spin(sk.wheel) - spin(sk.shaft);
    // Forward pedalling turns the wheel clockwise relative to the shaft
    assert!(
        (relative + 4.0).abs() < 0.4,
        "wheel turns at {relative} rad/s relative to the shaft, wanted -4"
    );
}

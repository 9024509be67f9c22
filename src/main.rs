use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::transform::TransformPlugin;
use bevy_rapier2d::prelude::*;
use std::env;
use std::time::Duration;

use unicyclist::balance::{balance_control_system, BalanceReport, RiderPlugin};
use unicyclist::config::{load_rider_config, RiderConfig};
use unicyclist::contact::ContactState;
use unicyclist::history::PositionHistory;
use unicyclist::rider::blueprint::WHEEL_RADIUS;
use unicyclist::rider::spawn_rider;
use unicyclist::script::{ride_script_system, RideScript, DEFAULT_SCRIPT};
use unicyclist::step_loop::{advance_world_system, FrameAdvance, PhysicsTick, StepLoopPlugin};
use unicyclist::surface::{terrain_platform, SurfaceMaterials, PLATFORM_HEIGHT};

/// Frames between telemetry lines.
const TELEMETRY_INTERVAL: u64 = 30;

/// Starting platform and rider position of the first course section.
const PLATFORM_CENTER: Vec2 = Vec2::new(7.0, 15.0);
const PLATFORM_WIDTH: f32 = 18.0;
/// Wheel resting on the platform top, touching but not sunk in.
const RIDER_SPAWN: Vec2 = Vec2::new(
    0.0,
    PLATFORM_CENTER.y + PLATFORM_HEIGHT / 2.0 + WHEEL_RADIUS,
);

/// Configure Rapier physics: the rider's world has Earth-like gravity.
fn setup_physics_config(config: Res<RiderConfig>, mut rapier: Query<&mut RapierConfiguration>) {
    for mut cfg in rapier.iter_mut() {
        cfg.gravity = Vec2::new(0.0, config.gravity_y);
    }
}

fn spawn_ride(mut commands: Commands, config: Res<RiderConfig>, mut exit: MessageWriter<AppExit>) {
    let materials = SurfaceMaterials::from_config(&config);
    commands.spawn(terrain_platform(PLATFORM_CENTER, PLATFORM_WIDTH, &materials));

    match spawn_rider(&mut commands, RIDER_SPAWN, &config, &materials) {
        Ok(_) => println!("✓ Rider spawned on a {PLATFORM_WIDTH} m platform"),
        Err(e) => {
            error!("could not build rider: {e}");
            exit.write(AppExit::error());
        }
    }
}

fn telemetry_system(
    frame: Res<FrameAdvance>,
    riders: Query<(Entity, &BalanceReport, &ContactState, &PositionHistory)>,
) {
    if frame.frame == 0 || frame.frame % TELEMETRY_INTERVAL != 0 {
        return;
    }
    for (entity, report, contacts, history) in riders.iter() {
        let wheel = history.latest();
        info!(
            "[frame {}] rider {entity}: {:?} tilt {:+.1}° motor {:+.2} rad/s | wheel {} torso {} | at ({:.2}, {:.2}) trail ({:.2}, {:.2})",
            frame.frame,
            report.posture,
            report.angle.to_degrees(),
            report.motor_speed,
            contacts.wheel_contacts,
            contacts.torso_contacts,
            wheel.x,
            wheel.y,
            history.trailing_target().x,
            history.trailing_target().y,
        );
    }
}

fn main() {
    let source = env::var("RIDER_SCRIPT").unwrap_or_else(|_| DEFAULT_SCRIPT.to_string());
    let script = match RideScript::parse(&source) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("{e}; falling back to the default ride");
            RideScript::parse(DEFAULT_SCRIPT).unwrap_or_default()
        }
    };
    println!(
        "Riding {} segments over {:.1}s",
        script.segments().len(),
        script.total_seconds()
    );

    let mut app = App::new();

    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / 60.0,
        ))),
        TransformPlugin,
        LogPlugin::default(),
    ))
    // pixels_per_meter(1.0): world units are metres, matching every mass and
    // force constant in constants.rs.  Rapier steps only inside PhysicsTick.
    .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0).in_schedule(PhysicsTick))
    .add_plugins((StepLoopPlugin, RiderPlugin))
    .insert_resource(script)
    .add_systems(
        Startup,
        (
            setup_physics_config.after(load_rider_config),
            spawn_ride.after(load_rider_config),
        ),
    )
    .add_systems(
        Update,
        (
            ride_script_system.before(advance_world_system),
            telemetry_system.after(balance_control_system),
        ),
    );

    app.run();
}

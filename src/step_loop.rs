//! World step loop: clamped real-time delta → fixed internal physics steps.
//!
//! Rapier is added to the dedicated [`PhysicsTick`] schedule with
//! `TimestepMode::Fixed`, so one run of that schedule is exactly one internal
//! step of [`FIXED_DT`].  Each frame, [`advance_world_system`]:
//!
//! 1. skips everything while [`SimulationActive`] is false (the clock does not
//!    observe the frame, so the first frame after resuming measures the whole
//!    pause and is clamped away);
//! 2. asks the [`StepClock`] how many internal steps the clamped delta buys;
//! 3. runs `PhysicsTick` that many times (at most [`MAX_SUBSTEPS`]; time the
//!    cap leaves unstepped stays in the accumulator for later frames);
//! 4. publishes the outcome as [`FrameAdvance`] for the balance controller.
//!
//! | Real delta | Steps | `time_multiplier` |
//! |-----------:|------:|------------------:|
//! | first frame | 0 | 0 |
//! | 20 ms | 1 (rest carried) | 1.2 |
//! | 45 ms | 2 (rest carried) | 2.7 |
//! | 400 ms | 10 (backlog carried) | 24 |
//! | > 500 ms | 0 | 0 |

use crate::constants::*;
use bevy::ecs::schedule::ScheduleLabel;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use bevy::time::Real;

/// One internal physics step.  Rapier and the contact tracker live here.
#[derive(ScheduleLabel, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhysicsTick;

/// Host-owned pause switch.  While false the step loop and the controller
/// are skipped and all state is left as it was.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationActive(pub bool);

impl Default for SimulationActive {
    fn default() -> Self {
        Self(true)
    }
}

/// Run condition for systems that only run while the simulation is active.
pub fn simulation_active(active: Option<Res<SimulationActive>>) -> bool {
    active.is_none_or(|a| a.0)
}

/// Outcome of the most recent frame advance.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameAdvance {
    /// Frame counter, incremented on every active frame.
    pub frame: u64,
    /// Real delta after clamping (ms).
    pub delta_ms: f32,
    /// Internal steps taken this frame.
    pub steps: u32,
    /// `delta_ms` relative to a 60 Hz frame.
    pub time_multiplier: f32,
}

/// Accumulator that converts real frame time into fixed internal steps.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct StepClock {
    fixed_dt: f64,
    max_substeps: u32,
    last_frame_ms: Option<f64>,
    accumulator: f64,
    frames: u64,
}

impl Default for StepClock {
    fn default() -> Self {
        Self::new(FIXED_DT, MAX_SUBSTEPS)
    }
}

impl StepClock {
    pub fn new(fixed_dt: f32, max_substeps: u32) -> Self {
        Self {
            fixed_dt: f64::from(fixed_dt),
            max_substeps,
            last_frame_ms: None,
            accumulator: 0.0,
            frames: 0,
        }
    }

    /// Real delta for a frame observed at `now_ms`, with the long-pause clamp
    /// applied.  The first observed frame is a baseline with delta 0.
    fn clamped_delta(&mut self, now_ms: f64) -> f64 {
        let delta = now_ms - self.last_frame_ms.unwrap_or(now_ms);
        self.last_frame_ms = Some(now_ms);
        if delta > f64::from(MAX_FRAME_DELTA_MS) || delta < 0.0 {
            0.0
        } else {
            delta
        }
    }

    /// Observe a frame and return how far the world should advance.
    pub fn advance(&mut self, now_ms: f64) -> FrameAdvance {
        let delta_ms = self.clamped_delta(now_ms);
        self.accumulator += delta_ms / 1000.0;

        let mut steps = 0;
        while self.accumulator >= self.fixed_dt && steps < self.max_substeps {
            self.accumulator -= self.fixed_dt;
            steps += 1;
        }

        self.frames += 1;
        FrameAdvance {
            frame: self.frames,
            delta_ms: delta_ms as f32,
            steps,
            time_multiplier: (delta_ms / f64::from(BASELINE_FRAME_MS)) as f32,
        }
    }

    /// Time carried into the next frame (seconds).
    pub fn carried(&self) -> f64 {
        self.accumulator
    }
}

/// Exclusive system: advance the physics world for this frame.
pub fn advance_world_system(world: &mut World) {
    if !world
        .get_resource::<SimulationActive>()
        .is_none_or(|a| a.0)
    {
        return;
    }

    let now_ms = world.resource::<Time<Real>>().elapsed_secs_f64() * 1000.0;
    let advance = world.resource_mut::<StepClock>().advance(now_ms);

    for _ in 0..advance.steps {
        if let Err(e) = world.try_run_schedule(PhysicsTick) {
            warn!("physics tick skipped: {e}");
            break;
        }
    }
    world.insert_resource(advance);
}

/// Adds the `PhysicsTick` schedule, the step clock and the frame driver.
///
/// Rapier must be added separately with
/// `RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0).in_schedule(PhysicsTick)`.
pub struct StepLoopPlugin;

impl Plugin for StepLoopPlugin {
    fn build(&self, app: &mut App) {
        app.init_schedule(PhysicsTick)
            .init_resource::<SimulationActive>()
            .init_resource::<StepClock>()
            .init_resource::<FrameAdvance>()
            .add_systems(Update, advance_world_system);
    }

    fn finish(&self, app: &mut App) {
        // After every plugin has built, so Rapier's default mode cannot win.
        app.insert_resource(TimestepMode::Fixed {
            dt: FIXED_DT,
            substeps: 1,
        });
    }
}

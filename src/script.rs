//! Scripted directional intent for headless rides.
//!
//! A ride script is a comma-separated list of `direction:seconds` segments,
//! e.g. `right:2.5,none:1,left:3`.  [`ride_script_system`] plays it back by
//! calling `RiderControl::set_direction` on every rider, the same single
//! setter a keyboard or network input layer would use.  When the script runs
//! out the app exits.

use crate::error::{RiderError, RiderResult};
use crate::rider::{Direction, RiderControl};
use bevy::prelude::*;

/// Script used when `RIDER_SCRIPT` is unset.
pub const DEFAULT_SCRIPT: &str = "none:1,right:3,none:1.5,left:2,none:1";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptSegment {
    pub direction: Direction,
    pub seconds: f32,
}

/// Parsed ride script plus playback position.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct RideScript {
    segments: Vec<ScriptSegment>,
    /// Index of the segment last applied, for change logging.
    current: Option<usize>,
}

fn parse_direction(word: &str) -> Option<Direction> {
    match word.trim().to_ascii_lowercase().as_str() {
        "left" | "l" => Some(Direction::Left),
        "right" | "r" => Some(Direction::Right),
        "none" | "idle" | "-" => Some(Direction::None),
        _ => None,
    }
}

impl RideScript {
    pub fn parse(source: &str) -> RiderResult<Self> {
        let mut segments = Vec::new();
        for raw in source.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let bad = |reason| RiderError::Script {
                segment: raw.to_string(),
                reason,
            };
            let (word, secs) = raw.split_once(':').ok_or_else(|| bad("expected direction:seconds"))?;
            let direction = parse_direction(word).ok_or_else(|| bad("unknown direction"))?;
            let seconds: f32 = secs.trim().parse().map_err(|_| bad("duration is not a number"))?;
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(bad("duration must be non-negative"));
            }
            segments.push(ScriptSegment { direction, seconds });
        }
        if segments.is_empty() {
            return Err(RiderError::Script {
                segment: source.to_string(),
                reason: "script is empty",
            });
        }
        Ok(Self {
            segments,
            current: None,
        })
    }

    pub fn segments(&self) -> &[ScriptSegment] {
        &self.segments
    }

    pub fn total_seconds(&self) -> f32 {
        self.segments.iter().map(|s| s.seconds).sum()
    }

    /// Segment index active `elapsed` seconds in, or `None` once finished.
    fn index_at(&self, elapsed: f32) -> Option<usize> {
        let mut end = 0.0;
        for (i, segment) in self.segments.iter().enumerate() {
            end += segment.seconds;
            if elapsed < end {
                return Some(i);
            }
        }
        None
    }

    /// Direction held `elapsed` seconds in, or `None` once finished.
    pub fn direction_at(&self, elapsed: f32) -> Option<Direction> {
        self.index_at(elapsed).map(|i| self.segments[i].direction)
    }
}

impl Default for RideScript {
    fn default() -> Self {
        Self {
            segments: vec![ScriptSegment {
                direction: Direction::None,
                seconds: 1.0,
            }],
            current: None,
        }
    }
}

/// Feed the script's direction to every rider; exit when it runs out.
pub fn ride_script_system(
    time: Res<Time>,
    mut script: ResMut<RideScript>,
    mut riders: Query<&mut RiderControl>,
    mut exit: MessageWriter<AppExit>,
) {
    let elapsed = time.elapsed_secs();
    let Some(index) = script.index_at(elapsed) else {
        info!("Ride script finished after {:.1}s", elapsed);
        exit.write(AppExit::Success);
        return;
    };

    let direction = script.segments[index].direction;
    if script.current != Some(index) {
        script.current = Some(index);
        info!("Script segment {index}: {direction:?} for {:.1}s", script.segments[index].seconds);
    }
    for mut control in riders.iter_mut() {
        control.set_direction(direction);
    }
}

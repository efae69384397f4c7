use std::{fmt, str::FromStr};

use crate::{config::Param, PintographError, Result};

/// Upper bound on ticks run for a single frame, so a stalled display does not
/// trigger an unbounded catch-up burst.
pub const MAX_TICKS_PER_FRAME: u32 = 8;

/// Converts the physics tick rate and the display refresh rate into the number
/// of physics ticks due before each rendered frame.
#[derive(Debug, Clone)]
pub struct Cadence {
    physics_hz: f64,
    display_hz: f64,
    accumulator: f64,
    frames: u64,
    ticks: u64,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            physics_hz: 60.0,
            display_hz: 60.0,
            accumulator: 0.0,
            frames: 0,
            ticks: 0,
        }
    }
}

impl Cadence {
    pub fn new(physics_hz: f64, display_hz: f64) -> Result<Self> {
        for (name, rate) in [("physics rate", physics_hz), ("display rate", display_hz)] {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(PintographError::msg(format!(
                    "{name} must be a positive number of hertz, got {rate}"
                )));
            }
        }
        Ok(Self {
            physics_hz,
            display_hz,
            ..Self::default()
        })
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advances by one display frame and returns the ticks due before it.
    pub fn ticks_for_next_frame(&mut self) -> u32 {
        self.accumulator += self.physics_hz / self.display_hz;
        let due = self.accumulator.floor();
        self.accumulator -= due;

        let due = (due as u32).min(MAX_TICKS_PER_FRAME);
        self.frames += 1;
        self.ticks += u64::from(due);
        due
    }
}

/// A slider move to replay at the start of a given frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledTweak {
    pub frame: u64,
    pub param: Param,
    pub value: f32,
}

impl ScheduledTweak {
    pub fn new(frame: u64, param: Param, value: f32) -> Self {
        Self {
            frame,
            param,
            value,
        }
    }
}

impl fmt::Display for ScheduledTweak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}={}", self.frame, self.param, self.value)
    }
}

/// Parses `frame:name=value`.
impl FromStr for ScheduledTweak {
    type Err = PintographError;

    fn from_str(s: &str) -> Result<Self> {
        let (frame, assignment) = s.split_once(':').ok_or_else(|| {
            PintographError::msg(format!("expected `frame:name=value`, got `{s}`"))
        })?;
        let frame = frame
            .trim()
            .parse()
            .map_err(|_| PintographError::msg(format!("invalid frame number in `{s}`")))?;
        let (param, value) = parse_assignment(assignment)?;
        Ok(Self::new(frame, param, value))
    }
}

/// Parses `name=value`.
pub fn parse_assignment(s: &str) -> Result<(Param, f32)> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| PintographError::msg(format!("expected `name=value`, got `{s}`")))?;
    let param = name.trim().parse()?;
    let value = value
        .trim()
        .parse()
        .map_err(|_| PintographError::msg(format!("invalid number in `{s}`")))?;
    Ok((param, value))
}

/// Tweaks ordered by frame, handed out as their frame comes due.
#[derive(Debug, Default)]
pub struct TweakScheduler {
    events: Vec<ScheduledTweak>,
    next_event: usize,
}

impl TweakScheduler {
    pub fn new(mut events: Vec<ScheduledTweak>) -> Self {
        // Stable, so tweaks for the same frame keep their command line order.
        events.sort_by_key(|event| event.frame);
        Self {
            events,
            next_event: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.events.len() - self.next_event
    }

    /// Every tweak scheduled at or before `frame` that has not been handed out.
    pub fn due(&mut self, frame: u64) -> &[ScheduledTweak] {
        let start = self.next_event;
        while let Some(event) = self.events.get(self.next_event) {
            if event.frame > frame {
                break;
            }
            self.next_event += 1;
        }
        &self.events[start..self.next_event]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_rates_tick_once_per_frame() {
        let mut cadence = Cadence::default();
        for _ in 0..10 {
            assert_eq!(cadence.ticks_for_next_frame(), 1);
        }
        assert_eq!(cadence.frames(), 10);
        assert_eq!(cadence.ticks(), 10);
    }

    #[test]
    fn fast_display_skips_ticks_on_some_frames() {
        let mut cadence = Cadence::new(60.0, 120.0).unwrap();
        let ticks: Vec<u32> = (0..12).map(|_| cadence.ticks_for_next_frame()).collect();

        assert_eq!(ticks, [0, 1].repeat(6));
        assert_eq!(cadence.ticks(), 6);
    }

    #[test]
    fn slow_display_runs_several_ticks_per_frame() {
        let mut cadence = Cadence::new(120.0, 30.0).unwrap();
        assert_eq!(cadence.ticks_for_next_frame(), 4);

        let mut stalled = Cadence::new(1_000.0, 1.0).unwrap();
        assert_eq!(stalled.ticks_for_next_frame(), MAX_TICKS_PER_FRAME);
    }

    #[test]
    fn rejects_non_positive_rates() {
        assert!(Cadence::new(0.0, 60.0).is_err());
        assert!(Cadence::new(60.0, f64::NAN).is_err());
    }

    #[test]
    fn parses_tweaks() {
        let tweak: ScheduledTweak = "120:trail_length=20".parse().unwrap();
        assert_eq!(tweak, ScheduledTweak::new(120, Param::TrailLength, 20.0));
        assert_eq!(tweak.to_string(), "120:trail_length=20");

        assert!("trail_length=20".parse::<ScheduledTweak>().is_err());
        assert!("x:trail_length=20".parse::<ScheduledTweak>().is_err());
        assert!("5:bogus=1".parse::<ScheduledTweak>().is_err());
    }

    #[test]
    fn hands_out_tweaks_once_in_frame_order() {
        let mut scheduler = TweakScheduler::new(vec![
            ScheduledTweak::new(10, Param::SpeedL, 0.5),
            ScheduledTweak::new(2, Param::SpeedR, 0.2),
            ScheduledTweak::new(10, Param::SpeedR, 0.3),
        ]);

        assert!(scheduler.due(1).is_empty());
        assert_eq!(scheduler.due(5), &[ScheduledTweak::new(2, Param::SpeedR, 0.2)]);
        assert!(scheduler.due(5).is_empty());
        let due = scheduler.due(10).to_vec();
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].param, Param::SpeedL);
        assert_eq!(scheduler.remaining(), 0);
    }
}

//! Simulation clock and tick cadence.
//!
//! Every effect takes the current timestamp as an `f32` number of seconds.
//! [`Time`] produces those timestamps, either from the wall clock or from
//! manual steps for deterministic hosts.
//!
//! # Example
//!
//! ```ignore
//! use particle_interactions::time::Time;
//!
//! let mut time = Time::new();
//!
//! // In your frame callback:
//! time.update();
//! let frame = interactions.frame(&mut particles, &pointer, time.now());
//! ```

use std::time::Instant;

/// Simulation clock.
///
/// `now()` only moves forward, and only while running: pauses and time
/// scaling are applied before a step is added, so the effects see one
/// continuous timeline regardless of how the host drives the clock.
#[derive(Debug)]
pub struct Time {
    /// Wall-clock reading at the previous step.
    wall: Instant,
    now: f32,
    step: f32,
    steps: u64,
    running: bool,
    /// Overrides the wall-clock step when set.
    fixed_step: Option<f32>,
    scale: f32,
}

impl Time {
    pub fn new() -> Self {
        Self {
            wall: Instant::now(),
            now: 0.0,
            step: 0.0,
            steps: 0,
            running: true,
            fixed_step: None,
            scale: 1.0,
        }
    }

    /// Step by the wall-clock time since the previous step. Call once per
    /// frame. Returns `(now, delta)`.
    pub fn update(&mut self) -> (f32, f32) {
        let wall = Instant::now();
        let raw = wall.saturating_duration_since(self.wall).as_secs_f32();
        self.wall = wall;
        self.step_by(raw)
    }

    /// Step by `seconds` instead of reading the wall clock.
    /// Returns `(now, delta)`.
    pub fn advance(&mut self, seconds: f32) -> (f32, f32) {
        self.wall = Instant::now();
        self.step_by(seconds.max(0.0))
    }

    fn step_by(&mut self, raw: f32) -> (f32, f32) {
        self.step = match (self.running, self.fixed_step) {
            (false, _) => 0.0,
            (true, Some(fixed)) => fixed * self.scale,
            (true, None) => raw * self.scale,
        };
        if self.running {
            self.now += self.step;
            self.steps += 1;
        }
        (self.now, self.step)
    }

    /// The timestamp to hand to the effects this frame.
    #[inline]
    pub fn now(&self) -> f32 {
        self.now
    }

    /// Seconds added by the last step.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.step
    }

    /// Number of steps taken while running.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.steps
    }

    pub fn is_paused(&self) -> bool {
        !self.running
    }

    pub fn time_scale(&self) -> f32 {
        self.scale
    }

    /// Freeze `now()`. Steps taken while paused add nothing.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Continue after [`pause`](Self::pause); wall time spent paused is skipped.
    pub fn resume(&mut self) {
        if !self.running {
            self.wall = Instant::now();
            self.running = true;
        }
    }

    /// Step by a constant amount on every [`update`](Self::update), or
    /// `None` for wall-clock steps.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_step = delta.map(|d| d.max(0.0));
    }

    /// Speed multiplier for every step; negative values clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.scale = scale.max(0.0);
    }

    /// Back to `now() == 0`, keeping the fixed step and scale.
    pub fn reset(&mut self) {
        let (fixed_step, scale) = (self.fixed_step, self.scale);
        *self = Self::new();
        self.fixed_step = fixed_step;
        self.scale = scale;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

/// Gate for work that runs on a slower cadence than frames.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ticker {
    /// Seconds between ticks; 0 fires on every call with a new timestamp.
    interval: f32,
    last: Option<f32>,
}

impl Ticker {
    pub fn new(interval: f32) -> Self {
        Self {
            interval: interval.max(0.0),
            last: None,
        }
    }

    pub fn set_interval(&mut self, interval: f32) {
        self.interval = interval.max(0.0);
    }

    /// Whether a tick is due at `now`; records it if so.
    pub fn ready(&mut self, now: f32) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => now > last && now - last >= self.interval,
        };
        if due {
            self.last = Some(now);
        }
        due
    }

    pub fn last(&self) -> Option<f32> {
        self.last
    }
}

//! Bubble effect: particles near the pointer change radius and opacity.
//!
//! Two modes, picked from the event configuration (hover wins over press):
//!
//! - **Hover**: the override scales with proximity to the cursor. Inside
//!   `bubble.distance` the particle grows (or shrinks) toward the target by
//!   `ratio = 1 - dist / distance`; outside it the override is dropped.
//! - **Press**: a press starts a pulse shared by the whole population. For
//!   `duration` seconds particles within range ease linearly from their
//!   current value to the target, then for another `duration` they ease
//!   back. The pulse state lives in a [`PressSession`] the caller updates once
//!   per frame before applying the effect to each particle.
//!
//! ```ignore
//! press.update(&pointer, &config.bubble, now);
//! for particle in &mut particles {
//!     bubble::apply(particle, &pointer, &press, &config);
//! }
//! ```

use crate::config::{BubbleConfig, InteractionConfig, InteractionMode};
use crate::geometry::distance;
use crate::particle::Particle;
use crate::pointer::{Pointer, PointerStatus};

/// Which pointer interaction drives the bubble this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleMode {
    Hover,
    Press,
}

impl BubbleMode {
    /// Hover if enabled for bubble, else press if enabled, else none.
    pub fn select(config: &InteractionConfig) -> Option<BubbleMode> {
        if config.events.on_hover.triggers(InteractionMode::Bubble) {
            Some(BubbleMode::Hover)
        } else if config.events.on_click.triggers(InteractionMode::Bubble) {
            Some(BubbleMode::Press)
        } else {
            None
        }
    }
}

/// Population-wide press pulse timer.
///
/// `clicking` is set when a new press is seen. After `duration` seconds the
/// pulse enters its return phase (`duration_end`); after `2 * duration` both
/// flags drop and the pulse is over.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PressSession {
    clicking: bool,
    duration_end: bool,
    time_spent: f32,
    /// Start time of the press this session is tracking.
    press_started_at: Option<f32>,
}

impl PressSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the pulse. Call once per frame, before any [`apply`].
    pub fn update(&mut self, pointer: &Pointer, config: &BubbleConfig, now: f32) {
        if let Some(start) = pointer.press_started_at() {
            if self.press_started_at != Some(start) {
                self.press_started_at = Some(start);
                self.clicking = true;
                self.duration_end = false;
            }
        }

        let start = match self.press_started_at {
            Some(start) if self.clicking => start,
            _ => {
                self.time_spent = 0.0;
                return;
            }
        };

        // A zero duration disables the pulse
        if !(config.duration > 0.0) {
            self.end();
            return;
        }

        self.time_spent = (now - start).max(0.0);
        if self.time_spent > config.duration {
            self.duration_end = true;
        }
        if self.time_spent > config.duration * 2.0 {
            self.end();
        }
    }

    fn end(&mut self) {
        self.clicking = false;
        self.duration_end = false;
    }

    /// Forget any running pulse.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_clicking(&self) -> bool {
        self.clicking
    }

    pub fn is_duration_end(&self) -> bool {
        self.duration_end
    }

    /// Seconds since the tracked press started, as of the last update.
    pub fn time_spent(&self) -> f32 {
        self.time_spent
    }
}

/// Update `particle.bubble` for this frame.
///
/// Does nothing when neither hover nor press bubble is enabled; clearing
/// overrides after a mode is switched off is up to the caller.
pub fn apply(particle: &mut Particle, pointer: &Pointer, press: &PressSession, config: &InteractionConfig) {
    match BubbleMode::select(config) {
        Some(BubbleMode::Hover) => hover(particle, pointer, &config.bubble),
        Some(BubbleMode::Press) => press_pulse(particle, pointer, press, &config.bubble),
        None => {}
    }
}

fn hover(particle: &mut Particle, pointer: &Pointer, config: &BubbleConfig) {
    if pointer.status() == PointerStatus::Leave {
        particle.bubble.clear();
        return;
    }
    let Some(cursor) = pointer.hover_position() else {
        return;
    };
    if !(config.distance > 0.0) {
        particle.bubble.clear();
        return;
    }

    let dist = distance(particle.position, cursor);
    if dist > config.distance {
        particle.bubble.clear();
        return;
    }

    let ratio = 1.0 - dist / config.distance;
    if ratio < 0.0 || pointer.status() != PointerStatus::Move {
        return;
    }

    if let Some(radius) = hover_value(particle.size, particle.base_size, config.size, ratio) {
        particle.bubble.radius = Some(radius);
    }
    if let Some(opacity) = hover_value(particle.opacity, particle.base_opacity, config.opacity, ratio) {
        particle.bubble.opacity = Some(opacity);
    }
}

/// Hover override for one property, or `None` to leave it as is.
///
/// Growth moves from `current` by `target * ratio`; shrinking moves by the
/// base-to-target gap. Candidates past the target clamp to it.
fn hover_value(current: f32, base: f32, target: f32, ratio: f32) -> Option<f32> {
    if target > base {
        let candidate = current + target * ratio;
        (candidate > current).then(|| candidate.min(target))
    } else if target < base {
        let candidate = current - (base - target) * ratio;
        (candidate < current).then(|| candidate.max(target))
    } else {
        None
    }
}

/// Press pulse: approach the bubble values for `duration`, then return to
/// rest over the next `duration`.
///
/// The return phase is `target * 2 - current - progress * (target - current)`.
/// The commonly used form subtracts `progress * (current - target)`, which
/// jumps at `progress = 1` and overshoots past rest; this one equals the
/// target at `progress = 1` and `current` at `progress = 2`.
fn press_pulse(particle: &mut Particle, pointer: &Pointer, press: &PressSession, config: &BubbleConfig) {
    if !press.is_clicking() {
        // pulse over (or never started): draw resting values
        particle.bubble.clear();
        return;
    }
    let Some(origin) = pointer.press_position() else {
        return;
    };

    let pulse = Pulse {
        in_range: distance(particle.position, origin) <= config.distance,
        returning: press.is_duration_end(),
        progress: press.time_spent() / config.duration,
    };

    pulse.drive(&mut particle.bubble.radius, particle.size, particle.base_size, config.size);
    pulse.drive(&mut particle.bubble.opacity, particle.opacity, particle.base_opacity, config.opacity);
}

/// Press pulse inputs shared by the size and opacity channels.
struct Pulse {
    in_range: bool,
    returning: bool,
    /// `time_spent / duration`, in `[0, 2]` while clicking.
    progress: f32,
}

impl Pulse {
    fn drive(&self, slot: &mut Option<f32>, current: f32, base: f32, target: f32) {
        if target == base {
            return;
        }

        if !self.returning {
            if self.in_range {
                if slot.unwrap_or(current) != target {
                    *slot = Some(current - self.progress * (current - target));
                }
            } else {
                *slot = None;
            }
        } else if slot.is_some() {
            // mirror of the approach: target at progress 1, current at 2
            *slot = Some(target * 2.0 - current - self.progress * (target - current));
        }
    }
}

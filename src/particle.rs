//! The slice of particle state this engine reads and writes.
//!
//! Particles are owned by the host's pool. Positions, sizes and colors are
//! maintained elsewhere; the effects here only own [`BubbleOverride`] and
//! [`InfectionState`].

use glam::Vec2;

use crate::color::Rgb;

/// Transient radius/opacity set by the bubble effect.
///
/// `None` means "no override, draw the particle's own value". Both fields
/// are cleared together when the pointer moves out of range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BubbleOverride {
    pub radius: Option<f32>,
    pub opacity: Option<f32>,
}

impl BubbleOverride {
    /// Drop both overrides.
    pub fn clear(&mut self) {
        self.radius = None;
        self.opacity = None;
    }

    pub fn is_empty(&self) -> bool {
        self.radius.is_none() && self.opacity.is_none()
    }
}

/// Contagion state of one particle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InfectionState {
    /// 0 is healthy, `1..=stages` are infection stages.
    pub stage: u32,
    /// When the particle went from healthy to stage 1.
    pub infected_at: Option<f32>,
    /// Nominal time of the most recent stage transition.
    pub stage_entered_at: Option<f32>,
}

impl InfectionState {
    pub fn is_infected(&self) -> bool {
        self.stage > 0
    }

    pub(crate) fn infect(&mut self, now: f32) {
        self.stage = 1;
        self.infected_at = Some(now);
        self.stage_entered_at = Some(now);
    }

    pub(crate) fn cure(&mut self) {
        *self = InfectionState::default();
    }
}

/// A live particle as seen by the interaction effects.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Current location.
    pub position: Vec2,
    /// Sub-pixel jitter added when measuring link distance.
    pub offset: Vec2,
    /// Current radius (may be animated by the host).
    pub size: f32,
    /// Configured resting radius.
    pub base_size: f32,
    /// Current opacity (may be animated by the host).
    pub opacity: f32,
    /// Configured resting opacity.
    pub base_opacity: f32,
    /// Fill color, used for "mid" link blending.
    pub color: Rgb,
    /// Per-particle link distance, overriding the configured default.
    pub link_distance: Option<f32>,
    pub bubble: BubbleOverride,
    pub infection: InfectionState,
}

impl Particle {
    /// A particle resting at `position` with the given radius and opacity.
    pub fn new(position: Vec2, size: f32, opacity: f32) -> Self {
        Self {
            position,
            offset: Vec2::ZERO,
            size,
            base_size: size,
            opacity,
            base_opacity: opacity,
            color: Rgb::WHITE,
            link_distance: None,
            bubble: BubbleOverride::default(),
            infection: InfectionState::default(),
        }
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_link_distance(mut self, distance: f32) -> Self {
        self.link_distance = Some(distance);
        self
    }

    /// Position used for link measurement.
    #[inline]
    pub fn link_point(&self) -> Vec2 {
        self.position + self.offset
    }

    /// Radius to draw this frame.
    #[inline]
    pub fn draw_radius(&self) -> f32 {
        self.bubble.radius.unwrap_or(self.size)
    }

    /// Opacity to draw this frame.
    #[inline]
    pub fn draw_opacity(&self) -> f32 {
        self.bubble.opacity.unwrap_or(self.opacity)
    }
}

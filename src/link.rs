//! Link effect: lines between nearby particles.
//!
//! A pair is linked when the distance between their link points is within
//! the first particle's link distance. Line opacity falls off linearly from
//! the configured opacity at distance 0 to nothing at the threshold.
//!
//! The line color is resolved once per frame into a [`LinkSession`] and
//! shared by every line that frame. A fresh session each frame keeps a
//! "random" color from sticking around longer than one frame.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use log::debug;
use rand::Rng;

use crate::color::Rgb;
use crate::config::{LinkColorSource, LinkConfig};
use crate::geometry::distance;
use crate::particle::Particle;

/// Link color resolved for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkColor {
    /// Every line uses this color.
    Rgb(Rgb),
    /// Every line draws a new random color.
    Blink,
    /// Every line blends its two particles' colors.
    Mid,
}

impl LinkColor {
    /// The color to stroke one line with.
    pub fn draw_color<R: Rng + ?Sized>(&self, p1: &Particle, p2: &Particle, rng: &mut R) -> Rgb {
        match self {
            LinkColor::Rgb(rgb) => *rgb,
            LinkColor::Blink => Rgb::random(rng),
            LinkColor::Mid => Rgb::mix(p1.color, p2.color, p1.draw_radius(), p2.draw_radius()),
        }
    }
}

/// Per-frame memo of the resolved link color.
#[derive(Debug, Clone, Default)]
pub struct LinkSession {
    color: Option<LinkColor>,
}

impl LinkSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The frame's link color, resolving it on first use.
    pub fn color<R: Rng + ?Sized>(&mut self, config: &LinkConfig, rng: &mut R) -> LinkColor {
        if let Some(color) = self.color {
            return color;
        }
        let color = match config.color_source() {
            LinkColorSource::Concrete(rgb) => LinkColor::Rgb(rgb),
            LinkColorSource::RandomFixed => LinkColor::Rgb(Rgb::random(rng)),
            LinkColorSource::RandomBlink => LinkColor::Blink,
            LinkColorSource::RandomMid => LinkColor::Mid,
        };
        debug!("link color for this frame: {:?}", color);
        self.color = Some(color);
        color
    }

    /// The color resolved so far, if any line was accepted.
    pub fn resolved(&self) -> Option<LinkColor> {
        self.color
    }
}

/// An accepted link, ready for the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSpec {
    /// Index of the first particle.
    pub p1: usize,
    /// Index of the second particle.
    pub p2: usize,
    pub point1: Vec2,
    pub point2: Vec2,
    pub opacity: f32,
    pub color: LinkColor,
}

impl LineSpec {
    /// Endpoint vertices for a GPU line list.
    pub fn vertices(&self, color: Rgb) -> [LineVertex; 2] {
        let rgba = color.to_rgba_f32(self.opacity);
        [
            LineVertex {
                position: self.point1.to_array(),
                color: rgba,
            },
            LineVertex {
                position: self.point2.to_array(),
                color: rgba,
            },
        ]
    }
}

/// One line endpoint in GPU layout.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

/// Receives accepted lines with their stroke color.
pub trait LineSink {
    fn draw_line(&mut self, line: &LineSpec, color: Rgb, width: f32);
}

/// Collect vertices for upload with `bytemuck::cast_slice`.
impl LineSink for Vec<LineVertex> {
    fn draw_line(&mut self, line: &LineSpec, color: Rgb, _width: f32) {
        self.extend_from_slice(&line.vertices(color));
    }
}

/// Decide whether `p1` and `p2` are linked this frame.
///
/// Returns `None` when they are too far apart, when the faded opacity is
/// not positive, or when the threshold is not positive.
pub fn apply<R: Rng + ?Sized>(
    (i1, p1): (usize, &Particle),
    (i2, p2): (usize, &Particle),
    session: &mut LinkSession,
    config: &LinkConfig,
    rng: &mut R,
) -> Option<LineSpec> {
    let point1 = p1.link_point();
    let point2 = p2.link_point();
    let dist = distance(point1, point2);
    let threshold = p1.link_distance.unwrap_or(config.distance);

    if !(threshold > 0.0) || dist > threshold {
        return None;
    }

    let opacity = config.opacity - dist * config.opacity / threshold;
    if opacity <= 0.0 {
        return None;
    }

    Some(LineSpec {
        p1: i1,
        p2: i2,
        point1,
        point2,
        opacity,
        color: session.color(config, rng),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorSpec;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pair(dist: f32) -> (Particle, Particle) {
        (
            Particle::new(Vec2::ZERO, 2.0, 1.0),
            Particle::new(Vec2::new(dist, 0.0), 2.0, 1.0),
        )
    }

    fn link_config(distance: f32, opacity: f32) -> LinkConfig {
        LinkConfig {
            distance,
            opacity,
            ..LinkConfig::default()
        }
    }

    #[test]
    fn test_opacity_falloff() {
        let config = link_config(100.0, 0.5);
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = LinkSession::new();
        let (a, b) = pair(50.0);

        let line = apply((0, &a), (1, &b), &mut session, &config, &mut rng).unwrap();
        assert!((line.opacity - 0.25).abs() < 1e-6);
        assert_eq!(line.p1, 0);
        assert_eq!(line.p2, 1);
        assert_eq!(line.point2, Vec2::new(50.0, 0.0));
        assert_eq!(line.color, LinkColor::Rgb(Rgb::WHITE));
    }

    #[test]
    fn test_at_threshold_no_line() {
        let config = link_config(100.0, 0.5);
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = LinkSession::new();
        let (a, b) = pair(100.0);
        assert!(apply((0, &a), (1, &b), &mut session, &config, &mut rng).is_none());

        let (a, b) = pair(100.5);
        assert!(apply((0, &a), (1, &b), &mut session, &config, &mut rng).is_none());
        // nothing accepted, nothing resolved
        assert!(session.resolved().is_none());
    }

    #[test]
    fn test_particle_distance_override_and_offset() {
        let config = link_config(100.0, 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = LinkSession::new();

        let a = Particle::new(Vec2::ZERO, 2.0, 1.0).with_link_distance(20.0);
        let b = Particle::new(Vec2::new(30.0, 0.0), 2.0, 1.0);
        assert!(apply((0, &a), (1, &b), &mut session, &config, &mut rng).is_none());

        let b = b.with_offset(Vec2::new(-20.0, 0.0));
        let line = apply((0, &a), (1, &b), &mut session, &config, &mut rng).unwrap();
        assert!((line.opacity - 0.5).abs() < 1e-6);
        assert_eq!(line.point2, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_zero_threshold_disables() {
        let config = link_config(0.0, 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = LinkSession::new();
        let (a, b) = pair(0.0);
        assert!(apply((0, &a), (1, &b), &mut session, &config, &mut rng).is_none());
    }

    #[test]
    fn test_random_fixed_resolves_once_per_session() {
        let config = LinkConfig {
            color: ColorSpec::random(),
            consent: true,
            ..LinkConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(99);
        let mut session = LinkSession::new();

        let first = session.color(&config, &mut rng);
        assert!(matches!(first, LinkColor::Rgb(_)));
        for _ in 0..10 {
            assert_eq!(session.color(&config, &mut rng), first);
        }
    }

    #[test]
    fn test_blink_draws_per_line() {
        let mut rng = StdRng::seed_from_u64(5);
        let (a, b) = pair(1.0);
        let colors: Vec<Rgb> = (0..8).map(|_| LinkColor::Blink.draw_color(&a, &b, &mut rng)).collect();
        assert!(colors.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_mid_blends_particle_colors() {
        let mut rng = StdRng::seed_from_u64(5);
        let a = Particle::new(Vec2::ZERO, 1.0, 1.0).with_color(Rgb::BLACK);
        let b = Particle::new(Vec2::X, 1.0, 1.0).with_color(Rgb::new(200, 100, 0));
        assert_eq!(LinkColor::Mid.draw_color(&a, &b, &mut rng), Rgb::new(100, 50, 0));
    }

    #[test]
    fn test_vertices_are_pod() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = LinkSession::new();
        let (a, b) = pair(50.0);
        let line = apply((0, &a), (1, &b), &mut session, &link_config(100.0, 1.0), &mut rng).unwrap();

        let mut sink: Vec<LineVertex> = Vec::new();
        sink.draw_line(&line, Rgb::WHITE, 1.0);
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[1].position, [50.0, 0.0]);
        assert_eq!(sink[0].color, [1.0, 1.0, 1.0, 0.5]);

        let bytes: &[u8] = bytemuck::cast_slice(&sink);
        assert_eq!(bytes.len(), 2 * std::mem::size_of::<LineVertex>());
    }
}

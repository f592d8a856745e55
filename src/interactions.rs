//! Per-frame driver tying the effects together.
//!
//! [`Interactions`] owns everything that persists between frames (the press
//! pulse, the infection clock, scratch buffers, an RNG) and runs the effects
//! in a fixed order:
//!
//! 1. update the [`PressSession`] from the pointer
//! 2. apply the bubble effect to every particle
//! 3. link every candidate pair with a fresh [`LinkSession`]
//! 4. tick the infection when its interval has elapsed
//!
//! ```ignore
//! let mut interactions = Interactions::new(config);
//! interactions.seed_infections(&mut particles, time.now());
//!
//! // each frame
//! time.update();
//! let frame = interactions.frame(&mut particles, &pointer, time.now());
//! interactions.render(&frame, &particles, &mut renderer);
//! ```

use glam::Vec2;
use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bubble::{self, PressSession};
use crate::config::InteractionConfig;
use crate::infection::{InfectionEngine, TickReport};
use crate::link::{self, LineSink, LineSpec, LinkColor, LinkSession};
use crate::particle::Particle;
use crate::pointer::Pointer;
use crate::spatial::SpatialGrid;
use crate::time::Ticker;

/// What one frame produced for the renderer.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Accepted links, each unordered pair at most once with `p1 < p2`.
    pub lines: Vec<LineSpec>,
    /// The link color resolved for this frame, if any line was accepted.
    pub link_color: Option<LinkColor>,
    /// Infection transitions, if the infection ticked this frame.
    pub infection: Option<TickReport>,
}

/// The interaction engine.
#[derive(Debug)]
pub struct Interactions {
    config: InteractionConfig,
    press: PressSession,
    infection: InfectionEngine,
    infection_ticker: Ticker,
    grid: SpatialGrid,
    rng: StdRng,
    link_points: Vec<Vec2>,
}

impl Interactions {
    /// Create an engine with an entropy-seeded RNG.
    pub fn new(config: InteractionConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create an engine whose random choices are reproducible.
    pub fn with_seed(config: InteractionConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: InteractionConfig, rng: StdRng) -> Self {
        let mut engine = Self {
            press: PressSession::new(),
            infection: InfectionEngine::new(config.spatial),
            infection_ticker: Ticker::new(config.infection.tick_interval),
            grid: SpatialGrid::new(config.spatial),
            rng,
            link_points: Vec::new(),
            config,
        };
        engine.adopt_config();
        engine
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Replace the configuration between frames.
    ///
    /// Any running press pulse is dropped. Infection stages beyond the new
    /// stage count are clamped on the next tick.
    pub fn set_config(&mut self, config: InteractionConfig) {
        self.config = config;
        self.press.reset();
        self.adopt_config();
    }

    fn adopt_config(&mut self) {
        if let Err(e) = self.config.validate() {
            warn!("interaction config failed validation: {}", e);
        }
        self.grid.set_config(self.config.spatial);
        self.infection_ticker.set_interval(self.config.infection.tick_interval);
        self.infection
            .configure(&self.config.infection, self.config.spatial, &mut self.rng);
    }

    pub fn press_session(&self) -> &PressSession {
        &self.press
    }

    pub fn infection(&self) -> &InfectionEngine {
        &self.infection
    }

    /// Infect `infection.initialInfections` random healthy particles.
    pub fn seed_infections(&mut self, particles: &mut [Particle], now: f32) -> usize {
        if !self.config.infection.enable {
            return 0;
        }
        let count = self.config.infection.initial_infections as usize;
        self.infection.seed(particles, count, now, &mut self.rng)
    }

    /// Run every effect for the frame at `now`.
    pub fn frame(&mut self, particles: &mut [Particle], pointer: &Pointer, now: f32) -> Frame {
        self.press.update(pointer, &self.config.bubble, now);
        for particle in particles.iter_mut() {
            bubble::apply(particle, pointer, &self.press, &self.config);
        }

        let mut frame = Frame::default();
        if self.config.links.enable {
            let mut session = LinkSession::new();
            frame.lines = self.link_pass(particles, &mut session);
            frame.link_color = session.resolved();
        }

        if self.config.infection.enable && self.infection_ticker.ready(now) {
            frame.infection = Some(self.infection.tick(particles, &self.config.infection, now));
        }

        frame
    }

    fn link_pass(&mut self, particles: &[Particle], session: &mut LinkSession) -> Vec<LineSpec> {
        let links = &self.config.links;
        let reach = particles
            .iter()
            .filter_map(|p| p.link_distance)
            .fold(links.distance, f32::max);

        self.link_points.clear();
        self.link_points.extend(particles.iter().map(Particle::link_point));
        self.grid.rebuild(self.link_points.iter().copied());

        let mut lines = Vec::new();
        let rng = &mut self.rng;
        self.grid.for_each_candidate_pair(&self.link_points, reach, |i, j| {
            if let Some(line) = link::apply((i, &particles[i]), (j, &particles[j]), session, links, rng) {
                lines.push(line);
            }
        });
        lines
    }

    /// Hand the frame's lines to a renderer with their stroke colors.
    pub fn render<S: LineSink>(&mut self, frame: &Frame, particles: &[Particle], sink: &mut S) {
        let width = self.config.links.width;
        for line in &frame.lines {
            let (Some(p1), Some(p2)) = (particles.get(line.p1), particles.get(line.p2)) else {
                continue;
            };
            let color = line.color.draw_color(p1, p2, &mut self.rng);
            sink.draw_line(line, color, width);
        }
    }
}

//! Infection effect: a staged contagion spreading between nearby particles.
//!
//! Each particle is healthy (stage 0) or infected at a stage `1..=K`.
//! A tick applies three rules:
//!
//! | Rule | Condition | Result |
//! |------|-----------|--------|
//! | Spread | healthy, within `spreadRadius` of an infected particle | stage 1, `infected_at = now` |
//! | Progress | stage `s < K`, `now - infected_at >= s * stageDuration` | stage `s + 1` |
//! | Cure | stage `K`, `now - stage_entered_at >= cureDuration`, not terminal | healthy |
//!
//! All three are evaluated against a snapshot of stages taken when the tick
//! starts and committed together afterwards, so a particle infected during
//! a tick cannot infect others in that same tick and the result does not
//! depend on population order.

use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::color::Rgb;
use crate::config::InfectionConfig;
use crate::geometry::within;
use crate::particle::{InfectionState, Particle};
use crate::spatial::{SpatialConfig, SpatialGrid};

/// Transition counts from one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub infected: usize,
    pub advanced: usize,
    pub cured: usize,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.infected == 0 && self.advanced == 0 && self.cured == 0
    }
}

/// Population census by stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfectionStats {
    pub healthy: usize,
    pub infected: usize,
    /// `per_stage[s - 1]` counts particles at stage `s`.
    pub per_stage: Vec<usize>,
}

/// Drives the contagion for a whole population.
#[derive(Debug, Clone)]
pub struct InfectionEngine {
    grid: SpatialGrid,
    last_tick: Option<f32>,
    stage_colors: Vec<Option<Rgb>>,
    // reused between ticks
    snapshot: Vec<u32>,
    pending: Vec<(usize, InfectionState)>,
    candidates: Vec<usize>,
}

impl InfectionEngine {
    pub fn new(spatial: SpatialConfig) -> Self {
        Self {
            grid: SpatialGrid::new(spatial),
            last_tick: None,
            stage_colors: Vec::new(),
            snapshot: Vec::new(),
            pending: Vec::new(),
            candidates: Vec::new(),
        }
    }

    /// Resolve stage colors (random entries pick a color now) and adopt a
    /// new grid layout.
    pub fn configure<R: Rng + ?Sized>(&mut self, config: &InfectionConfig, spatial: SpatialConfig, rng: &mut R) {
        self.stage_colors = config
            .stage_colors
            .iter()
            .map(|spec| spec.to_rgb_or_random(rng).ok())
            .collect();
        self.grid.set_config(spatial);
    }

    /// Render color for `stage`, if one is configured.
    pub fn stage_color(&self, stage: u32) -> Option<Rgb> {
        let idx = stage.checked_sub(1)? as usize;
        self.stage_colors.get(idx).copied().flatten()
    }

    /// Timestamp of the last tick that ran.
    pub fn last_tick(&self) -> Option<f32> {
        self.last_tick
    }

    /// Infect up to `count` randomly chosen healthy particles at `now`.
    /// Returns how many were infected.
    pub fn seed<R: Rng + ?Sized>(&mut self, particles: &mut [Particle], count: usize, now: f32, rng: &mut R) -> usize {
        let healthy: Vec<usize> = particles
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.infection.is_infected())
            .map(|(i, _)| i)
            .collect();

        let chosen: Vec<usize> = healthy.choose_multiple(rng, count).copied().collect();
        for &idx in &chosen {
            particles[idx].infection.infect(now);
        }
        debug!("seeded {} infections", chosen.len());
        chosen.len()
    }

    /// Advance the contagion to `now`.
    ///
    /// A tick at a timestamp not later than the previous one does nothing.
    pub fn tick(&mut self, particles: &mut [Particle], config: &InfectionConfig, now: f32) -> TickReport {
        let mut report = TickReport::default();
        if !config.enable || !now.is_finite() {
            return report;
        }
        if matches!(self.last_tick, Some(last) if now <= last) {
            trace!("infection tick at {} skipped, last tick at {:?}", now, self.last_tick);
            return report;
        }
        self.last_tick = Some(now);

        let stages = config.stages.max(1);

        self.snapshot.clear();
        for p in particles.iter_mut() {
            if p.infection.stage > stages {
                p.infection.stage = stages;
            }
            self.snapshot.push(p.infection.stage);
        }

        self.pending.clear();
        self.collect_spread(particles, config, now);
        report.infected = self.pending.len();

        for (idx, p) in particles.iter().enumerate() {
            if self.snapshot[idx] == 0 {
                continue;
            }
            if let Some(next) = progress(&p.infection, stages, config, now) {
                if next.is_infected() {
                    report.advanced += 1;
                } else {
                    report.cured += 1;
                }
                self.pending.push((idx, next));
            }
        }

        for &(idx, state) in &self.pending {
            trace!("particle {}: stage {} -> {}", idx, particles[idx].infection.stage, state.stage);
            particles[idx].infection = state;
        }

        if !report.is_empty() {
            debug!(
                "infection tick at {:.3}: {} infected, {} advanced, {} cured",
                now, report.infected, report.advanced, report.cured
            );
        }
        report
    }

    /// Queue stage-1 transitions for healthy particles near an infected one.
    fn collect_spread(&mut self, particles: &[Particle], config: &InfectionConfig, now: f32) {
        let radius = config.spread_radius;
        if !(radius > 0.0) || !self.snapshot.iter().any(|&s| s > 0) {
            return;
        }

        self.grid.rebuild(particles.iter().map(|p| p.position));

        for (h, healthy) in particles.iter().enumerate() {
            if self.snapshot[h] != 0 {
                continue;
            }
            self.candidates.clear();
            self.grid.query(healthy.position, radius, &mut self.candidates);

            let exposed = self.candidates.iter().any(|&i| {
                self.snapshot[i] > 0 && within(particles[i].position, healthy.position, radius)
            });
            if exposed {
                let mut state = InfectionState::default();
                state.infect(now);
                self.pending.push((h, state));
            }
        }
    }

    /// Count particles per stage.
    pub fn stats(particles: &[Particle], stages: u32) -> InfectionStats {
        let stages = stages.max(1);
        let mut stats = InfectionStats {
            per_stage: vec![0; stages as usize],
            ..InfectionStats::default()
        };
        for p in particles {
            match p.infection.stage {
                0 => stats.healthy += 1,
                s => {
                    stats.infected += 1;
                    stats.per_stage[(s.min(stages) - 1) as usize] += 1;
                }
            }
        }
        stats
    }
}

impl Default for InfectionEngine {
    fn default() -> Self {
        Self::new(SpatialConfig::default())
    }
}

/// Next state of an infected particle at `now`, or `None` if unchanged.
///
/// Late ticks catch up: the stage is the one implied by elapsed time, and the
/// recorded transition time is the nominal one, so cure timing does not
/// depend on how often ticks run.
fn progress(state: &InfectionState, stages: u32, config: &InfectionConfig, now: f32) -> Option<InfectionState> {
    let infected_at = state.infected_at.unwrap_or(now);
    let mut next = InfectionState {
        stage: state.stage.min(stages),
        infected_at: Some(infected_at),
        stage_entered_at: Some(state.stage_entered_at.unwrap_or(infected_at)),
    };

    if next.stage < stages && config.stage_duration > 0.0 {
        let elapsed = (now - infected_at).max(0.0);
        // clamp in f32 so huge elapsed/duration ratios never overflow the cast
        let steps = (elapsed / config.stage_duration).floor().min((stages - 1) as f32);
        let implied = steps as u32 + 1;
        if implied > next.stage {
            next.stage = implied;
            next.stage_entered_at = Some(infected_at + (implied - 1) as f32 * config.stage_duration);
        }
    }

    if next.stage == stages && !config.terminal {
        let entered = next.stage_entered_at.unwrap_or(infected_at);
        if now - entered >= config.cure_duration {
            next.cure();
            return Some(next);
        }
    }

    (next != *state).then_some(next)
}

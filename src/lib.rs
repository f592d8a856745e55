//! # Particle Interactions
//!
//! Per-frame interaction effects for 2D particle fields: pointer-driven
//! bubbles, distance-faded links between neighbors, and a staged infection
//! that spreads by proximity.
//!
//! The crate owns no particles and draws nothing. You keep a `Vec<Particle>`,
//! feed pointer events and a clock in, and hand the resulting lines to
//! whatever renders them.
//!
//! ## Quick Start
//!
//! ```ignore
//! use particle_interactions::prelude::*;
//!
//! let mut config = InteractionConfig::new();
//! config.hover_bubble().bubble(120.0, 12.0, 1.0, 0.4).links(150.0, 0.6);
//!
//! let mut particles: Vec<Particle> = (0..200)
//!     .map(|i| Particle::new(Vec2::new(i as f32 * 7.0, 100.0), 3.0, 0.5))
//!     .collect();
//!
//! let mut interactions = Interactions::new(config);
//! let mut pointer = Pointer::new();
//! let mut time = Time::new();
//! let mut vertices: Vec<LineVertex> = Vec::new();
//!
//! // each frame
//! time.update();
//! pointer.move_to(Vec2::new(300.0, 100.0));
//! let frame = interactions.frame(&mut particles, &pointer, time.now());
//! interactions.render(&frame, &particles, &mut vertices);
//! ```
//!
//! ## Core Concepts
//!
//! ### Particles
//!
//! [`Particle`] carries base size and opacity plus the per-frame overrides
//! the effects write. Renderers should read [`Particle::draw_radius`] and
//! [`Particle::draw_opacity`], which prefer the bubble override when set.
//!
//! ### Effects
//!
//! | Effect | Module | Writes |
//! |--------|--------|--------|
//! | Bubble | [`bubble`] | `particle.bubble` |
//! | Links | [`link`] | [`LineSpec`] per accepted pair |
//! | Infection | [`infection`] | `particle.infection` |
//!
//! ### Configuration
//!
//! [`InteractionConfig`] deserializes from camelCase JSON and can be built in
//! code with `&mut Self` setters. Scale distances for high-DPI output with
//! [`InteractionConfig::scaled`].
//!
//! ## Spatial Hashing
//!
//! Link and infection neighbor searches bucket particles into a Morton-ordered
//! grid. Configure with [`SpatialConfig`]:
//!
//! - `cell_size` should be near your typical link distance
//! - `grid_resolution` must be a power of 2 (32, 64, 128)
//!
//! Positions outside the grid clamp to the border cells, so results stay
//! exact; they just get slower.

pub mod bubble;
pub mod color;
pub mod config;
mod error;
pub mod geometry;
pub mod infection;
mod interactions;
pub mod link;
pub mod particle;
pub mod pointer;
pub mod spatial;
pub mod time;

pub use bytemuck;
pub use glam::Vec2;

pub use bubble::{BubbleMode, PressSession};
pub use color::{ColorSpec, Rgb};
pub use config::{
    BubbleConfig, EventToggle, EventsConfig, InfectionConfig, InteractionConfig, InteractionMode,
    LinkColorSource, LinkConfig,
};
pub use error::ConfigError;
pub use infection::{InfectionEngine, InfectionStats, TickReport};
pub use interactions::{Frame, Interactions};
pub use link::{LineSink, LineSpec, LineVertex, LinkColor, LinkSession};
pub use particle::{BubbleOverride, InfectionState, Particle};
pub use pointer::{Pointer, PointerStatus};
pub use spatial::{SpatialConfig, SpatialGrid};
pub use time::{Ticker, Time};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use particle_interactions::prelude::*;
/// ```
///
/// This imports:
/// - [`Interactions`] - the per-frame driver
/// - [`InteractionConfig`] - all effect settings
/// - [`Particle`], [`Pointer`], [`Time`] - the inputs a frame needs
/// - [`LineSink`], [`LineVertex`] - for drawing links
/// - [`Vec2`] - glam vector type
pub mod prelude {
    pub use crate::color::{ColorSpec, Rgb};
    pub use crate::config::{InteractionConfig, InteractionMode};
    pub use crate::error::ConfigError;
    pub use crate::interactions::{Frame, Interactions};
    pub use crate::link::{LineSink, LineSpec, LineVertex, LinkColor};
    pub use crate::particle::Particle;
    pub use crate::pointer::Pointer;
    pub use crate::spatial::SpatialConfig;
    pub use crate::time::Time;
    pub use glam::Vec2;
}

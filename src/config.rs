//! Interaction configuration.
//!
//! The configuration is immutable for a run. It can be deserialized from
//! JSON (camelCase keys, every field optional) or assembled with the builder
//! methods:
//!
//! ```ignore
//! let mut config = InteractionConfig::default();
//! config
//!     .hover_bubble()
//!     .bubble(150.0, 24.0, 1.0, 0.4)
//!     .links(120.0, 0.6)
//!     .link_color(ColorSpec::random());
//! config.validate()?;
//! ```
//!
//! Hosts rendering at a device pixel ratio other than 1 should pass the
//! result of [`InteractionConfig::scaled`] to the engine so that every
//! distance is expressed in device pixels.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::color::{ColorSpec, Rgb};
use crate::error::ConfigError;
use crate::spatial::SpatialConfig;

/// Interaction modes a pointer event can trigger.
///
/// Only `Bubble` is handled by this crate; other host modes deserialize to
/// `Other` and are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InteractionMode {
    Bubble,
    #[serde(other)]
    Other,
}

/// Enable flag plus mode set for one pointer event kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventToggle {
    pub enable: bool,
    pub modes: Vec<InteractionMode>,
}

impl EventToggle {
    /// Enabled and listing `mode`.
    pub fn triggers(&self, mode: InteractionMode) -> bool {
        self.enable && self.modes.contains(&mode)
    }

    fn turn_on(&mut self, mode: InteractionMode) {
        self.enable = true;
        if !self.modes.contains(&mode) {
            self.modes.push(mode);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventsConfig {
    pub on_hover: EventToggle,
    pub on_click: EventToggle,
}

/// Bubble mode parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleConfig {
    /// Pointer distance inside which particles react.
    pub distance: f32,
    /// Target radius.
    pub size: f32,
    /// Target opacity.
    pub opacity: f32,
    /// Press pulse half-length in seconds.
    pub duration: f32,
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            distance: 200.0,
            size: 40.0,
            opacity: 0.8,
            duration: 0.4,
        }
    }
}

/// How the link color is chosen, decided once from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkColorSource {
    /// A fixed color.
    Concrete(Rgb),
    /// Random, chosen once per frame and shared by every line.
    RandomFixed,
    /// Random, chosen again for every line drawn.
    RandomBlink,
    /// Random without consent/blink: blend the two particle colors.
    RandomMid,
}

/// Link (connecting line) parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub enable: bool,
    /// Default maximum link length.
    pub distance: f32,
    /// Opacity of a zero-length link.
    pub opacity: f32,
    /// Line width handed to the renderer.
    pub width: f32,
    pub color: ColorSpec,
    /// With a random color: pick one color for every line of the frame.
    pub consent: bool,
    /// With a random color: pick a new color for each line.
    pub blink: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            enable: true,
            distance: 100.0,
            opacity: 1.0,
            width: 1.0,
            color: ColorSpec::default(),
            consent: false,
            blink: false,
        }
    }
}

impl LinkConfig {
    /// Classify the configured color.
    ///
    /// An unparseable color falls back to blending particle colors; config
    /// validation rejects those earlier.
    pub fn color_source(&self) -> LinkColorSource {
        if self.color.is_random() {
            if self.consent {
                LinkColorSource::RandomFixed
            } else if self.blink {
                LinkColorSource::RandomBlink
            } else {
                LinkColorSource::RandomMid
            }
        } else {
            match self.color.to_rgb() {
                Ok(rgb) => LinkColorSource::Concrete(rgb),
                Err(e) => {
                    warn!("{}; blending particle colors instead", e);
                    LinkColorSource::RandomMid
                }
            }
        }
    }
}

/// Contagion parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InfectionConfig {
    pub enable: bool,
    /// Distance within which an infected particle infects a healthy one.
    pub spread_radius: f32,
    /// Number of infection stages (K).
    pub stages: u32,
    /// Seconds spent in each stage before advancing.
    pub stage_duration: f32,
    /// Seconds spent in the last stage before curing.
    pub cure_duration: f32,
    /// When set, the last stage never cures.
    pub terminal: bool,
    /// Healthy particles infected when the engine is seeded.
    pub initial_infections: u32,
    /// Render color per stage, index 0 being stage 1.
    pub stage_colors: Vec<ColorSpec>,
    /// Seconds between ticks; 0 ticks every frame.
    pub tick_interval: f32,
}

impl Default for InfectionConfig {
    fn default() -> Self {
        Self {
            enable: false,
            spread_radius: 20.0,
            stages: 3,
            stage_duration: 2.0,
            cure_duration: 3.0,
            terminal: false,
            initial_infections: 0,
            stage_colors: Vec::new(),
            tick_interval: 0.0,
        }
    }
}

/// Complete configuration for the interaction engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub events: EventsConfig,
    pub bubble: BubbleConfig,
    pub links: LinkConfig,
    pub infection: InfectionConfig,
    pub spatial: SpatialConfig,
}

impl InteractionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: InteractionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check ranges and color strings.
    ///
    /// Zero distances and durations are allowed; they disable the matching
    /// effect at run time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("bubble.distance", self.bubble.distance)?;
        non_negative("bubble.size", self.bubble.size)?;
        non_negative("bubble.opacity", self.bubble.opacity)?;
        non_negative("bubble.duration", self.bubble.duration)?;

        non_negative("links.distance", self.links.distance)?;
        non_negative("links.opacity", self.links.opacity)?;
        non_negative("links.width", self.links.width)?;
        if !self.links.color.is_random() {
            self.links.color.to_rgb()?;
        }

        let infection = &self.infection;
        non_negative("infection.spreadRadius", infection.spread_radius)?;
        non_negative("infection.stageDuration", infection.stage_duration)?;
        non_negative("infection.cureDuration", infection.cure_duration)?;
        non_negative("infection.tickInterval", infection.tick_interval)?;
        if infection.enable && infection.stages == 0 {
            return Err(ConfigError::invalid("infection.stages", "must be at least 1"));
        }
        if infection.enable && infection.stages > 1 && infection.stage_duration == 0.0 {
            warn!("infection.stageDuration is 0; particles will stay in stage 1");
        }
        for color in &infection.stage_colors {
            if !color.is_random() {
                color.to_rgb()?;
            }
        }

        self.spatial.validate()
    }

    /// Copy with every length multiplied by the device pixel ratio.
    pub fn scaled(&self, pixel_ratio: f32) -> Self {
        let ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            warn!("ignoring invalid pixel ratio {}", pixel_ratio);
            1.0
        };

        let mut scaled = self.clone();
        scaled.bubble.distance *= ratio;
        scaled.bubble.size *= ratio;
        scaled.links.distance *= ratio;
        scaled.links.width *= ratio;
        scaled.infection.spread_radius *= ratio;
        scaled.spatial.cell_size *= ratio;
        scaled
    }

    // ========== Builder ==========

    /// Enable bubble on hover.
    pub fn hover_bubble(&mut self) -> &mut Self {
        self.events.on_hover.turn_on(InteractionMode::Bubble);
        self
    }

    /// Enable bubble on press.
    pub fn click_bubble(&mut self) -> &mut Self {
        self.events.on_click.turn_on(InteractionMode::Bubble);
        self
    }

    /// Set bubble distance, target size, target opacity and press duration.
    pub fn bubble(&mut self, distance: f32, size: f32, opacity: f32, duration: f32) -> &mut Self {
        self.bubble = BubbleConfig {
            distance,
            size,
            opacity,
            duration,
        };
        self
    }

    /// Enable links with a maximum length and base opacity.
    pub fn links(&mut self, distance: f32, opacity: f32) -> &mut Self {
        self.links.enable = true;
        self.links.distance = distance;
        self.links.opacity = opacity;
        self
    }

    pub fn link_color(&mut self, color: ColorSpec) -> &mut Self {
        self.links.color = color;
        self
    }

    /// Enable infection with spread radius, stage count, per-stage and cure durations.
    pub fn infection(&mut self, spread_radius: f32, stages: u32, stage_duration: f32, cure_duration: f32) -> &mut Self {
        self.infection.enable = true;
        self.infection.spread_radius = spread_radius;
        self.infection.stages = stages;
        self.infection.stage_duration = stage_duration;
        self.infection.cure_duration = cure_duration;
        self
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("expected a finite non-negative number, got {}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = InteractionConfig::from_json("{}").unwrap();
        assert_eq!(config, InteractionConfig::default());
    }

    #[test]
    fn test_parse_camel_case_and_unknown_modes() {
        let json = r##"{
            "events": {
                "onHover": { "enable": true, "modes": ["grab", "bubble"] },
                "onClick": { "enable": true, "modes": ["push"] }
            },
            "bubble": { "distance": 250, "size": 30, "opacity": 1, "duration": 2 },
            "links": { "distance": 150, "color": "random", "blink": true },
            "infection": { "enable": true, "spreadRadius": 12, "stages": 4, "stageColors": ["#f00", "yellow"] }
        }"##;
        let config = InteractionConfig::from_json(json).unwrap();

        assert!(config.events.on_hover.triggers(InteractionMode::Bubble));
        assert!(!config.events.on_click.triggers(InteractionMode::Bubble));
        assert_eq!(config.events.on_click.modes, vec![InteractionMode::Other]);
        assert_eq!(config.bubble.distance, 250.0);
        assert_eq!(config.links.color_source(), LinkColorSource::RandomBlink);
        assert_eq!(config.infection.stages, 4);
        assert_eq!(config.infection.spread_radius, 12.0);
    }

    #[test]
    fn test_disabled_toggle_does_not_trigger() {
        let toggle = EventToggle {
            enable: false,
            modes: vec![InteractionMode::Bubble],
        };
        assert!(!toggle.triggers(InteractionMode::Bubble));
    }

    #[test]
    fn test_color_source_variants() {
        let mut links = LinkConfig::default();
        assert_eq!(links.color_source(), LinkColorSource::Concrete(Rgb::WHITE));

        links.color = ColorSpec::random();
        assert_eq!(links.color_source(), LinkColorSource::RandomMid);
        links.blink = true;
        assert_eq!(links.color_source(), LinkColorSource::RandomBlink);
        links.consent = true;
        assert_eq!(links.color_source(), LinkColorSource::RandomFixed);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = InteractionConfig::default();
        config.bubble.duration = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "bubble.duration", .. })
        ));

        let mut config = InteractionConfig::default();
        config.links.color = ColorSpec::Text("not-a-color".into());
        assert!(matches!(config.validate(), Err(ConfigError::InvalidColor(_))));

        let mut config = InteractionConfig::default();
        config.infection(10.0, 0, 1.0, 1.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "infection.stages", .. })
        ));
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            InteractionConfig::from_json("{ \"bubble\": 3 }"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_scaled_multiplies_lengths_only() {
        let mut config = InteractionConfig::default();
        config.bubble(100.0, 20.0, 0.5, 1.0).links(50.0, 0.4);
        let scaled = config.scaled(2.0);

        assert_eq!(scaled.bubble.distance, 200.0);
        assert_eq!(scaled.bubble.size, 40.0);
        assert_eq!(scaled.bubble.opacity, 0.5);
        assert_eq!(scaled.bubble.duration, 1.0);
        assert_eq!(scaled.links.distance, 100.0);
        assert_eq!(scaled.links.opacity, 0.4);

        assert_eq!(config.scaled(f32::NAN), config);
    }

    #[test]
    fn test_json_round_trip_keeps_builder_settings() {
        let mut config = InteractionConfig::default();
        config.hover_bubble().click_bubble().infection(8.0, 2, 1.0, 1.5);
        let back = InteractionConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }
}

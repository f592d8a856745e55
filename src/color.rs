//! Color specifications and their renderable form.
//!
//! Configuration describes colors loosely (a hex string, a CSS-like
//! `rgb(..)`, a handful of names, a structured RGB/HSL value, or the
//! `"random"` sentinel). Everything the renderer sees is a concrete [`Rgb`].
//!
//! ```ignore
//! let spec: ColorSpec = serde_json::from_str("\"#ff8800\"")?;
//! assert_eq!(spec.to_rgb()?, Rgb::new(255, 136, 0));
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The sentinel string meaning "pick a random color".
pub const RANDOM_COLOR: &str = "random";

/// An 8-bit RGB color, ready to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// A uniformly random color.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.gen(), rng.gen(), rng.gen())
    }

    /// Blend two colors, weighting each by the matching size.
    ///
    /// Falls back to an even blend when both weights are zero.
    pub fn mix(a: Rgb, b: Rgb, weight_a: f32, weight_b: f32) -> Rgb {
        let (wa, wb) = if weight_a + weight_b > 0.0 {
            (weight_a, weight_b)
        } else {
            (1.0, 1.0)
        };
        let total = wa + wb;
        let channel = |x: u8, y: u8| ((x as f32 * wa + y as f32 * wb) / total).round().clamp(0.0, 255.0) as u8;
        Rgb::new(channel(a.r, b.r), channel(a.g, b.g), channel(a.b, b.b))
    }

    /// Normalized `[r, g, b, a]` for GPU upload.
    pub fn to_rgba_f32(self, alpha: f32) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            alpha,
        ]
    }

    /// Convert hue (degrees), saturation and lightness (percent) to RGB.
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Rgb {
        let h = h.rem_euclid(360.0) / 360.0;
        let s = (s / 100.0).clamp(0.0, 1.0);
        let l = (l / 100.0).clamp(0.0, 1.0);

        if s == 0.0 {
            let v = (l * 255.0).round() as u8;
            return Rgb::new(v, v, v);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let to_channel = |t: f32| {
            let t = t.rem_euclid(1.0);
            let v = if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            };
            (v * 255.0).round().clamp(0.0, 255.0) as u8
        };

        Rgb::new(to_channel(h + 1.0 / 3.0), to_channel(h), to_channel(h - 1.0 / 3.0))
    }
}

/// A color as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Hex (`#rgb`, `#rrggbb`), `rgb(r, g, b)`, a basic name, or `"random"`.
    Text(String),
    /// Structured RGB channels.
    Rgb { r: u8, g: u8, b: u8 },
    /// Structured HSL (hue in degrees, saturation/lightness in percent).
    Hsl { h: f32, s: f32, l: f32 },
}

impl Default for ColorSpec {
    fn default() -> Self {
        ColorSpec::Text("#ffffff".to_string())
    }
}

impl From<Rgb> for ColorSpec {
    fn from(c: Rgb) -> Self {
        ColorSpec::Rgb { r: c.r, g: c.g, b: c.b }
    }
}

impl From<&str> for ColorSpec {
    fn from(s: &str) -> Self {
        ColorSpec::Text(s.to_string())
    }
}

impl ColorSpec {
    pub fn random() -> Self {
        ColorSpec::Text(RANDOM_COLOR.to_string())
    }

    /// Whether this is the `"random"` sentinel.
    pub fn is_random(&self) -> bool {
        matches!(self, ColorSpec::Text(s) if s.trim().eq_ignore_ascii_case(RANDOM_COLOR))
    }

    /// Resolve a concrete color. The random sentinel is rejected; callers
    /// decide what randomness means for them.
    pub fn to_rgb(&self) -> Result<Rgb, ConfigError> {
        match self {
            ColorSpec::Text(s) => parse_color_str(s),
            ColorSpec::Rgb { r, g, b } => Ok(Rgb::new(*r, *g, *b)),
            ColorSpec::Hsl { h, s, l } => Ok(Rgb::from_hsl(*h, *s, *l)),
        }
    }

    /// Resolve a concrete color, drawing one at random for the sentinel.
    pub fn to_rgb_or_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Rgb, ConfigError> {
        if self.is_random() {
            Ok(Rgb::random(rng))
        } else {
            self.to_rgb()
        }
    }
}

fn parse_color_str(input: &str) -> Result<Rgb, ConfigError> {
    let s = input.trim();
    let invalid = || ConfigError::InvalidColor(input.to_string());

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(invalid);
    }

    let lower = s.to_ascii_lowercase();
    if let Some(body) = lower.strip_prefix("rgb(").and_then(|rest| rest.strip_suffix(')')) {
        let channels: Vec<u8> = body
            .split(',')
            .map(|c| c.trim().parse::<u8>())
            .collect::<Result<_, _>>()
            .map_err(|_| invalid())?;
        return match channels.as_slice() {
            [r, g, b] => Ok(Rgb::new(*r, *g, *b)),
            _ => Err(invalid()),
        };
    }

    named_color(&lower).ok_or_else(invalid)
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

    match hex.len() {
        3 | 4 => Some(Rgb::new(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17)),
        6 | 8 => Some(Rgb::new(byte(0)?, byte(2)?, byte(4)?)),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Rgb> {
    let c = match name {
        "white" => Rgb::WHITE,
        "black" => Rgb::BLACK,
        "red" => Rgb::new(255, 0, 0),
        "green" => Rgb::new(0, 128, 0),
        "lime" => Rgb::new(0, 255, 0),
        "blue" => Rgb::new(0, 0, 255),
        "yellow" => Rgb::new(255, 255, 0),
        "cyan" | "aqua" => Rgb::new(0, 255, 255),
        "magenta" | "fuchsia" => Rgb::new(255, 0, 255),
        "orange" => Rgb::new(255, 165, 0),
        "purple" => Rgb::new(128, 0, 128),
        "gray" | "grey" => Rgb::new(128, 128, 128),
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_hex_forms() {
        assert_eq!(parse_color_str("#fff").unwrap(), Rgb::WHITE);
        assert_eq!(parse_color_str("#FF8800").unwrap(), Rgb::new(255, 136, 0));
        assert_eq!(parse_color_str("#00000080").unwrap(), Rgb::BLACK);
        assert!(parse_color_str("#12").is_err());
        assert!(parse_color_str("#zzzzzz").is_err());
    }

    #[test]
    fn test_rgb_function_and_names() {
        assert_eq!(parse_color_str("rgb(1, 2, 3)").unwrap(), Rgb::new(1, 2, 3));
        assert_eq!(parse_color_str(" Red ").unwrap(), Rgb::new(255, 0, 0));
        assert!(parse_color_str("rgb(1,2)").is_err());
        assert!(parse_color_str("chartreuse-ish").is_err());
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(Rgb::from_hsl(0.0, 100.0, 50.0), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::from_hsl(120.0, 100.0, 50.0), Rgb::new(0, 255, 0));
        assert_eq!(Rgb::from_hsl(240.0, 100.0, 50.0), Rgb::new(0, 0, 255));
        assert_eq!(Rgb::from_hsl(0.0, 0.0, 100.0), Rgb::WHITE);
    }

    #[test]
    fn test_random_sentinel() {
        assert!(ColorSpec::random().is_random());
        assert!(ColorSpec::Text("RANDOM".into()).is_random());
        assert!(!ColorSpec::default().is_random());
        assert!(ColorSpec::random().to_rgb().is_err());

        let mut rng = StdRng::seed_from_u64(7);
        assert!(ColorSpec::random().to_rgb_or_random(&mut rng).is_ok());
    }

    #[test]
    fn test_mix_weights() {
        let mixed = Rgb::mix(Rgb::BLACK, Rgb::WHITE, 1.0, 3.0);
        assert_eq!(mixed, Rgb::new(191, 191, 191));
        assert_eq!(Rgb::mix(Rgb::BLACK, Rgb::WHITE, 0.0, 0.0), Rgb::new(128, 128, 128));
    }

    #[test]
    fn test_deserialize_variants() {
        let text: ColorSpec = serde_json::from_str("\"#000\"").unwrap();
        assert_eq!(text.to_rgb().unwrap(), Rgb::BLACK);

        let rgb: ColorSpec = serde_json::from_str(r#"{"r": 10, "g": 20, "b": 30}"#).unwrap();
        assert_eq!(rgb.to_rgb().unwrap(), Rgb::new(10, 20, 30));

        let hsl: ColorSpec = serde_json::from_str(r#"{"h": 0, "s": 0, "l": 0}"#).unwrap();
        assert_eq!(hsl.to_rgb().unwrap(), Rgb::BLACK);
    }
}

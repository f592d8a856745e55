//! Error types for interaction configuration.
//!
//! Only configuration loading can fail. The per-frame effects never return
//! errors: degenerate inputs disable the effect for that frame instead.

use std::fmt;

/// Errors that can occur while loading or validating an [`InteractionConfig`].
///
/// [`InteractionConfig`]: crate::config::InteractionConfig
#[derive(Debug)]
pub enum ConfigError {
    /// The JSON source could not be parsed.
    Json(serde_json::Error),
    /// A color string could not be understood.
    InvalidColor(String),
    /// A numeric field is outside its allowed range.
    Invalid {
        /// Dotted path of the offending field, e.g. `bubble.duration`.
        field: &'static str,
        /// Human readable reason.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "Failed to parse interaction config: {}", e),
            ConfigError::InvalidColor(s) => write!(f, "Unrecognized color: {:?}", s),
            ConfigError::Invalid { field, reason } => write!(f, "Invalid value for `{}`: {}", field, reason),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_invalid() {
        let err = ConfigError::invalid("bubble.duration", "must not be negative");
        assert_eq!(
            err.to_string(),
            "Invalid value for `bubble.duration`: must not be negative"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn test_json_error_has_source() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = ConfigError::from(json_err);
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Failed to parse interaction config"));
    }
}

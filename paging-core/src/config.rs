//! Orchestrator configuration.

use serde::Deserialize;

use crate::error::ConfigError;

/// Construction-time settings for an [`Orchestrator`](crate::Orchestrator).
///
/// ```rust
/// use paging_core::PagingConfig;
///
/// let config = PagingConfig::from_json(r#"{ "label": "inbox" }"#).unwrap();
/// assert_eq!(config.first_page, 1);
/// assert_eq!(config.label, "inbox");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagingConfig {
    /// Page number of the initial, empty page state.
    pub first_page: u32,

    /// Name attached to every log record emitted by the orchestrator.
    pub label: String,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            first_page: 1,
            label: "paging".to_string(),
        }
    }
}

impl PagingConfig {
    /// Create the default config with a custom log label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every field holds a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.first_page == 0 {
            return Err(ConfigError::InvalidFirstPage {
                page: self.first_page,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_starts_at_page_one() {
        let config = PagingConfig::default();
        assert_eq!(config.first_page, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn from_json_fills_missing_fields() {
        let config = PagingConfig::from_json(r#"{ "first_page": 3 }"#).unwrap();
        assert_eq!(config.first_page, 3);
        assert_eq!(config.label, "paging");
    }

    #[test]
    fn from_json_rejects_page_zero() {
        let err = PagingConfig::from_json(r#"{ "first_page": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFirstPage { page: 0 }));
    }

    #[test]
    fn from_json_rejects_unknown_fields() {
        let err = PagingConfig::from_json(r#"{ "retries": 3 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn labeled_keeps_defaults() {
        let config = PagingConfig::labeled("feed");
        assert_eq!(config.label, "feed");
        assert_eq!(config.first_page, 1);
    }
}

use crate::scanner::Symbology;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_LIBRARY_URL: &str =
    "https://cdn.jsdelivr.net/npm/@ericblade/quagga2@1.8.4/dist/quagga.min.js";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

fn default_library_url() -> String {
    DEFAULT_LIBRARY_URL.to_string()
}

fn default_target_id() -> String {
    "scanner-viewport".to_string()
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

fn default_facing_mode() -> String {
    "environment".to_string()
}

fn default_symbologies() -> Vec<Symbology> {
    vec![Symbology::Ean13, Symbology::Ean8]
}

fn default_workers() -> u32 {
    4
}

fn default_frequency() -> u32 {
    10
}

/// Client configuration, embedded in the page as JSON.
///
/// Every field is optional in the JSON; missing ones take their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Origin of the catalog API. Empty means the page's own origin.
    #[serde(default)]
    pub api_base: String,
    #[serde(default)]
    pub scanner: ScannerConfig,
}

/// Barcode scanner settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Where the decoder script is loaded from
    #[serde(default = "default_library_url")]
    pub library_url: String,
    /// Id of the element the camera preview is rendered into
    #[serde(default = "default_target_id")]
    pub target_id: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// `environment` for the rear camera, `user` for the front one
    #[serde(default = "default_facing_mode")]
    pub facing_mode: String,
    #[serde(default = "default_symbologies")]
    pub symbologies: Vec<Symbology>,
    #[serde(default = "default_workers")]
    pub workers: u32,
    /// Decode attempts per second
    #[serde(default = "default_frequency")]
    pub frequency: u32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            library_url: default_library_url(),
            target_id: default_target_id(),
            width: default_width(),
            height: default_height(),
            facing_mode: default_facing_mode(),
            symbologies: default_symbologies(),
            workers: default_workers(),
            frequency: default_frequency(),
        }
    }
}

impl ClientConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the embedded config, or fall back to defaults when it is
    /// missing or unusable.
    pub fn from_embedded(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Self::default(),
            Some(raw) => Self::from_json(raw).unwrap_or_else(|e| {
                warn!("Ignoring embedded client config: {}", e);
                Self::default()
            }),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let scanner = &self.scanner;
        if scanner.symbologies.is_empty() {
            return Err(ConfigError::Config(
                "scanner needs at least one symbology".to_string(),
            ));
        }
        if scanner.target_id.trim().is_empty() {
            return Err(ConfigError::Config(
                "scanner target element id is empty".to_string(),
            ));
        }
        if scanner.width == 0 || scanner.height == 0 || scanner.frequency == 0 {
            return Err(ConfigError::Config(
                "scanner width, height and frequency must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = ClientConfig::from_json("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.scanner.target_id, "scanner-viewport");
        assert_eq!(
            config.scanner.symbologies,
            vec![Symbology::Ean13, Symbology::Ean8]
        );
    }

    #[test]
    fn partial_scanner_section_keeps_other_defaults() {
        let config = ClientConfig::from_json(
            r#"{"api_base": "https://books.example", "scanner": {"facing_mode": "user", "workers": 2}}"#,
        )
        .unwrap();
        assert_eq!(config.api_base, "https://books.example");
        assert_eq!(config.scanner.facing_mode, "user");
        assert_eq!(config.scanner.workers, 2);
        assert_eq!(config.scanner.width, 640);
        assert_eq!(config.scanner.library_url, DEFAULT_LIBRARY_URL);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            ClientConfig::from_json(r#"{"scanner": {"symbologies": []}}"#),
            Err(ConfigError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::from_json(r#"{"scanner": {"symbologies": ["qr"]}}"#),
            Err(ConfigError::Serialization(_))
        ));
        assert!(matches!(
            ClientConfig::from_json(r#"{"scanner": {"frequency": 0}}"#),
            Err(ConfigError::Config(_))
        ));
    }

    #[test]
    fn embedded_config_falls_back_to_defaults() {
        assert_eq!(ClientConfig::from_embedded(None), ClientConfig::default());
        assert_eq!(ClientConfig::from_embedded(Some("  ")), ClientConfig::default());
        assert_eq!(ClientConfig::from_embedded(Some("{oops")), ClientConfig::default());
        assert_eq!(
            ClientConfig::from_embedded(Some(r#"{"api_base":"/catalog"}"#)).api_base,
            "/catalog"
        );
    }
}

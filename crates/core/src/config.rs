use std::time::Duration;

use chrono::FixedOffset;
use serde::Deserialize;

use crate::error::{PopupError, PopupResult};

pub const DEFAULT_HIDE_TRANSITION_MS: u64 = 500;
pub const DEFAULT_SESSION_MARKER_PREFIX: &str = "fpp_popup_shown_";

/// Root application configuration. Loaded from environment variables
/// with the prefix `POPUP_EXPRESS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub presentation: PresentationConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// JSON file holding the popup records (array of rows).
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

/// Settings shared by the markup renderer and the client controller. Both
/// sides must agree on these for the attribute contract to line up.
#[derive(Debug, Clone, Deserialize)]
pub struct PresentationConfig {
    #[serde(default = "default_class_prefix")]
    pub class_prefix: String,
    #[serde(default = "default_hide_transition_ms")]
    pub hide_transition_ms: u64,
    #[serde(default = "default_session_marker_prefix")]
    pub session_marker_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Locale used when a request does not name one.
    #[serde(default = "default_locale")]
    pub default_locale: String,
    /// Offset of the site's wall clock from UTC. Stored schedule dates
    /// without an explicit offset are in this local time.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

// Default functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_catalog_path() -> String {
    "popups.json".to_string()
}
fn default_class_prefix() -> String {
    "fpp".to_string()
}
fn default_hide_transition_ms() -> u64 {
    DEFAULT_HIDE_TRANSITION_MS
}
fn default_session_marker_prefix() -> String {
    DEFAULT_SESSION_MARKER_PREFIX.to_string()
}
fn default_locale() -> String {
    "en".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            class_prefix: default_class_prefix(),
            hide_transition_ms: default_hide_transition_ms(),
            session_marker_prefix: default_session_marker_prefix(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            utc_offset_minutes: 0,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            catalog: CatalogConfig::default(),
            presentation: PresentationConfig::default(),
            site: SiteConfig::default(),
        }
    }
}

impl PresentationConfig {
    pub fn hide_transition(&self) -> Duration {
        Duration::from_millis(self.hide_transition_ms)
    }
}

impl SiteConfig {
    pub fn utc_offset(&self) -> PopupResult<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                PopupError::Config(format!(
                    "site.utc_offset_minutes out of range: {}",
                    self.utc_offset_minutes
                ))
            })
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> PopupResult<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("POPUP_EXPRESS")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| PopupError::Config(e.to_string()))
    }
}

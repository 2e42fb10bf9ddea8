// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration management.
//!
//! Settings persist as TOML through `confy`. Command-line flags override the
//! file, and the `SERVER_STATUS_ENDPOINT` environment variable overrides the
//! endpoint.

use chrono::FixedOffset;
use log::warn;
use serde::{Deserialize, Serialize};
use server_status::format::DEFAULT_LOCALE;
use server_status::{battlemetrics_endpoint, TimestampFormatter, Zone};

use crate::cli::Args;

const APP_NAME: &str = "status-card";
const CONFIG_NAME: &str = "config";

/// Environment variable that takes precedence over the configured endpoint
pub const ENDPOINT_ENV_VAR: &str = "SERVER_STATUS_ENDPOINT";

/// BattleMetrics id of the default server
pub const DEFAULT_SERVER_ID: &str = "36230853";

/// Address players connect to, shown on the card
pub const DEFAULT_SERVER_ADDRESS: &str = "38.225.91.40:2702";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// BattleMetrics server id used to build the endpoint
    #[serde(default = "default_server_id")]
    pub server_id: String,

    /// Explicit status endpoint (overrides `server_id`)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Refresh interval in minutes (non-positive or missing means 30)
    #[serde(default)]
    pub refresh_minutes: Option<f64>,

    /// Locale for timestamps, e.g. "es_CL"
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Fixed UTC offset for timestamps; local time when unset
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,

    /// Game server address displayed alongside the status
    #[serde(default = "default_server_address")]
    pub server_address: String,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_server_id() -> String {
    DEFAULT_SERVER_ID.to_string()
}

fn default_locale() -> String {
    "es_CL".to_string()
}

fn default_server_address() -> String {
    DEFAULT_SERVER_ADDRESS.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            server_id: default_server_id(),
            endpoint: None,
            refresh_minutes: None,
            locale: default_locale(),
            utc_offset_minutes: None,
            server_address: default_server_address(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults if missing
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Apply command-line overrides
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(server_id) = &args.server_id {
            self.server_id.clone_from(server_id);
        }
        if let Some(endpoint) = &args.endpoint {
            self.endpoint = Some(endpoint.clone());
        }
        if let Some(minutes) = args.refresh_minutes {
            self.refresh_minutes = Some(minutes);
        }
        if let Some(locale) = &args.locale {
            self.locale.clone_from(locale);
        }
        if let Some(offset) = args.utc_offset_minutes {
            self.utc_offset_minutes = Some(offset);
        }
    }

    /// Resolve the status endpoint from environment variable or config
    pub fn resolve_endpoint(&self) -> String {
        let from_env = std::env::var(ENDPOINT_ENV_VAR).ok();
        pick_endpoint(from_env, self.endpoint.as_deref(), &self.server_id)
    }

    /// Build the timestamp formatter, falling back to the default locale
    pub fn formatter(&self) -> TimestampFormatter {
        let locale = TimestampFormatter::parse_locale(&self.locale).unwrap_or_else(|| {
            warn!("Unknown locale '{}', using {:?}", self.locale, DEFAULT_LOCALE);
            DEFAULT_LOCALE
        });

        let zone = match self.utc_offset_minutes {
            Some(minutes) => match FixedOffset::east_opt(minutes.saturating_mul(60)) {
                Some(offset) => Zone::Fixed(offset),
                None => {
                    warn!("UTC offset of {minutes} minutes is out of range, using local time");
                    Zone::Local
                }
            },
            None => Zone::Local,
        };

        TimestampFormatter::new(locale, zone)
    }
}

fn pick_endpoint(from_env: Option<String>, configured: Option<&str>, server_id: &str) -> String {
    // Check environment variable first
    if let Some(endpoint) = from_env.filter(|e| !e.trim().is_empty()) {
        return endpoint;
    }

    // Fall back to config, then the BattleMetrics server id
    configured
        .filter(|e| !e.trim().is_empty())
        .map_or_else(|| battlemetrics_endpoint(server_id), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Locale;
    use clap::Parser;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"refresh_minutes": 10.0}"#).unwrap();
        assert_eq!(config.refresh_minutes, Some(10.0));
        assert_eq!(config.server_id, DEFAULT_SERVER_ID);
        assert_eq!(config.locale, "es_CL");
        assert_eq!(config.server_address, DEFAULT_SERVER_ADDRESS);
    }

    #[test]
    fn test_endpoint_precedence() {
        assert_eq!(
            pick_endpoint(Some("http://env/status".into()), Some("http://file/status"), "1"),
            "http://env/status"
        );
        assert_eq!(
            pick_endpoint(Some("  ".into()), Some("http://file/status"), "1"),
            "http://file/status"
        );
        assert_eq!(
            pick_endpoint(None, Some(""), "99"),
            "https://api.battlemetrics.com/servers/99"
        );
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config = AppConfig {
            refresh_minutes: Some(10.0),
            ..AppConfig::default()
        };
        let args = Args::try_parse_from([
            "status-card",
            "--server-id",
            "42",
            "--refresh-minutes",
            "-5",
            "--locale",
            "en-US",
        ])
        .unwrap();

        config.apply_args(&args);
        assert_eq!(config.server_id, "42");
        assert_eq!(config.refresh_minutes, Some(-5.0));
        assert_eq!(config.locale, "en-US");
        assert_eq!(config.endpoint, None);
    }

    #[test]
    fn test_formatter_from_config() {
        let config = AppConfig {
            locale: "en_US".into(),
            utc_offset_minutes: Some(-180),
            ..AppConfig::default()
        };
        let formatter = config.formatter();
        assert_eq!(formatter.locale(), Locale::en_US);
        assert_eq!(formatter.zone(), Zone::Fixed(FixedOffset::west_opt(3 * 3600).unwrap()));
    }

    #[test]
    fn test_formatter_fallbacks() {
        let config = AppConfig {
            locale: "klingon".into(),
            utc_offset_minutes: Some(100_000),
            ..AppConfig::default()
        };
        let formatter = config.formatter();
        assert_eq!(formatter.locale(), DEFAULT_LOCALE);
        assert_eq!(formatter.zone(), Zone::Local);
    }
}

//! Run configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `FINOPS_*` environment variables. The CLI applies its flags last.
//!
//! ```toml
//! timezone = "Europe/Rome"
//! output_dir = "reports"
//!
//! [gateway]
//! base_url = "http://localhost:4000/v1"
//! model = "grok4-oci"
//!
//! [telemetry]
//! enabled = false
//!
//! [policies.spend_cap]
//! hard_cap_usd = 400.0
//! ```

use std::path::{Path, PathBuf};

use month_window::{parse_timezone, DEFAULT_TIMEZONE};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::policy::PolicyParams;

pub const ENV_GATEWAY_URL: &str = "FINOPS_GATEWAY_URL";
pub const ENV_GATEWAY_API_KEY: &str = "FINOPS_GATEWAY_API_KEY";
pub const ENV_MODEL: &str = "FINOPS_MODEL";
pub const ENV_TIMEZONE: &str = "FINOPS_TIMEZONE";
pub const ENV_OUTPUT_DIR: &str = "FINOPS_OUTPUT_DIR";
pub const ENV_TELEMETRY: &str = "FINOPS_TELEMETRY";

/// Connection settings for the chat-completions gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    /// Findings JSON is appended after the report, so this must leave room for both.
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// First delay between retries of a transient failure; doubles per retry.
    pub retry_initial_delay_ms: u64,
    pub retry_max_delay_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000/v1".to_string(),
            api_key: "sk-local-any".to_string(),
            model: "grok4-oci".to_string(),
            temperature: 0.0,
            max_tokens: 6000,
            timeout_secs: 120,
            retry_initial_delay_ms: 500,
            retry_max_delay_ms: 8000,
        }
    }
}

/// Whether the gateway may log and tag this tool's requests.
///
/// Passed explicitly to [`GatewayBackend::new`](crate::agent::GatewayBackend::new);
/// nothing reads or writes process environment at request time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub enabled: bool,
}

/// Everything a policy run needs besides the month and the backend choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinopsConfig {
    pub timezone: String,
    pub output_dir: PathBuf,
    pub gateway: GatewayConfig,
    pub telemetry: TelemetryConfig,
    pub policies: PolicyParams,
}

impl Default for FinopsConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            output_dir: PathBuf::from("reports"),
            gateway: GatewayConfig::default(),
            telemetry: TelemetryConfig::default(),
            policies: PolicyParams::default(),
        }
    }
}

impl FinopsConfig {
    /// Defaults, overlaid with `path` (if any), then the process environment,
    /// then `overrides` (the CLI's flags). The result is validated.
    pub fn load<F>(path: Option<&Path>, overrides: F) -> Result<Self, ConfigError>
    where
        F: FnOnce(&mut Self),
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay values found through `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty(ENV_GATEWAY_URL) {
            self.gateway.base_url = v;
        }
        if let Some(v) = non_empty(ENV_GATEWAY_API_KEY) {
            self.gateway.api_key = v;
        }
        if let Some(v) = non_empty(ENV_MODEL) {
            self.gateway.model = v;
        }
        if let Some(v) = non_empty(ENV_TIMEZONE) {
            self.timezone = v;
        }
        if let Some(v) = non_empty(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = non_empty(ENV_TELEMETRY) {
            self.telemetry.enabled = parse_flag(ENV_TELEMETRY, &v)?;
        }
        Ok(())
    }

    /// Reject settings that would only fail later, mid-run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_timezone(&self.timezone).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let base_url = self.gateway.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::Invalid("gateway.base_url is empty".to_string()));
        }
        match Url::parse(base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::Invalid(format!(
                    "gateway.base_url '{base_url}' has unsupported scheme '{}'",
                    url.scheme()
                )))
            }
            Err(e) => {
                return Err(ConfigError::Invalid(format!(
                    "gateway.base_url '{base_url}' is not a URL: {e}"
                )))
            }
        }
        if !(0.0..=2.0).contains(&self.gateway.temperature) {
            return Err(ConfigError::Invalid(format!(
                "gateway.temperature {} is outside 0.0-2.0",
                self.gateway.temperature
            )));
        }
        if self.gateway.max_tokens == 0 {
            return Err(ConfigError::Invalid("gateway.max_tokens must be positive".to_string()));
        }
        self.policies.validate()
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid(format!("{key}={other} is not a boolean"))),
    }
}

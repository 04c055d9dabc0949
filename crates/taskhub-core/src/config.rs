use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, anyhow};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::datetime::parse_timezone;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const API_URL_ENV_VAR: &str = "TASKHUB_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastSection {
    pub show_delay_ms: u64,
    pub display_ms: u64,
}

impl Default for ToastSection {
    fn default() -> Self {
        Self {
            show_delay_ms: 100,
            display_ms: 3_000,
        }
    }
}

/// Client settings shared by every front-end.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiSection,
    pub display: DisplaySection,
    pub toast: ToastSection,
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

impl ClientConfig {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("failed to parse client config")
    }

    /// Reads `path` when it exists; a missing file yields the defaults.
    #[tracing::instrument]
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            debug!("no config path; using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            warn!(path = %path.display(), "config file not found; using defaults");
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut cfg = Self::from_toml_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        cfg.loaded_from = Some(path.to_path_buf());
        info!(path = %path.display(), "loaded client config");
        Ok(cfg)
    }

    /// Applies dotted `section.key=value` overrides on top of the file.
    #[tracing::instrument(skip(self, overrides))]
    pub fn apply_overrides<I>(&mut self, overrides: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in overrides {
            let key = key.strip_prefix("rc.").unwrap_or(&key).to_string();
            debug!(key = %key, value = %value, "applying override");

            match key.as_str() {
                "api.base_url" => self.api.base_url = value,
                "display.timezone" => {
                    self.display.timezone = if value.trim().is_empty() {
                        None
                    } else {
                        Some(value)
                    }
                }
                "toast.show_delay_ms" => self.toast.show_delay_ms = parse_millis(&key, &value)?,
                "toast.display_ms" => self.toast.display_ms = parse_millis(&key, &value)?,
                other => return Err(anyhow!("unknown config key: {other}")),
            }
        }

        Ok(())
    }

    /// Base URL without a trailing slash.
    pub fn api_base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }

    /// Display zone; unknown names fall back to UTC.
    pub fn timezone(&self) -> Tz {
        match self.display.timezone.as_deref() {
            Some(name) => parse_timezone(name).unwrap_or_else(|| {
                warn!(timezone = name, "unknown timezone; using UTC");
                Tz::UTC
            }),
            None => Tz::UTC,
        }
    }

    pub fn toast_show_delay(&self) -> Duration {
        Duration::from_millis(self.toast.show_delay_ms)
    }

    pub fn toast_display_duration(&self) -> Duration {
        Duration::from_millis(self.toast.display_ms)
    }
}

fn parse_millis(key: &str, value: &str) -> anyhow::Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{key} expects milliseconds, got: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_server() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.api_base_url(), "http://127.0.0.1:8000/api");
        assert_eq!(cfg.timezone(), Tz::UTC);
        assert_eq!(cfg.toast_show_delay(), Duration::from_millis(100));
        assert_eq!(cfg.toast_display_duration(), Duration::from_secs(3));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = ClientConfig::from_toml_str(
            "[api]\nbase_url = \"https://tasks.example.com/api/\"\n\n[display]\ntimezone = \"Europe/Berlin\"\n",
        )
        .expect("parse config");

        assert_eq!(cfg.api_base_url(), "https://tasks.example.com/api");
        assert_eq!(cfg.timezone(), chrono_tz::Europe::Berlin);
        assert_eq!(cfg.toast.display_ms, 3_000);
    }

    #[test]
    fn overrides_apply_and_reject_unknown_keys() {
        let mut cfg = ClientConfig::default();
        cfg.apply_overrides([
            (
                "rc.api.base_url".to_string(),
                "http://10.0.0.2/api".to_string(),
            ),
            ("toast.display_ms".to_string(), "5000".to_string()),
        ])
        .expect("apply overrides");
        assert_eq!(cfg.api_base_url(), "http://10.0.0.2/api");
        assert_eq!(cfg.toast.display_ms, 5_000);

        assert!(
            cfg.apply_overrides([("api.retries".to_string(), "3".to_string())])
                .is_err()
        );
        assert!(
            cfg.apply_overrides([("toast.display_ms".to_string(), "soon".to_string())])
                .is_err()
        );
    }

    #[test]
    fn unknown_timezone_falls_back_to_utc() {
        let mut cfg = ClientConfig::default();
        cfg.display.timezone = Some("Mars/Olympus".to_string());
        assert_eq!(cfg.timezone(), Tz::UTC);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = ClientConfig::load(Some(Path::new("/nonexistent/taskhub/config.toml")))
            .expect("load defaults");
        assert_eq!(cfg, ClientConfig::default());
    }
}

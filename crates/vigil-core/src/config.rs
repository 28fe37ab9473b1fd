//! Monitor configuration parser.
//!
//! The file is JSON unless its extension is `.toml`. The upper-case keys of
//! the legacy `config.json` layout (`HEALTH_URLS`, `SLACK_WEBHOOK_URL`,
//! `INTERVAL_SECONDS`) are accepted as aliases.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::types::Target;

pub const DEFAULT_INTERVAL_SECONDS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Endpoints to poll, in declaration order.
    #[serde(alias = "HEALTH_URLS")]
    pub targets: Vec<Target>,
    /// Webhook receiving alert notifications.
    #[serde(alias = "SLACK_WEBHOOK_URL", alias = "webhookURL")]
    pub webhook_url: String,
    #[serde(
        default = "default_interval",
        alias = "INTERVAL_SECONDS",
        alias = "intervalSeconds"
    )]
    pub interval_seconds: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default)]
    pub tls: TlsSettings,
    #[serde(default)]
    pub notifier: NotifierSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsSettings {
    /// Accept any server certificate. Only for endpoints with self-signed
    /// or otherwise unverifiable certificates.
    #[serde(default)]
    pub insecure: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifierSettings {
    /// UTC offset used when rendering alert timestamps.
    #[serde(default)]
    pub timezone_offset_minutes: i32,
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL_SECONDS
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECONDS
}

/// On-disk encoding of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

impl MonitorConfig {
    /// Read, parse and validate a config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, ConfigFormat::from_path(path))
    }

    /// Parse and validate config text.
    pub fn parse(content: &str, format: ConfigFormat) -> ConfigResult<Self> {
        let config: MonitorConfig = match format {
            ConfigFormat::Json => {
                serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            ConfigFormat::Toml => {
                toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.webhook_url.trim().is_empty() {
            return Err(ConfigError::Invalid("webhook_url is empty".to_string()));
        }
        check_http_url(&self.webhook_url)
            .map_err(|reason| ConfigError::Invalid(format!("webhook_url: {reason}")))?;

        if self.interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "interval_seconds must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_seconds must be greater than zero".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            if target.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "target with url '{}' has an empty name",
                    target.url
                )));
            }
            if !seen.insert(target.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate target name '{}'",
                    target.name
                )));
            }
            check_http_url(&target.url).map_err(|reason| {
                ConfigError::Invalid(format!("target '{}': {reason}", target.name))
            })?;
        }

        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Check that `url` is an absolute `http://` or `https://` URL with a host.
pub fn check_http_url(url: &str) -> Result<(), String> {
    let uri: http::Uri = url.parse().map_err(|e| format!("invalid url '{url}': {e}"))?;
    match uri.scheme_str() {
        Some("http") | Some("https") => {}
        Some(other) => return Err(format!("unsupported scheme '{other}' in '{url}'")),
        None => return Err(format!("missing scheme in '{url}'")),
    }
    if uri.host().is_none_or(str::is_empty) {
        return Err(format!("missing host in '{url}'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "targets": [
            { "name": "api", "url": "https://api.example.com/health" },
            { "name": "web", "url": "http://10.0.0.5:8080/health" }
        ],
        "webhook_url": "https://hooks.slack.com/services/T000/B000/XXXX",
        "interval_seconds": 30
    }"#;

    #[test]
    fn parse_json() {
        let config = MonitorConfig::parse(JSON, ConfigFormat::Json).unwrap();
        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets[0].name, "api");
        assert_eq!(config.interval(), Duration::from_secs(30));
        assert_eq!(config.request_timeout_seconds, DEFAULT_REQUEST_TIMEOUT_SECONDS);
        assert!(!config.tls.insecure);
    }

    #[test]
    fn parse_legacy_keys() {
        let legacy = r#"{
            "HEALTH_URLS": [{ "name": "api", "url": "https://api.example.com/health" }],
            "SLACK_WEBHOOK_URL": "https://hooks.slack.com/services/T000/B000/XXXX"
        }"#;
        let config = MonitorConfig::parse(legacy, ConfigFormat::Json).unwrap();
        assert_eq!(config.targets[0].url, "https://api.example.com/health");
        assert_eq!(config.interval_seconds, DEFAULT_INTERVAL_SECONDS);
    }

    #[test]
    fn parse_toml() {
        let toml_str = r#"
webhook_url = "https://hooks.example.com/alert"
interval_seconds = 15

[tls]
insecure = true

[notifier]
timezone_offset_minutes = 540

[[targets]]
name = "api"
url = "https://api.example.com/health"
"#;
        let config = MonitorConfig::parse(toml_str, ConfigFormat::Toml).unwrap();
        assert_eq!(config.targets.len(), 1);
        assert!(config.tls.insecure);
        assert_eq!(config.notifier.timezone_offset_minutes, 540);
    }

    #[test]
    fn missing_targets_is_parse_error() {
        let err = MonitorConfig::parse(
            r#"{ "webhook_url": "https://hooks.example.com/x" }"#,
            ConfigFormat::Json,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_webhook_is_parse_error() {
        let err = MonitorConfig::parse(r#"{ "targets": [] }"#, ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn empty_webhook_is_invalid() {
        let err = MonitorConfig::parse(
            r#"{ "targets": [], "webhook_url": "" }"#,
            ConfigFormat::Json,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_interval_is_invalid() {
        let err = MonitorConfig::parse(
            r#"{ "targets": [], "webhook_url": "https://h.example.com/x", "interval_seconds": 0 }"#,
            ConfigFormat::Json,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn duplicate_target_names_are_invalid() {
        let err = MonitorConfig::parse(
            r#"{
                "targets": [
                    { "name": "api", "url": "https://a.example.com/health" },
                    { "name": "api", "url": "https://b.example.com/health" }
                ],
                "webhook_url": "https://h.example.com/x"
            }"#,
            ConfigFormat::Json,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate target name"));
    }

    #[test]
    fn non_http_target_is_invalid() {
        let err = MonitorConfig::parse(
            r#"{
                "targets": [{ "name": "api", "url": "ftp://a.example.com/health" }],
                "webhook_url": "https://h.example.com/x"
            }"#,
            ConfigFormat::Json,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("vigil.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("config.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Json);
    }

    #[test]
    fn http_url_checks() {
        assert!(check_http_url("https://example.com/health").is_ok());
        assert!(check_http_url("http://127.0.0.1:8080").is_ok());
        assert!(check_http_url("/relative/path").is_err());
        assert!(check_http_url("not a url").is_err());
    }
}

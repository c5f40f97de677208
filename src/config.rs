use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 1500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must use http:// or https:// and include a host, got {value:?}")]
    InvalidBaseUrl { key: &'static str, value: String },
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("cannot locate a home directory; set VISITCARDS_SESSION_FILE")]
    NoSessionPath,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub timeout: Duration,
    pub page_size: u32,
    pub redirect_delay: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), dirs::home_dir())
    }

    /// Builds the config from an arbitrary key lookup and home directory so
    /// tests do not have to touch the process environment.
    pub fn from_lookup<F>(lookup: F, home: Option<PathBuf>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_base_url = match get("VISITCARDS_API_URL") {
            Some(raw) => normalize_base_url("VISITCARDS_API_URL", &raw)?,
            None => DEFAULT_API_URL.to_string(),
        };

        let session_file = match get("VISITCARDS_SESSION_FILE") {
            Some(path) => PathBuf::from(path),
            None => home
                .map(|home| home.join(".visitcards").join("session.json"))
                .ok_or(ConfigError::NoSessionPath)?,
        };

        let timeout_secs = parse_positive(
            "VISITCARDS_TIMEOUT_SECS",
            get("VISITCARDS_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?;
        let page_size = parse_positive(
            "VISITCARDS_PAGE_SIZE",
            get("VISITCARDS_PAGE_SIZE"),
            u64::from(DEFAULT_PAGE_SIZE),
        )?;
        let page_size = u32::try_from(page_size).map_err(|_| ConfigError::InvalidNumber {
            key: "VISITCARDS_PAGE_SIZE",
            value: page_size.to_string(),
        })?;
        let redirect_delay_ms = match get("VISITCARDS_REDIRECT_DELAY_MS") {
            // zero is allowed here: it disables the pause after a success message
            Some(raw) => raw.parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                key: "VISITCARDS_REDIRECT_DELAY_MS",
                value: raw,
            })?,
            None => DEFAULT_REDIRECT_DELAY_MS,
        };

        Ok(Self {
            api_base_url,
            session_file,
            timeout: Duration::from_secs(timeout_secs),
            page_size,
            redirect_delay: Duration::from_millis(redirect_delay_ms),
        })
    }
}

fn parse_positive(key: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => match value.parse::<u64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::InvalidNumber { key, value }),
        },
    }
}

pub fn normalize_base_url(key: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let invalid = || ConfigError::InvalidBaseUrl {
        key,
        value: raw.to_string(),
    };
    let parsed = reqwest::Url::parse(trimmed).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https")
        || parsed.host_str().map_or(true, str::is_empty)
        || parsed.query().is_some()
        || parsed.fragment().is_some()
    {
        return Err(invalid());
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned(), None)
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AppConfig::from_lookup(|_| None, Some(PathBuf::from("/home/acme"))).unwrap();
        assert_eq!(cfg.api_base_url, DEFAULT_API_URL);
        assert_eq!(
            cfg.session_file,
            PathBuf::from("/home/acme/.visitcards/session.json")
        );
        assert_eq!(cfg.page_size, 10);
        assert_eq!(cfg.timeout, Duration::from_secs(15));
        assert_eq!(cfg.redirect_delay, Duration::from_millis(1500));
    }

    #[test]
    fn base_url_is_trimmed_and_checked() {
        let cfg = config_from(&[
            ("VISITCARDS_API_URL", " https://cards.example.com/ "),
            ("VISITCARDS_SESSION_FILE", "/tmp/s.json"),
        ])
        .unwrap();
        assert_eq!(cfg.api_base_url, "https://cards.example.com");

        let err = config_from(&[
            ("VISITCARDS_API_URL", "cards.example.com"),
            ("VISITCARDS_SESSION_FILE", "/tmp/s.json"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn malformed_base_urls_are_rejected() {
        for raw in [
            "http://exa mple.com",
            "http://[::1",
            "https://?x",
            "http://#frag",
            "ftp://cards.example.com",
            "file:///tmp/api",
            "https://cards.example.com/?page=1",
        ] {
            assert_eq!(
                normalize_base_url("VISITCARDS_API_URL", raw),
                Err(ConfigError::InvalidBaseUrl {
                    key: "VISITCARDS_API_URL",
                    value: raw.to_string()
                }),
                "{raw}"
            );
        }
        assert_eq!(
            normalize_base_url("VISITCARDS_API_URL", "http://127.0.0.1:8080/backend/").unwrap(),
            "http://127.0.0.1:8080/backend"
        );
    }

    #[test]
    fn numbers_must_be_positive() {
        let err = config_from(&[
            ("VISITCARDS_SESSION_FILE", "/tmp/s.json"),
            ("VISITCARDS_PAGE_SIZE", "0"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                key: "VISITCARDS_PAGE_SIZE",
                value: "0".into()
            }
        );

        let cfg = config_from(&[
            ("VISITCARDS_SESSION_FILE", "/tmp/s.json"),
            ("VISITCARDS_REDIRECT_DELAY_MS", "0"),
        ])
        .unwrap();
        assert_eq!(cfg.redirect_delay, Duration::ZERO);
    }

    #[test]
    fn missing_home_without_session_file_is_an_error() {
        assert_eq!(config_from(&[]).unwrap_err(), ConfigError::NoSessionPath);
    }

    #[test]
    fn session_path_ignores_home_variable() {
        // only the injected home directory counts, not a HOME key in the lookup
        let cfg = AppConfig::from_lookup(
            |key| (key == "HOME").then(|| "/elsewhere".to_string()),
            Some(PathBuf::from("/users/ann")),
        )
        .unwrap();
        assert_eq!(
            cfg.session_file,
            PathBuf::from("/users/ann/.visitcards/session.json")
        );
    }
}

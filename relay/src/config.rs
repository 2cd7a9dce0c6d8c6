//! Configuration loading.
//!
//! The relay reads its VAPID credentials and server settings once at startup
//! and hands the resulting [`Config`] to the HTTP handlers as a value. A JSON
//! file may supply defaults; environment variables override the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::{fmt, fs};

use crate::constants::{
    DEFAULT_LISTEN_ADDR, DEFAULT_PUSH_REQUEST_TIMEOUT, DEFAULT_PUSH_TTL_SECS,
    DEFAULT_VAPID_SUBJECT,
};
use crate::notifications::vapid::VapidCredentials;

/// Environment variable holding the base64url VAPID public key.
pub const ENV_VAPID_PUBLIC_KEY: &str = "VAPID_PUBLIC_KEY";
/// Environment variable holding the base64url VAPID private key.
pub const ENV_VAPID_PRIVATE_KEY: &str = "VAPID_PRIVATE_KEY";
/// Environment variable holding the VAPID contact subject.
pub const ENV_VAPID_SUBJECT: &str = "VAPID_EMAIL";
/// Environment variable overriding the bind address.
pub const ENV_LISTEN: &str = "PUSH_RELAY_LISTEN";
/// Environment variable overriding the push TTL in seconds.
pub const ENV_TTL: &str = "PUSH_RELAY_TTL";
/// Environment variable overriding the upstream request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "PUSH_RELAY_TIMEOUT_SECS";

/// Configuration for the relay.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Config {
    /// Address `serve` binds to.
    pub listen_addr: SocketAddr,
    /// VAPID signing credentials.
    pub vapid: VapidConfig,
    /// TTL in seconds the push service keeps an undelivered message.
    pub ttl_secs: u32,
    /// Timeout in seconds for the request to the push service.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 8787))),
            vapid: VapidConfig::default(),
            ttl_secs: DEFAULT_PUSH_TTL_SECS,
            request_timeout_secs: DEFAULT_PUSH_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

/// VAPID key material as configured by the operator.
///
/// Every field is optional here; [`VapidConfig::credentials`] decides whether
/// the set is usable.
#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct VapidConfig {
    /// Base64url uncompressed P-256 public key.
    pub public_key: Option<String>,
    /// Base64url raw P-256 private scalar. Never serialized back out.
    #[serde(skip_serializing)]
    pub private_key: Option<String>,
    /// Contact subject (`mailto:` or `https:` URI).
    pub subject: Option<String>,
}

impl fmt::Debug for VapidConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VapidConfig")
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key.as_ref().map(|_| "***"))
            .field("subject", &self.subject)
            .finish()
    }
}

impl VapidConfig {
    /// Resolve the credential set, or `None` if either key is missing.
    ///
    /// Empty strings count as missing. A missing subject falls back to
    /// [`DEFAULT_VAPID_SUBJECT`] instead of failing.
    pub fn credentials(&self) -> Option<VapidCredentials> {
        let public_key = non_empty(self.public_key.as_deref())?;
        let private_key = non_empty(self.private_key.as_deref())?;
        let subject = non_empty(self.subject.as_deref()).unwrap_or(DEFAULT_VAPID_SUBJECT);

        Some(VapidCredentials::new(public_key, private_key, subject))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Config {
    /// Loads configuration from an optional JSON file, then applies
    /// environment variable overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Builds configuration from defaults plus an arbitrary variable lookup.
    ///
    /// Tests pass a closure over a map here instead of mutating the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        config.apply_overrides(lookup);
        config
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(public_key) = lookup(ENV_VAPID_PUBLIC_KEY) {
            self.vapid.public_key = Some(public_key);
        }

        if let Some(private_key) = lookup(ENV_VAPID_PRIVATE_KEY) {
            self.vapid.private_key = Some(private_key);
        }

        if let Some(subject) = lookup(ENV_VAPID_SUBJECT) {
            self.vapid.subject = Some(subject);
        }

        if let Some(listen) = lookup(ENV_LISTEN) {
            match listen.parse::<SocketAddr>() {
                Ok(addr) => self.listen_addr = addr,
                Err(e) => log::warn!("[Config] Ignoring {ENV_LISTEN}={listen:?}: {e}"),
            }
        }

        if let Some(ttl) = lookup(ENV_TTL) {
            match ttl.parse::<u32>() {
                Ok(ttl) => self.ttl_secs = ttl,
                Err(e) => log::warn!("[Config] Ignoring {ENV_TTL}={ttl:?}: {e}"),
            }
        }

        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            match timeout.parse::<u64>() {
                Ok(timeout) => self.request_timeout_secs = timeout,
                Err(e) => log::warn!("[Config] Ignoring {ENV_TIMEOUT_SECS}={timeout:?}: {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_any_variables() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.listen_addr.port(), 8787);
        assert_eq!(config.ttl_secs, DEFAULT_PUSH_TTL_SECS);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.vapid.credentials().is_none());
    }

    #[test]
    fn test_credentials_resolved_from_variables() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_VAPID_PUBLIC_KEY, "pub"),
            (ENV_VAPID_PRIVATE_KEY, "priv"),
            (ENV_VAPID_SUBJECT, "mailto:ops@example.com"),
        ]));

        let creds = config.vapid.credentials().expect("both keys present");
        assert_eq!(creds.public_key(), "pub");
        assert_eq!(creds.private_key(), "priv");
        assert_eq!(creds.subject(), "mailto:ops@example.com");
    }

    #[test]
    fn test_missing_subject_defaults_to_placeholder() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_VAPID_PUBLIC_KEY, "pub"),
            (ENV_VAPID_PRIVATE_KEY, "priv"),
        ]));

        let creds = config.vapid.credentials().expect("both keys present");
        assert_eq!(creds.subject(), DEFAULT_VAPID_SUBJECT);
    }

    #[test]
    fn test_either_key_missing_yields_no_credentials() {
        let only_public = Config::from_lookup(lookup_from(&[(ENV_VAPID_PUBLIC_KEY, "pub")]));
        assert!(only_public.vapid.credentials().is_none());

        let only_private = Config::from_lookup(lookup_from(&[(ENV_VAPID_PRIVATE_KEY, "priv")]));
        assert!(only_private.vapid.credentials().is_none());
    }

    #[test]
    fn test_empty_key_counts_as_missing() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_VAPID_PUBLIC_KEY, "pub"),
            (ENV_VAPID_PRIVATE_KEY, "  "),
        ]));
        assert!(config.vapid.credentials().is_none());
    }

    #[test]
    fn test_invalid_numeric_overrides_are_ignored() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_TTL, "soon"),
            (ENV_LISTEN, "not-an-addr"),
            (ENV_TIMEOUT_SECS, "5"),
        ]));
        assert_eq!(config.ttl_secs, DEFAULT_PUSH_TTL_SECS);
        assert_eq!(config.listen_addr.port(), 8787);
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_load_from_file_then_env_override() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("relay.json");
        fs::write(
            &path,
            r#"{"listen_addr": "127.0.0.1:9000", "ttl_secs": 60, "vapid": {"subject": "mailto:file@example.com"}}"#,
        )
        .expect("write config");

        let mut config = Config::load_from_file(&path).expect("load config file");
        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.ttl_secs, 60);
        // Unspecified fields keep their defaults
        assert_eq!(config.request_timeout_secs, 30);

        config.apply_overrides(lookup_from(&[(ENV_VAPID_SUBJECT, "mailto:env@example.com")]));
        assert_eq!(config.vapid.subject.as_deref(), Some("mailto:env@example.com"));
    }

    #[test]
    fn test_private_key_not_serialized_or_debug_printed() {
        let config = Config::from_lookup(lookup_from(&[(ENV_VAPID_PRIVATE_KEY, "secret-scalar")]));

        let json = serde_json::to_string(&config).expect("serialize");
        assert!(!json.contains("secret-scalar"));

        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-scalar"));
    }
}

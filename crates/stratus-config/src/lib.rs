//! Configuration resolution for Stratus.
//!
//! Resolves portal connection parameters from multiple sources with
//! precedence: CLI flags > environment variables > config file > defaults.
//! Two environment namings are accepted, the namespaced `STRATUS_*` keys
//! and the flat legacy `PORTAL_ADDR`/`PORTAL_USER`/`PORTAL_PASS` triple,
//! both normalized into one record. Resolution is a pure read: the password
//! lives only in process memory and is never echoed anywhere.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use stratus_types::{ConfigError, Credentials, Scope, Secret};

/// Default portal HTTPS port.
pub const DEFAULT_PORT: u16 = 443;

/// Default per-request timeout for portal calls.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Fully resolved configuration for one server instance.
#[derive(Debug, Clone)]
pub struct StratusConfig {
    pub credentials: Credentials,
    /// Bounded wait for each portal call.
    pub timeout_ms: u64,
}

/// The `[portal]` table of an optional TOML settings file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub portal: PortalSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortalSettings {
    pub scope: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub ssl: Option<bool>,
    pub timeout_ms: Option<u64>,
}

/// CLI overrides that take highest precedence.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub scope: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub ssl: Option<bool>,
    pub timeout_ms: Option<u64>,
}

impl StratusConfig {
    /// Resolve configuration from all sources.
    ///
    /// `env` is a snapshot of the process environment, injected so
    /// resolution stays a pure function of its inputs.
    pub fn resolve(
        overrides: CliOverrides,
        env: &HashMap<String, String>,
        settings_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let settings = match settings_path {
            Some(path) => load_settings_file(path)?,
            None => SettingsFile::default(),
        };
        let portal = settings.portal;

        let host = overrides
            .host
            .or_else(|| env_value(env, "STRATUS_HOST"))
            .or_else(|| env_value(env, "PORTAL_ADDR"))
            .or(portal.host)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| missing("host (set STRATUS_HOST or PORTAL_ADDR)"))?;

        let user = overrides
            .user
            .or_else(|| env_value(env, "STRATUS_USER"))
            .or_else(|| env_value(env, "PORTAL_USER"))
            .or(portal.user)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| missing("user (set STRATUS_USER or PORTAL_USER)"))?;

        let password = overrides
            .password
            .or_else(|| env_value(env, "STRATUS_PASSWORD"))
            .or_else(|| env_value(env, "PORTAL_PASS"))
            .or(portal.password)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| missing("password (set STRATUS_PASSWORD or PORTAL_PASS)"))?;

        let scope = overrides
            .scope
            .or_else(|| env_value(env, "STRATUS_SCOPE"))
            .or(portal.scope)
            .map(|raw| {
                raw.parse::<Scope>().map_err(|e| ConfigError::InvalidValue {
                    key: "scope".into(),
                    message: e,
                })
            })
            .transpose()?
            .unwrap_or(Scope::User);

        let tls = overrides
            .ssl
            .map(Ok)
            .or_else(|| env_value(env, "STRATUS_SSL").map(|raw| parse_bool("ssl", &raw)))
            .or(portal.ssl.map(Ok))
            .transpose()?
            .unwrap_or(true);

        let port = overrides
            .port
            .map(Ok)
            .or_else(|| {
                env_value(env, "STRATUS_PORT").map(|raw| {
                    raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                        key: "port".into(),
                        message: e.to_string(),
                    })
                })
            })
            .or(portal.port.map(Ok))
            .transpose()?
            .unwrap_or(DEFAULT_PORT);

        let timeout_ms = overrides
            .timeout_ms
            .or(portal.timeout_ms)
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Ok(StratusConfig {
            credentials: Credentials {
                host,
                port,
                user,
                password: Secret::new(password),
                scope,
                tls,
            },
            timeout_ms,
        })
    }
}

fn env_value(env: &HashMap<String, String>, key: &str) -> Option<String> {
    env.get(key).filter(|v| !v.is_empty()).cloned()
}

fn missing(key: &str) -> ConfigError {
    ConfigError::MissingKey { key: key.into() }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.into(),
            message: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

/// Load and parse the TOML settings file. A missing file is fine (all keys
/// can come from the environment); a malformed one is a hard error.
fn load_settings_file(path: &Path) -> Result<SettingsFile, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No settings file at {}", path.display());
            Ok(SettingsFile::default())
        }
        Err(e) => Err(ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
    }
}

//! Configuration for the LoRaHub server.
//!
//! TOML file + `LORAHUB_`-prefixed environment overrides, credential
//! resolution (env + plaintext), and translation of configured network
//! profiles to `lorahub_core::Network`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use lorahub_api::{TlsMode, TransportConfig};
use lorahub_core::{Network, ProtocolVersion};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for network '{network}'")]
    NoCredentials { network: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,

    /// Named network servers to synchronize with.
    #[serde(default)]
    pub networks: HashMap<String, NetworkProfile>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ServerSettings {
    /// Socket address the HTTP server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Public base URL of this server, as reachable by the remote
    /// network servers. Handed out in http integrations, so it must
    /// resolve from their side.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Name of the operating company. Registered as the first (and
    /// owning) company at startup; pulled organizations attach to it.
    #[serde(default = "default_operator")]
    pub operator: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_base_url: default_public_base_url(),
            operator: default_operator(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3200".into()
}
fn default_public_base_url() -> String {
    "http://localhost:3200".into()
}
fn default_operator() -> String {
    "LPWAN Operator".into()
}

/// A named network server profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct NetworkProfile {
    /// Base URL of the remote network server (e.g. "https://lora.example:8080").
    pub base_url: String,

    /// Remote API family: "1.0" or "2.0".
    #[serde(default = "default_version")]
    pub version: String,

    /// Admin username on the remote.
    pub username: String,

    /// Password (plaintext — prefer `password_env`).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Disabled networks accept no pushes and send no downlinks.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept invalid TLS certificates (self-signed test servers).
    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,
}

fn default_version() -> String {
    "1.0".into()
}
fn default_enabled() -> bool {
    true
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
///
/// Environment variables use the `LORAHUB_` prefix with `__` as the
/// nesting separator, e.g. `LORAHUB_SERVER__BIND=127.0.0.1:9000`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LORAHUB_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// The default config file path: `$LORAHUB_CONFIG` or `lorahub.toml`
/// in the working directory.
pub fn config_path() -> PathBuf {
    std::env::var("LORAHUB_CONFIG").map_or_else(|_| PathBuf::from("lorahub.toml"), PathBuf::from)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a network's password: named env var first, then plaintext.
pub fn resolve_password(profile: &NetworkProfile, name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Some(ref password) = profile.password {
        return Ok(SecretString::from(password.clone()));
    }

    Err(ConfigError::NoCredentials {
        network: name.into(),
    })
}

// ── Network resolution ──────────────────────────────────────────────

/// Build a `Network` and its transport settings from a profile.
///
/// `network_type_id` and `network_protocol_id` are assigned by the
/// caller; every LoRa network shares one network type, and the id pair
/// namespaces the network's protocol data.
pub fn profile_to_network(
    profile: &NetworkProfile,
    name: &str,
    network_type_id: Uuid,
    network_protocol_id: Uuid,
) -> Result<(Network, TransportConfig), ConfigError> {
    let _: url::Url = profile
        .base_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: format!("networks.{name}.base_url"),
            reason: format!("invalid URL: {}", profile.base_url),
        })?;

    let version = match profile.version.as_str() {
        "1.0" => ProtocolVersion::V1,
        "2.0" => ProtocolVersion::V2,
        other => {
            return Err(ConfigError::Validation {
                field: format!("networks.{name}.version"),
                reason: format!("expected '1.0' or '2.0', got '{other}'"),
            });
        }
    };

    let password = resolve_password(profile, name)?;

    let tls = if profile.insecure {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let network = Network {
        id: Uuid::new_v4(),
        network_type_id,
        network_protocol_id,
        name: name.to_owned(),
        enabled: profile.enabled,
        base_url: profile.base_url.clone(),
        version,
        username: profile.username.clone(),
        password,
    };
    let transport = TransportConfig {
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(30)),
    };
    Ok((network, transport))
}

//! Configuration for the roster CLI and any other embedding.
//!
//! TOML file at the platform config dir, overlaid with `ROSTER_`-prefixed
//! environment variables (`ROSTER_API__URL`, `ROSTER_PLACES__API_KEY`, ...),
//! translated into `roster_core::AppConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use roster_core::config::{DEFAULT_SCRIPT_URL, DEFAULT_USERS_URL};
use roster_core::{AppConfig, CredentialPolicy, PlacesConfig, StoreConfig, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

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
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub places: PlacesSection,

    #[serde(default)]
    pub defaults: Defaults,
}

/// The users collection endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiSection {
    /// Collection URL.
    #[serde(default = "default_users_url")]
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Path to an extra CA certificate.
    pub ca_cert: Option<PathBuf>,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            url: default_users_url(),
            timeout: default_timeout(),
            ca_cert: None,
        }
    }
}

/// The maps script.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlacesSection {
    /// API key (plaintext; prefer `api_key_env`).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    #[serde(default = "default_script_url")]
    pub script_url: String,

    #[serde(default = "default_libraries")]
    pub libraries: Vec<String>,

    /// "join" or "reject".
    #[serde(default)]
    pub credential_policy: CredentialPolicy,
}

impl Default for PlacesSection {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: None,
            script_url: default_script_url(),
            libraries: default_libraries(),
            credential_policy: CredentialPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_users_url() -> String {
    DEFAULT_USERS_URL.into()
}
fn default_script_url() -> String {
    DEFAULT_SCRIPT_URL.into()
}
fn default_libraries() -> Vec<String> {
    vec!["places".into()]
}
fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "roster", "roster").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("roster");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ROSTER_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Resolve the maps key: `api_key_env` lookup first, then plaintext.
pub fn resolve_places_key(places: &PlacesSection) -> Option<SecretString> {
    if let Some(ref env_name) = places.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }
    places.api_key.clone().map(SecretString::from)
}

/// Build the runtime `AppConfig`.
pub fn to_app_config(cfg: &Config) -> Result<AppConfig, ConfigError> {
    let url = parse_url("api.url", &cfg.api.url)?;
    let script_url = parse_url("places.script_url", &cfg.places.script_url)?;

    let tls = match cfg.api.ca_cert {
        Some(ref ca_path) => TlsVerification::CustomCa(ca_path.clone()),
        None => TlsVerification::SystemDefaults,
    };

    Ok(AppConfig {
        store: StoreConfig {
            url,
            tls,
            timeout: Duration::from_secs(cfg.api.timeout),
        },
        places: PlacesConfig {
            script_url,
            api_key: resolve_places_key(&cfg.places),
            libraries: cfg.places.libraries.clone(),
            credential_policy: cfg.places.credential_policy,
        },
    })
}

fn parse_url(field: &str, raw: &str) -> Result<url::Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })
}

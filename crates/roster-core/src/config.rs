// ── Runtime configuration ──
//
// These types describe where the users collection lives and how the maps
// script is requested. They never touch disk: `roster-config` (or any
// embedding UI) builds an `AppConfig` and hands it to `Context::new`.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

/// Default public collection endpoint.
pub const DEFAULT_USERS_URL: &str = "https://jsonplaceholder.typicode.com/users";

/// Default maps script endpoint.
pub const DEFAULT_SCRIPT_URL: &str = "https://maps.googleapis.com/maps/api/js";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store.
    #[default]
    SystemDefaults,
    /// Additional CA certificate file.
    CustomCa(std::path::PathBuf),
}

/// What `init` does when asked for a key different from the one already
/// loading or loaded.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CredentialPolicy {
    /// Join the existing attempt; the first key wins.
    #[default]
    Join,
    /// Refuse with `LoadError::CredentialConflict`.
    Reject,
}

/// Where the users collection lives.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Collection URL (e.g. `https://jsonplaceholder.typicode.com/users`).
    pub url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_USERS_URL).expect("default users URL is valid"),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// How the maps script is requested.
#[derive(Debug, Clone)]
pub struct PlacesConfig {
    /// Script endpoint without query parameters.
    pub script_url: Url,
    /// API key used by `PlacesService::init_configured`.
    pub api_key: Option<SecretString>,
    /// Value of the `libraries` query parameter.
    pub libraries: Vec<String>,
    pub credential_policy: CredentialPolicy,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            script_url: Url::parse(DEFAULT_SCRIPT_URL).expect("default script URL is valid"),
            api_key: None,
            libraries: vec!["places".into()],
            credential_policy: CredentialPolicy::default(),
        }
    }
}

/// Everything `Context::new` needs.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub places: PlacesConfig,
}

// ── Core error types ──
//
// User-facing errors from roster-core. The `Display` text of every variant
// is what the store records as its last error message, so it must read
// well on its own. `From<roster_api::Error>` translates transport-layer
// errors into these variants.

use thiserror::Error;

use crate::loader::LoadError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── External script ──────────────────────────────────────────────
    #[error("Failed to load external script: {0}")]
    LoadFailure(#[from] LoadError),

    // ── Remote collection ────────────────────────────────────────────
    #[error("Remote operation failed (HTTP {status}): {message}")]
    RemoteOperation { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Unexpected response from server: {message}")]
    Decode { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// `true` for every failure of a remote collection call: non-success
    /// status, transport failure, or an undecodable body.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            Self::RemoteOperation { .. } | Self::Network { .. } | Self::Decode { .. }
        )
    }

    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteOperation { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<roster_api::Error> for CoreError {
    fn from(err: roster_api::Error) -> Self {
        match err {
            roster_api::Error::Remote { status, message } => {
                CoreError::RemoteOperation { status, message }
            }
            roster_api::Error::Transport(ref e) => match e.status() {
                Some(status) => CoreError::RemoteOperation {
                    status: status.as_u16(),
                    message: e.to_string(),
                },
                None => CoreError::Network {
                    message: e.to_string(),
                },
            },
            roster_api::Error::Timeout { url } => CoreError::Network {
                message: format!("request to {url} timed out"),
            },
            roster_api::Error::Deserialization { message, body: _ } => {
                CoreError::Decode { message }
            }
            roster_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            roster_api::Error::NotABase(url) => CoreError::Config {
                message: format!("URL cannot be used as a collection base: {url}"),
            },
            roster_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
        }
    }
}

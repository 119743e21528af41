use thiserror::Error;

/// Top-level error type for the `roster-api` crate.
///
/// Covers every failure mode of a collection request: transport,
/// non-success HTTP status, and undecodable bodies. `roster-core` maps
/// these into the errors its store records for the UI.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured base URL cannot carry path segments (e.g. `mailto:`).
    #[error("URL cannot be used as a collection base: {0}")]
    NotABase(String),

    /// The transport timeout elapsed before the server finished answering.
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Remote ──────────────────────────────────────────────────────
    /// The server answered with a non-success status.
    #[error("HTTP error! Status: {status} ({message})")]
    Remote { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            let url = err
                .url()
                .map_or_else(|| "server".to_owned(), ToString::to_string);
            Self::Timeout { url }
        } else {
            Self::Transport(err)
        }
    }
}

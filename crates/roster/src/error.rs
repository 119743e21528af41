//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use roster_config::ConfigError;
use roster_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const REMOTE: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the users collection: {message}")]
    #[diagnostic(
        code(roster::connection_failed),
        help(
            "Check that the endpoint is reachable.\n\
             Override it with --url or api.url in the config file."
        )
    )]
    ConnectionFailed { message: String },

    // ── Remote ───────────────────────────────────────────────────────
    #[error("Server rejected the request (HTTP {status}): {message}")]
    #[diagnostic(code(roster::remote))]
    Remote { status: u16, message: String },

    #[error("Unexpected response from server: {message}")]
    #[diagnostic(
        code(roster::decode),
        help("The endpoint did not return a users collection. Check --url.")
    )]
    Decode { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(roster::not_found),
        help("Run: roster {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(roster::validation))]
    Validation { field: String, reason: String },

    // ── Places ───────────────────────────────────────────────────────
    #[error("No maps API key configured")]
    #[diagnostic(
        code(roster::no_api_key),
        help(
            "Pass --key, set ROSTER_PLACES_KEY, or set places.api_key / \
             places.api_key_env in the config file."
        )
    )]
    NoApiKey,

    #[error("Maps script could not be prepared: {message}")]
    #[diagnostic(code(roster::script))]
    Script { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(roster::config),
        help("Check the config file at: roster config path")
    )]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(roster::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(roster::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::NotFound { .. } | Self::Remote { status: 404, .. } => exit_code::NOT_FOUND,
            Self::Remote { .. } | Self::Decode { .. } => exit_code::REMOTE,
            Self::Validation { .. } | Self::NoApiKey | Self::Json(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Network { message } => CliError::ConnectionFailed { message },

            CoreError::RemoteOperation { status, message } => CliError::Remote { status, message },

            CoreError::Decode { message } => CliError::Decode { message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::LoadFailure(e) => CliError::Script {
                message: e.to_string(),
            },
        }
    }
}

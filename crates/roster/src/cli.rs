//! Clap derive structures for the `roster` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// roster -- manage a remote users collection from the command line
#[derive(Debug, Parser)]
#[command(
    name = "roster",
    version,
    about = "Manage a remote users collection from the command line",
    long_about = "List, create, update and delete users on a JSON collection endpoint\n\
        (jsonplaceholder-compatible by default), and emit the maps script tag\n\
        used by the address autocomplete widget.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Users collection URL (overrides config)
    #[arg(long, short = 'u', env = "ROSTER_URL", global = true)]
    pub url: Option<String>,

    /// Output format (defaults to the config file's `defaults.output`)
    #[arg(long, short = 'o', env = "ROSTER_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, env = "ROSTER_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    /// The selected output format, `table` when neither flag nor config set one.
    pub fn output_format(&self) -> OutputFormat {
        self.output.unwrap_or(OutputFormat::Table)
    }
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage users in the remote collection
    #[command(alias = "u")]
    Users(UsersArgs),

    /// Maps script helpers
    Places(PlacesArgs),

    /// Inspect CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Users ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List all users
    #[command(alias = "ls")]
    List,

    /// Show one user
    Get {
        /// User ID
        id: u64,
    },

    /// Create a user
    Create {
        #[command(flatten)]
        fields: UserFields,

        /// Read the full user payload from a JSON file
        #[arg(long, short = 'F', conflicts_with = "name")]
        from_file: Option<PathBuf>,
    },

    /// Replace a user; unspecified fields keep their current values
    Update {
        /// User ID
        id: u64,

        #[command(flatten)]
        fields: UserFields,

        /// Read the full user payload from a JSON file
        #[arg(long, short = 'F', conflicts_with = "name")]
        from_file: Option<PathBuf>,
    },

    /// Delete a user
    #[command(alias = "rm")]
    Delete {
        /// User ID
        id: u64,
    },
}

/// Individual user fields accepted by create/update.
#[derive(Debug, Default, Args)]
pub struct UserFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long)]
    pub street: Option<String>,
    #[arg(long)]
    pub suite: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub zipcode: Option<String>,
    /// Company name
    #[arg(long)]
    pub company: Option<String>,
}

// ── Places ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PlacesArgs {
    #[command(subcommand)]
    pub command: PlacesCommand,
}

#[derive(Debug, Subcommand)]
pub enum PlacesCommand {
    /// Print the script tag a page would append to load the maps API
    Script {
        /// Maps API key (defaults to the configured key)
        #[arg(long, env = "ROSTER_PLACES_KEY", hide_env_values = true)]
        key: Option<String>,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (secrets redacted)
    Show,
    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

//! Command dispatch: bridges CLI args -> core context -> output formatting.

pub mod config_cmd;
pub mod places;
pub mod users;

use roster_core::Context;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Context used by every network-bound command.
pub type CliContext = Context<places::TagCollector>;

/// Dispatch a context-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &CliContext, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Users(args) => users::handle(ctx, args, global).await,
        Command::Places(args) => places::handle(ctx, &args, global),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not need a context".into(),
        )),
    }
}

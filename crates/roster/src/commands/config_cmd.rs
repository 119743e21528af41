//! Config subcommand handlers.

use roster_config::{Config, ConfigError};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

pub fn handle(args: &ConfigArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let shown = redacted(cfg);
            let toml_str = toml::to_string_pretty(&shown).map_err(ConfigError::from)?;
            let out = output::render_single(
                global.output_format(),
                &shown,
                |_| toml_str.trim_end().to_owned(),
                |_| toml_str.trim_end().to_owned(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&roster_config::config_path().display().to_string(), false);
            Ok(())
        }
    }
}

/// Copy of `cfg` with the plaintext maps key masked.
fn redacted(cfg: &Config) -> Config {
    let mut shown = cfg.clone();
    if shown.places.api_key.is_some() {
        shown.places.api_key = Some(REDACTED.into());
    }
    shown
}

//! Places command handlers.
//!
//! There is no page to append a script to on the command line, so the
//! context is built over a host that just collects the tags it is given.

use std::sync::Mutex;

use secrecy::ExposeSecret;
use serde::Serialize;

use roster_core::{LoadError, ScriptHost, ScriptTag};

use crate::cli::{GlobalOpts, PlacesArgs, PlacesCommand};
use crate::error::CliError;
use crate::output;

use super::CliContext;

// ── Tag-collecting host ─────────────────────────────────────────────

/// `ScriptHost` that records appended tags instead of loading them.
#[derive(Debug, Default)]
pub struct TagCollector {
    tags: Mutex<Vec<ScriptTag>>,
}

impl TagCollector {
    fn take_last(&self) -> Option<ScriptTag> {
        self.tags.lock().ok()?.pop()
    }
}

impl ScriptHost for TagCollector {
    fn append_script(&self, tag: ScriptTag) -> Result<(), LoadError> {
        self.tags
            .lock()
            .map_err(|_| LoadError::Host("tag collector lock poisoned".into()))?
            .push(tag);
        Ok(())
    }
}

// ── Output shape ────────────────────────────────────────────────────

#[derive(Serialize)]
struct ScriptTagView {
    src: String,
    defer: bool,
    callback: String,
}

impl From<ScriptTag> for ScriptTagView {
    fn from(tag: ScriptTag) -> Self {
        Self {
            src: tag.src.into(),
            defer: tag.defer,
            callback: tag.callback,
        }
    }
}

fn html(view: &ScriptTagView) -> String {
    let src = view.src.replace('&', "&amp;");
    let defer = if view.defer { " defer" } else { "" };
    format!("<script src=\"{src}\"{defer}></script>")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(ctx: &CliContext, args: &PlacesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match &args.command {
        PlacesCommand::Script { key } => {
            let places = ctx.places();
            let key = match key {
                Some(key) => key.clone(),
                None => ctx
                    .config()
                    .places
                    .api_key
                    .as_ref()
                    .map(|secret| secret.expose_secret().to_owned())
                    .ok_or(CliError::NoApiKey)?,
            };

            // Nobody will ever report back, so the load stays pending.
            drop(places.init(&key));

            let tag = places
                .loader()
                .host()
                .take_last()
                .ok_or_else(|| CliError::Script {
                    message: "no script tag was produced".into(),
                })?;
            let view = ScriptTagView::from(tag);
            let out = output::render_single(global.output_format(), &view, html, |v| v.src.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

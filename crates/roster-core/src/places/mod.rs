// ── Maps places service ──
//
// The maps script behind a `ScriptLoader`, plus the address-autocomplete
// widget it unlocks once loaded.

mod types;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::mpsc;
use tracing::debug;

use crate::config::PlacesConfig;
use crate::error::CoreError;
use crate::loader::{
    CallbackRegistry, LoadError, LoadFuture, LoadPhase, ScriptHost, ScriptLoader, ScriptSource,
};

pub use types::{
    AddressComponent, AutocompleteOptions, ComponentRestrictions, CountryRestriction, LatLng,
    PlaceDetails, PlaceGeometry, PlaceResult,
};

/// Binds an autocomplete widget to an input field. Browser glue implements
/// this over the loaded script; every place the user selects is sent down
/// `places`.
pub trait AutocompleteHost: Send + Sync {
    fn attach(
        &self,
        input: &str,
        options: &AutocompleteOptions,
        places: mpsc::UnboundedSender<PlaceResult>,
    ) -> Result<(), LoadError>;
}

/// Handle to one attached autocomplete widget.
#[derive(Debug)]
pub struct Autocomplete {
    input: String,
    places: mpsc::UnboundedReceiver<PlaceResult>,
}

impl Autocomplete {
    /// Identifier of the input field the widget is bound to.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Wait for the next selected place. `None` once the widget is gone.
    pub async fn next_place(&mut self) -> Option<PlaceResult> {
        self.places.recv().await
    }

    /// Non-blocking variant of `next_place`.
    pub fn try_next_place(&mut self) -> Option<PlaceResult> {
        self.places.try_recv().ok()
    }
}

/// Maps places script loader. Cloning shares the loader.
pub struct PlacesService<H: ScriptHost> {
    loader: ScriptLoader<H>,
    api_key: Option<SecretString>,
}

impl<H: ScriptHost> Clone for PlacesService<H> {
    fn clone(&self) -> Self {
        Self {
            loader: self.loader.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

impl<H: ScriptHost> PlacesService<H> {
    pub fn new(config: &PlacesConfig, host: H) -> Self {
        let mut source = ScriptSource::new(config.script_url.clone());
        if !config.libraries.is_empty() {
            source = source.with_param("libraries", config.libraries.join(","));
        }
        source = source.with_param("loading", "async");

        Self {
            loader: ScriptLoader::new(host, source, config.credential_policy),
            api_key: config.api_key.clone(),
        }
    }

    /// Load the script with `key`. See `ScriptLoader::init`.
    pub fn init(&self, key: &str) -> LoadFuture {
        self.loader.init(key)
    }

    /// Load the script with the key from configuration.
    pub async fn init_configured(&self) -> Result<bool, CoreError> {
        let Some(key) = &self.api_key else {
            return Err(CoreError::Config {
                message: "no maps API key configured".into(),
            });
        };
        let pending = self.loader.init(key.expose_secret());
        Ok(pending.await?)
    }

    pub fn is_loaded(&self) -> bool {
        self.loader.is_loaded()
    }

    pub fn phase(&self) -> LoadPhase {
        self.loader.phase()
    }

    /// Where the host reports script readiness.
    pub fn callbacks(&self) -> &CallbackRegistry {
        self.loader.callbacks()
    }

    pub fn loader(&self) -> &ScriptLoader<H> {
        &self.loader
    }

    /// Bind an autocomplete widget to `input`. Fails with
    /// `LoadError::NotLoaded` until `init` has resolved.
    pub fn autocomplete<A: AutocompleteHost>(
        &self,
        host: &A,
        input: &str,
        options: &AutocompleteOptions,
    ) -> Result<Autocomplete, LoadError> {
        if !self.is_loaded() {
            return Err(LoadError::NotLoaded);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        host.attach(input, options, tx)?;
        debug!(input, "autocomplete attached");

        Ok(Autocomplete {
            input: input.to_owned(),
            places: rx,
        })
    }
}

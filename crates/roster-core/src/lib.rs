//! Reactive data layer between `roster-api` and UI consumers.
//!
//! This crate owns the client-side state for the roster workspace:
//!
//! - **[`ResourceStore`]**: local mirror of a remote collection resource.
//!   Every operation (`list`, `create`, `update`, `delete`) goes to the
//!   server first and only then touches the local collection. Loading and
//!   error bookkeeping is published through a `watch` channel
//!   ([`OperationState`]).
//!
//! - **[`StoreSubscription<T>`]**: subscription handle vended by the store.
//!   `changed()` wakes on collection or loading/error changes and yields a
//!   [`StoreView`] to render from.
//!
//! - **[`ScriptLoader`]**: one-shot asynchronous initialization guard for a
//!   third-party script. Concurrent `init` calls coalesce into one shared
//!   future; a failed load clears the guard so the next call retries.
//!
//! - **[`PlacesService`]**: the maps/places script wrapped in a
//!   [`ScriptLoader`], plus the address-autocomplete widget it unlocks.
//!
//! - **[`Context`]**: process-wide context built once at startup from an
//!   [`AppConfig`] and passed by reference to consumers.

pub mod config;
pub mod context;
pub mod error;
pub mod loader;
pub mod places;
pub mod store;
pub mod subscription;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{AppConfig, CredentialPolicy, PlacesConfig, StoreConfig, TlsVerification};
pub use context::Context;
pub use error::CoreError;
pub use loader::{
    CallbackRegistry, LoadError, LoadFuture, LoadPhase, ScriptHost, ScriptLoader, ScriptSource,
    ScriptTag,
};
pub use places::{
    AddressComponent, Autocomplete, AutocompleteHost, AutocompleteOptions, ComponentRestrictions,
    CountryRestriction, LatLng, PlaceDetails, PlaceGeometry, PlaceResult, PlacesService,
};
pub use store::{OperationState, RemoteCollection, Resource, ResourceStore, UserStore};
pub use subscription::{StoreSubscription, StoreView};

// Re-export wire types at the crate root for ergonomics.
pub use roster_api::{Address, Company, Geo, User, UserFormData, ValidationErrors};

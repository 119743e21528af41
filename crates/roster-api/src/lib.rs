// roster-api: Async Rust client for JSON REST collection resources

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{CollectionClient, UsersClient};
pub use error::Error;
pub use models::{Address, Company, Geo, User, UserFormData, ValidationErrors};
pub use transport::{TlsMode, TransportConfig};

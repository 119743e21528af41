// Async HTTP client for a single REST collection resource.
//
// Collection URL: {base}            (GET list, POST create)
// Item URL:       {base}/{id}       (PUT update, DELETE delete)

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::models::{User, UserFormData};
use crate::transport::TransportConfig;

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the public users collection.
pub type UsersClient = CollectionClient<User, UserFormData>;

// ── Client ───────────────────────────────────────────────────────────

/// Async client for one REST collection resource.
///
/// `T` is the record type the server returns, `F` the form payload sent on
/// create and update. Records are addressed by their numeric id.
pub struct CollectionClient<T, F = T> {
    http: reqwest::Client,
    collection_url: Url,
    _marker: PhantomData<fn() -> (T, F)>,
}

impl<T, F> CollectionClient<T, F>
where
    T: DeserializeOwned,
    F: Serialize + Sync,
{
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a collection URL (e.g. `https://host/users`) and transport config.
    pub fn new(collection_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(collection_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(collection_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let collection_url = Self::normalize_collection_url(collection_url)?;
        Ok(Self {
            http,
            collection_url,
            _marker: PhantomData,
        })
    }

    /// Parse the collection URL and strip any trailing slash so that
    /// `GET {base}` and `PUT {base}/{id}` hit the canonical paths.
    fn normalize_collection_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::NotABase(raw.to_owned()));
        }

        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&path);
        Ok(url)
    }

    /// The normalized collection URL.
    pub fn collection_url(&self) -> &Url {
        &self.collection_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn item_url(&self, id: u64) -> Url {
        let mut url = self.collection_url.clone();
        // Constructor rejects cannot-be-a-base URLs, so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&id.to_string());
        }
        url
    }

    // ── Operations ───────────────────────────────────────────────────

    /// `GET {base}`: fetch the full collection.
    pub async fn list(&self) -> Result<Vec<T>, Error> {
        let url = self.collection_url.clone();
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    /// `POST {base}`: create a record, returning it with its server-assigned id.
    pub async fn create(&self, body: &F) -> Result<T, Error> {
        let url = self.collection_url.clone();
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    /// `PUT {base}/{id}`: replace a record, returning the server's copy.
    pub async fn update(&self, id: u64, body: &F) -> Result<T, Error> {
        let url = self.item_url(id);
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    /// `DELETE {base}/{id}`. Any 2xx counts as success; the body is ignored.
    pub async fn delete(&self, id: u64) -> Result<(), Error> {
        let url = self.item_url(id);
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<R: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<R, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body: body.clone(),
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let fallback = || {
            status
                .canonical_reason()
                .map_or_else(|| status.to_string(), String::from)
        };

        let message = match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(err) => err.message.or(err.error).unwrap_or_else(fallback),
            Err(_) if raw.trim().is_empty() => fallback(),
            Err(_) => raw.chars().take(200).collect(),
        };

        Error::Remote {
            status: status.as_u16(),
            message,
        }
    }
}

// ── Script host seam ──
//
// The page (or whatever plays its role) that actually appends a script
// element. Browser glue implements this over the DOM; tests use a fake
// that records tags.

use url::Url;

use super::LoadError;

/// A script element to append to the document head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    /// Full script URL including query parameters.
    pub src: Url,
    /// Whether the element carries the `defer` attribute.
    pub defer: bool,
    /// Token the script will call back with once ready. The host forwards
    /// readiness to `CallbackRegistry::resolve` and the element's error
    /// event to `CallbackRegistry::reject` under this token.
    pub callback: String,
}

/// Appends script elements on behalf of a `ScriptLoader`.
pub trait ScriptHost: Send + Sync + 'static {
    /// Append `tag` to the document. An `Err` means the element could not
    /// be created at all; load failures after insertion are reported
    /// through the callback registry instead.
    fn append_script(&self, tag: ScriptTag) -> Result<(), LoadError>;
}

impl<H: ScriptHost> ScriptHost for std::sync::Arc<H> {
    fn append_script(&self, tag: ScriptTag) -> Result<(), LoadError> {
        (**self).append_script(tag)
    }
}

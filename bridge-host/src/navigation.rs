//! Navigation Surface Abstraction
//!
//! The login flow spans a full page navigation: the core redirects the whole
//! page to the authorization endpoint, and a fresh process entry later picks
//! the flow back up from the callback URL. This trait abstracts the address
//! bar so the core can read query parameters, scrub protocol parameters from
//! the visible URL, and perform the redirect itself.

use async_trait::async_trait;

use crate::error::Result;

/// Address-bar access for the host surface.
///
/// In a browser host this maps onto `window.location` and
/// `history.replaceState`; a desktop shell maps it onto its embedded web
/// view. `redirect` is expected to tear down the current page - callers
/// must not rely on code running after it beyond best-effort cleanup.
#[async_trait]
pub trait NavigationSurface: Send + Sync {
    /// The hostname of the current page (no port, no scheme).
    fn hostname(&self) -> String;

    /// The full current URL, including any query string.
    fn current_url(&self) -> String;

    /// Replace the visible URL without reloading the page.
    ///
    /// Used to scrub authorization-protocol query parameters after they have
    /// been consumed, so a reload or bookmark doesn't replay them.
    async fn replace_url(&self, url: &str) -> Result<()>;

    /// Perform a full-page navigation to the given URL.
    async fn redirect(&self, url: &str) -> Result<()>;
}

//! Durable Key-Value Storage Abstraction
//!
//! The PKCE code verifier must survive a full page navigation: the authorize
//! redirect leaves the process, and the callback entry reconstructs protocol
//! state from this store plus the URL's query parameters. Hosts back it with
//! whatever origin-scoped persistence they have (localStorage in a browser,
//! a settings file on desktop).

use async_trait::async_trait;

use crate::error::Result;

/// Origin-scoped durable string storage.
///
/// # Security
///
/// The code verifier stored here is a client-held secret; implementations
/// must scope entries to the application origin and must never log values.
/// No expiry is managed through this trait - stale entries are simply
/// rejected by the core when no matching authorization-code round-trip
/// occurs.
///
/// # Example
///
/// ```ignore
/// use bridge_host::storage::DurableStore;
///
/// async fn remember(store: &dyn DurableStore) -> Result<()> {
///     store.set_item("console.signin.code_verifier", "value").await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Store a string value under a key, overwriting any previous value.
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Delete a key. Deleting an absent key is not an error.
    async fn remove_item(&self, key: &str) -> Result<()>;

    /// Check if a key exists without retrieving it.
    async fn has_item(&self, key: &str) -> Result<bool> {
        Ok(self.get_item(key).await?.is_some())
    }
}

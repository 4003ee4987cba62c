//! # Session State
//!
//! The single mutable record every sign-in component reads and writes.
//!
//! ## Concurrency model
//!
//! There is one logical flow of control per login attempt; the `RwLock` here
//! exists so the handle can be cloned into the watcher task and test
//! harnesses, not to coordinate concurrent protocol runs (the orchestrator
//! and resolver carry their own in-flight guards for that).
//!
//! ## Change notification
//!
//! Only the account identifier gets a dedicated change channel: changing it
//! must re-trigger tenant configuration resolution even across unrelated
//! flows. `tokio::sync::watch` fits because subscribers only ever need the
//! latest value.

use bridge_host::identity::AwsCredentials;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

/// Token set returned by the OAuth token endpoint.
///
/// Treated as an opaque bag beyond the fields the core reads; unknown
/// members are kept so hosts can round-trip them.
///
/// # Security
///
/// Tokens are never logged. The `Debug` implementation redacts them.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// Access token; its `exp` claim gates session validity.
    pub access_token: String,
    /// Identity token; its issuer claim drives credential federation.
    pub id_token: String,
    /// Advisory lifetime in seconds, as reported by the token endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// Any remaining members of the token response.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"[REDACTED]")
            .field("id_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// The session record shared between the orchestrator, resolver and
/// federator.
///
/// Tenant configuration fields (`client_id`, `login_url`,
/// `identity_pool_id`, `user_pool_id`, `region`) are populated by the
/// resolver and overwritten whenever the account identifier changes.
/// Credentials are never persisted across a reload; they are recomputed by
/// the federator each session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Tenant account identifier, as entered in settings.
    pub account_id: Option<String>,
    /// OAuth application client id.
    pub client_id: Option<String>,
    /// Base URL of the tenant's authorization server.
    pub login_url: Option<String>,
    /// Identity pool the session federates against.
    pub identity_pool_id: Option<String>,
    /// User pool that issues the identity tokens.
    pub user_pool_id: Option<String>,
    /// Region, derived from the identity pool id prefix.
    pub region: Option<String>,
    /// Tokens from the most recent code exchange, if still considered valid.
    pub token_set: Option<TokenSet>,
    /// Temporary federated credentials for the current session.
    pub credentials: Option<AwsCredentials>,
    /// Role identifier extracted from the validated caller ARN.
    pub user_role_id: Option<String>,
    /// Default bucket list from shared (non-tenant) discovery settings.
    pub default_buckets: Vec<String>,
    /// UI flag: the settings screen should be shown.
    pub show_settings: bool,
    /// A login should be attempted without user interaction.
    pub auto_login: bool,
    /// The user explicitly logged out.
    pub logged_out: bool,
}

impl SessionState {
    /// Whether the four fields a login attempt cannot proceed without are
    /// all present: account id, login URL, client id, identity pool id.
    pub fn has_mandatory_config(&self) -> bool {
        self.account_id.is_some()
            && self.login_url.is_some()
            && self.client_id.is_some()
            && self.identity_pool_id.is_some()
    }
}

/// Cloneable handle to the shared session record.
///
/// # Examples
///
/// ```
/// use core_session::SessionHandle;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let session = SessionHandle::new();
/// session.set_account_id(Some("123456789012".to_string())).await;
/// let snapshot = session.snapshot().await;
/// assert_eq!(snapshot.account_id.as_deref(), Some("123456789012"));
/// # }
/// ```
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<RwLock<SessionState>>,
    account_tx: Arc<watch::Sender<Option<String>>>,
}

impl SessionHandle {
    /// Create a handle over a fresh, signed-out session.
    pub fn new() -> Self {
        Self::with_state(SessionState::default())
    }

    /// Create a handle over a pre-populated session (tests, restored
    /// settings).
    pub fn with_state(state: SessionState) -> Self {
        let (account_tx, _) = watch::channel(state.account_id.clone());
        Self {
            inner: Arc::new(RwLock::new(state)),
            account_tx: Arc::new(account_tx),
        }
    }

    /// Read the session through a closure.
    pub async fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        let guard = self.inner.read().await;
        f(&guard)
    }

    /// Mutate the session through a closure.
    ///
    /// Does not fire account-change notification; use
    /// [`set_account_id`](Self::set_account_id) for that.
    pub async fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut guard = self.inner.write().await;
        f(&mut guard)
    }

    /// Clone the current state.
    pub async fn snapshot(&self) -> SessionState {
        self.inner.read().await.clone()
    }

    /// Set the account identifier and notify watchers.
    ///
    /// Clearing (`None`) notifies too; the resolver treats it as a request
    /// to drop tenant configuration.
    pub async fn set_account_id(&self, account_id: Option<String>) {
        {
            let mut guard = self.inner.write().await;
            guard.account_id = account_id.clone();
        }
        self.account_tx.send_replace(account_id);
    }

    /// Subscribe to account-identifier changes.
    pub fn subscribe_account(&self) -> watch::Receiver<Option<String>> {
        self.account_tx.subscribe()
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

//! Account Change Watcher
//!
//! Background task that re-resolves tenant configuration whenever the
//! session's account identifier changes, including when it is cleared.
//! Settings edits, degradation after a failed identity check, and restored
//! state all flow through the same channel, so resolution policy lives in
//! one place.

use crate::resolver::ConfigResolver;
use core_session::SessionHandle;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Spawn the watcher task. It lives as long as the application; hosts that
/// need to tear it down abort the returned handle.
pub fn spawn_account_watcher(
    session: SessionHandle,
    resolver: Arc<ConfigResolver>,
) -> JoinHandle<()> {
    let mut account_rx = session.subscribe_account();
    tokio::spawn(async move {
        while account_rx.changed().await.is_ok() {
            let account_id = account_rx.borrow_and_update().clone();
            info!(
                cleared = account_id.is_none(),
                "account changed; re-resolving tenant configuration"
            );
            resolver.set_configuration(account_id.as_deref()).await;
        }
        debug!("account channel closed; watcher exiting");
    })
}

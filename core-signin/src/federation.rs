//! Credential Federation
//!
//! Exchanges a completed token set for temporary cloud credentials against
//! the tenant's identity pool, then validates the caller's role identity.
//!
//! Failure handling follows the session taxonomy: a missing precondition is
//! a silent no-op, a broker failure halts quietly (the session keeps its
//! expired federation until retried), and a caller-identity failure after
//! credentials were issued degrades the session by resetting the tenant
//! identifiers so resolution starts over rather than trusting stale state.

use bridge_host::identity::{ClaimsDecoder, CredentialBroker, FederationRequest};
use core_session::SessionHandle;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Extract the role identifier from an assumed-role ARN: its second
/// `/`-delimited path segment
/// (`arn:aws:sts::{account}:assumed-role/{role}/{session}`).
pub fn role_id_from_arn(arn: &str) -> Option<&str> {
    arn.split('/').nth(1).filter(|segment| !segment.is_empty())
}

/// Converts the session's token set into temporary federated credentials.
///
/// Holds an explicit [`CredentialBroker`] value rather than configuring a
/// process-wide SDK singleton, so hosts and tests inject their own.
pub struct CredentialFederator {
    session: SessionHandle,
    claims: Arc<dyn ClaimsDecoder>,
    broker: Arc<dyn CredentialBroker>,
}

impl CredentialFederator {
    pub fn new(
        session: SessionHandle,
        claims: Arc<dyn ClaimsDecoder>,
        broker: Arc<dyn CredentialBroker>,
    ) -> Self {
        Self {
            session,
            claims,
            broker,
        }
    }

    /// Run the federation pipeline for the current session.
    ///
    /// No-ops silently when the identity pool or token set is absent. All
    /// failures are absorbed here; callers treat this as fire-and-forget.
    #[instrument(skip(self))]
    pub async fn federate(&self) {
        let snapshot = self.session.snapshot().await;
        let (Some(identity_pool_id), Some(token_set)) =
            (snapshot.identity_pool_id, snapshot.token_set)
        else {
            debug!("federation preconditions not met; skipping");
            return;
        };

        // Region always comes from the identity pool id; the session copy
        // is just a cache of the same derivation.
        let region = snapshot
            .region
            .unwrap_or_else(|| {
                identity_pool_id
                    .split(':')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            });

        let issuer = match self.claims.decode_claims(&token_set.id_token) {
            Ok(claims) => claims
                .get("iss")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            Err(e) => {
                warn!(error = %e, "identity token could not be decoded");
                return;
            }
        };
        let Some(issuer) = issuer else {
            warn!("identity token carries no issuer claim");
            return;
        };

        // The issuing user pool is the final path segment of the issuer URL.
        let user_pool_id = issuer
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();

        let mut logins = HashMap::new();
        logins.insert(
            format!("cognito-idp.{}.amazonaws.com/{}", region, user_pool_id),
            token_set.id_token.clone(),
        );

        let request = FederationRequest {
            identity_pool_id,
            region,
            logins,
        };
        let credentials = match self.broker.federated_credentials(request).await {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!(error = %e, "credential federation failed; leaving session unfederated");
                return;
            }
        };
        self.session
            .update(|s| s.credentials = Some(credentials.clone()))
            .await;
        info!("temporary credentials acquired");

        match self.broker.caller_identity(&credentials).await {
            Ok(identity) => match role_id_from_arn(&identity.arn) {
                Some(role_id) => {
                    let role_id = role_id.to_string();
                    self.session
                        .update(|s| {
                            s.user_role_id = Some(role_id);
                            s.auto_login = true;
                        })
                        .await;
                }
                None => {
                    warn!(arn = %identity.arn, "caller ARN has no role segment");
                    self.degrade().await;
                }
            },
            Err(e) => {
                warn!(error = %e, "caller identity validation failed; resetting tenant identifiers");
                self.degrade().await;
            }
        }
    }

    /// Reset the account and client identifiers so the next resolution
    /// starts from scratch. Goes through the account channel so the
    /// configuration watcher observes the clear.
    async fn degrade(&self) {
        self.session.update(|s| s.client_id = None).await;
        self.session.set_account_id(None).await;
    }
}

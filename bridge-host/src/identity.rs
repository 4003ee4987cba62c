//! Identity & Federation Abstractions
//!
//! Two capabilities the core treats as opaque: decoding JWT payloads (no
//! signature verification happens in this core) and exchanging an identity
//! token for temporary cloud credentials scoped to a role.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::Result;

/// Opaque JSON Web Token payload decoder.
///
/// The core only ever reads individual claims (`exp` from the access token,
/// `iss` from the identity token); it never validates signatures. Hosts may
/// back this with a proper JWT library or a plain base64 split.
pub trait ClaimsDecoder: Send + Sync {
    /// Decode the payload segment of a JWT into a JSON value.
    fn decode_claims(&self, token: &str) -> Result<serde_json::Value>;
}

/// Temporary cloud credentials issued against an identity pool.
///
/// Never persisted by the core; recomputed on every session.
#[derive(Clone, Serialize, Deserialize)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    /// When the credentials expire (UTC), if the broker reports it.
    pub expiration: Option<chrono::DateTime<chrono::Utc>>,
}

// Custom Debug implementation to avoid logging secrets
impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &"[REDACTED]")
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// The caller identity reported by the cloud provider for a credential set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Structured resource name of the assumed role session.
    #[serde(rename = "Arn")]
    pub arn: String,
}

/// Request for temporary federated credentials.
#[derive(Debug, Clone)]
pub struct FederationRequest {
    /// Identity pool to federate against.
    pub identity_pool_id: String,
    /// Region the pool lives in.
    pub region: String,
    /// Issuer key to identity token, e.g.
    /// `cognito-idp.{region}.amazonaws.com/{user_pool_id}` -> id_token.
    pub logins: HashMap<String, String>,
}

/// Credential federation capability.
///
/// Wraps the cloud provider's identity-pool protocol. The core supplies an
/// explicit broker value rather than configuring a process-wide SDK
/// singleton, so tests and multi-tenant hosts can inject their own.
#[async_trait]
pub trait CredentialBroker: Send + Sync {
    /// Exchange a validated identity token for temporary credentials.
    async fn federated_credentials(&self, request: FederationRequest) -> Result<AwsCredentials>;

    /// Ask the provider who the given credentials belong to.
    async fn caller_identity(&self, credentials: &AwsCredentials) -> Result<CallerIdentity>;
}

use serde::{Deserialize, Serialize};

/// Outcome of a single pass through the login state machine.
///
/// The flow always enters at `login()` and terminates in one of these; the
/// interesting transitions happen across process boundaries, not inside a
/// single call.
///
/// # State Transitions
///
/// ```text
/// CheckingSession -> AlreadyAuthenticated        (stored token still valid)
///                 -> Authenticated               (code exchange completed)
///                 -> NeedsSettings               (configuration incomplete)
///                 -> Idle                        (nothing to do)
///                 -> Redirected                  (authorize navigation issued)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A stored token set was still within its validity window; federation
    /// was triggered without any network round-trip to the token endpoint.
    AlreadyAuthenticated,
    /// An authorization code was exchanged for a fresh token set.
    Authenticated,
    /// Mandatory configuration fields are missing; the settings screen was
    /// flagged for display.
    NeedsSettings,
    /// No code, no auto-login, no forced login. Quiescent.
    Idle,
    /// A full-page redirect to the authorize endpoint was issued. The
    /// continuation is a fresh entry into the state machine on next load.
    Redirected,
}

/// Tenant configuration document as published by the discovery service and
/// the per-region well-known objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantConfigDocument {
    /// OAuth application client id.
    pub application_client_id: String,
    /// Identity pool id; its prefix before the first `:` is the region.
    pub identity_pool_id: String,
    /// User pool that issues tokens for this tenant.
    pub cognito_pool_id: String,
    /// Either an absolute HTTPS login URL, or a bare Cognito domain prefix.
    pub application_login_url: String,
}

impl TenantConfigDocument {
    /// Region encoded in the identity pool id (`{region}:{uuid}`).
    pub fn region(&self) -> &str {
        self.identity_pool_id
            .split(':')
            .next()
            .unwrap_or_default()
    }

    /// Resolve the login URL: an absolute HTTPS value passes through,
    /// anything else is treated as a hosted-UI domain prefix.
    pub fn login_url(&self) -> String {
        if self.application_login_url.starts_with("https://") {
            self.application_login_url.clone()
        } else {
            format!(
                "https://{}.auth.{}.amazoncognito.com",
                self.application_login_url,
                self.region()
            )
        }
    }
}

/// Shared, non-tenant-specific settings from the discovery service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedSettings {
    /// Buckets shown before any tenant configuration is resolved.
    #[serde(default)]
    pub default_buckets: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_derivation() {
        let doc = TenantConfigDocument {
            application_client_id: "client".to_string(),
            identity_pool_id: "eu-west-2:0f2ec1fb-55fc-4a81-90b0-93a7af24b102".to_string(),
            cognito_pool_id: "eu-west-2_AbCdEfGhI".to_string(),
            application_login_url: "tenant".to_string(),
        };
        assert_eq!(doc.region(), "eu-west-2");
    }

    #[test]
    fn test_login_url_passthrough_for_absolute_https() {
        let doc = TenantConfigDocument {
            application_client_id: "client".to_string(),
            identity_pool_id: "us-east-1:pool".to_string(),
            cognito_pool_id: "us-east-1_X".to_string(),
            application_login_url: "https://login.tenant.example".to_string(),
        };
        assert_eq!(doc.login_url(), "https://login.tenant.example");
    }

    #[test]
    fn test_login_url_synthesized_from_domain_prefix() {
        let doc = TenantConfigDocument {
            application_client_id: "client".to_string(),
            identity_pool_id: "ap-southeast-2:pool".to_string(),
            cognito_pool_id: "ap-southeast-2_X".to_string(),
            application_login_url: "tenant-login".to_string(),
        };
        assert_eq!(
            doc.login_url(),
            "https://tenant-login.auth.ap-southeast-2.amazoncognito.com"
        );
    }

    #[test]
    fn test_document_deserializes_wire_shape() {
        let json = r#"{
            "applicationClientId": "abc123",
            "identityPoolId": "us-west-2:11111111-2222-3333-4444-555555555555",
            "cognitoPoolId": "us-west-2_Example",
            "applicationLoginUrl": "https://auth.example.com"
        }"#;
        let doc: TenantConfigDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.application_client_id, "abc123");
        assert_eq!(doc.region(), "us-west-2");
    }

    #[test]
    fn test_shared_settings_default_buckets_optional() {
        let settings: SharedSettings = serde_json::from_str("{}").unwrap();
        assert!(settings.default_buckets.is_empty());

        let settings: SharedSettings =
            serde_json::from_str(r#"{"defaultBuckets": ["logs", "assets"]}"#).unwrap();
        assert_eq!(settings.default_buckets, vec!["logs", "assets"]);
    }
}

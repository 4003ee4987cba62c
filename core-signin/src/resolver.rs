//! Tenant Configuration Resolver
//!
//! Resolves tenant identity/OAuth configuration from a hostname or an
//! account identifier through a deterministic cascade:
//!
//! 1. a custom-domain probe against the discovery service (skipped on the
//!    local-development and canonical console hosts),
//! 2. per-region well-known objects, checked in three tiers: two primary
//!    regions, then the fifteen remaining supported regions, then one
//!    direct region-less fetch.
//!
//! Within a tier every lookup is issued concurrently and *all* are awaited
//! before a winner is chosen; the winner is the first success in list
//! order, not the first to complete. A tier therefore costs as much wall
//! clock as its slowest responder. That determinism trade-off is kept on
//! purpose; racing to the first success is a known candidate improvement.

use crate::types::{SharedSettings, TenantConfigDocument};
use bridge_host::http::{HttpClient, HttpMethod, HttpRequest};
use bridge_host::navigation::NavigationSurface;
use core_session::SessionHandle;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

/// Hostname used during local development; never probed.
pub const LOCAL_DEV_HOST: &str = "localhost";

/// The canonical console host; tenants on it configure by account id.
pub const CANONICAL_CONSOLE_HOST: &str = "console.s3explorer.cloud";

/// Base URL of the custom-domain discovery service.
pub const DISCOVERY_SERVICE: &str = "https://config.files.s3explorer.cloud";

/// Regions checked first; most tenants live here.
pub const PRIMARY_REGIONS: [&str; 2] = ["us-east-1", "eu-west-1"];

/// Remaining supported regions, checked only when the primary tier is
/// exhausted.
pub const SECONDARY_REGIONS: [&str; 15] = [
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "ca-central-1",
    "eu-central-1",
    "eu-west-2",
    "eu-west-3",
    "eu-north-1",
    "ap-south-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-southeast-1",
    "ap-southeast-2",
    "sa-east-1",
];

/// Resolves tenant configuration into the shared session record.
///
/// Both entry points are idempotent and side-effect-limited to the tenant
/// configuration fields (plus the auto-login flag on a custom-domain hit).
/// Invocations serialize behind an internal guard so a watcher-triggered
/// resolution cannot interleave with one already in flight.
pub struct ConfigResolver {
    session: SessionHandle,
    http: Arc<dyn HttpClient>,
    navigation: Arc<dyn NavigationSurface>,
    in_flight: Mutex<()>,
}

impl ConfigResolver {
    pub fn new(
        session: SessionHandle,
        http: Arc<dyn HttpClient>,
        navigation: Arc<dyn NavigationSurface>,
    ) -> Self {
        Self {
            session,
            http,
            navigation,
            in_flight: Mutex::new(()),
        }
    }

    /// Probe the discovery service for configuration bound to the current
    /// hostname.
    ///
    /// Skipped entirely (returns `false`) on the local-development host and
    /// the canonical console host. On a hit the tenant configuration is
    /// populated, shared settings are fetched best-effort, and auto-login
    /// is marked pending.
    #[instrument(skip(self))]
    pub async fn probe_custom_domain(&self) -> bool {
        let host = self.navigation.hostname();
        if host == LOCAL_DEV_HOST || host == CANONICAL_CONSOLE_HOST {
            debug!(host = %host, "custom-domain probe not applicable");
            return false;
        }

        let url = format!("{}/?hostname={}", DISCOVERY_SERVICE, host);
        let document = match self.fetch_document(&url).await {
            Some(doc) => doc,
            None => {
                debug!(host = %host, "no custom-domain configuration");
                return false;
            }
        };

        info!(host = %host, "custom-domain configuration found");
        self.apply_document(document).await;
        self.session.update(|s| s.auto_login = true).await;

        if let Some(shared) = self.fetch_shared_settings(&host).await {
            self.session
                .update(|s| s.default_buckets = shared.default_buckets)
                .await;
        }

        true
    }

    /// Resolve configuration for an account identifier.
    ///
    /// Clearing the account (`None` or empty) drops the client id, login
    /// URL and role id without issuing any network request. Otherwise the
    /// custom-domain probe runs first, then the three-tier region cascade.
    /// Returns whether configuration was resolved.
    #[instrument(skip(self))]
    pub async fn set_configuration(&self, account_id: Option<&str>) -> bool {
        let _guard = self.in_flight.lock().await;

        let account_id = match account_id {
            Some(id) if !id.is_empty() => id,
            _ => {
                debug!("account cleared; dropping tenant configuration");
                self.session
                    .update(|s| {
                        s.client_id = None;
                        s.login_url = None;
                        s.user_role_id = None;
                    })
                    .await;
                return false;
            }
        };

        if self.probe_custom_domain().await {
            return true;
        }

        for regions in [&PRIMARY_REGIONS[..], &SECONDARY_REGIONS[..]] {
            if let Some(document) = self.resolve_tier(account_id, regions).await {
                self.apply_document(document).await;
                return true;
            }
        }

        // Last resort: the global endpoint, no region suffix anywhere.
        let url = format!(
            "https://s3.amazonaws.com/s3-explorer.{}/configuration.json",
            account_id
        );
        match self.fetch_document(&url).await {
            Some(document) => {
                self.apply_document(document).await;
                true
            }
            None => {
                error!(account_id = %account_id, "configuration not found in any region");
                false
            }
        }
    }

    /// Run one cascade tier: all region lookups concurrently, awaited to
    /// completion, then the first list-order success.
    ///
    /// A delayed failure in an early region does not let a later region
    /// take the lead; selection only happens after the whole tier settles.
    async fn resolve_tier(
        &self,
        account_id: &str,
        regions: &[&str],
    ) -> Option<TenantConfigDocument> {
        let lookups = regions.iter().map(|region| {
            let url = format!(
                "https://s3.{region}.amazonaws.com/s3-explorer.{account_id}.{region}/configuration.json"
            );
            async move { self.fetch_document(&url).await }
        });

        join_all(lookups)
            .await
            .into_iter()
            .flatten()
            .next()
    }

    /// Fetch and parse one configuration document. Every failure mode is
    /// soft: "no answer from this source".
    async fn fetch_document(&self, url: &str) -> Option<TenantConfigDocument> {
        let request = HttpRequest::new(HttpMethod::Get, url);
        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                debug!(url = %url, error = %e, "configuration lookup failed");
                return None;
            }
        };
        if !response.is_success() {
            debug!(url = %url, status = response.status, "configuration lookup missed");
            return None;
        }
        match response.json::<TenantConfigDocument>() {
            Ok(document) => Some(document),
            Err(e) => {
                warn!(url = %url, error = %e, "configuration document unparseable");
                None
            }
        }
    }

    /// Fetch shared, non-tenant-specific settings for a hostname.
    async fn fetch_shared_settings(&self, host: &str) -> Option<SharedSettings> {
        let url = format!("{}/shared?hostname={}", DISCOVERY_SERVICE, host);
        let request = HttpRequest::new(HttpMethod::Get, &url);
        let response = self.http.execute(request).await.ok()?;
        if !response.is_success() {
            debug!(status = response.status, "no shared settings published");
            return None;
        }
        response.json::<SharedSettings>().ok()
    }

    /// Write a resolved document into the session. Region is always derived
    /// from the identity pool id, never taken from elsewhere.
    async fn apply_document(&self, document: TenantConfigDocument) {
        let region = document.region().to_string();
        let login_url = document.login_url();
        info!(region = %region, "tenant configuration resolved");
        self.session
            .update(move |s| {
                s.client_id = Some(document.application_client_id);
                s.identity_pool_id = Some(document.identity_pool_id);
                s.user_pool_id = Some(document.cognito_pool_id);
                s.region = Some(region);
                s.login_url = Some(login_url);
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_host::error::{BridgeError, Result as BridgeResult};
    use bridge_host::http::HttpResponse;
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    struct Scripted {
        delay: Duration,
        status: u16,
        body: String,
    }

    /// HTTP client driven by a URL -> scripted-response table, recording
    /// every request it sees.
    #[derive(Default)]
    struct ScriptedHttpClient {
        responses: HashMap<String, Scripted>,
        requests: StdMutex<Vec<String>>,
    }

    impl ScriptedHttpClient {
        fn respond(&mut self, url: &str, status: u16, body: &str, delay_ms: u64) {
            self.responses.insert(
                url.to_string(),
                Scripted {
                    delay: Duration::from_millis(delay_ms),
                    status,
                    body: body.to_string(),
                },
            );
        }

        fn seen(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl HttpClient for ScriptedHttpClient {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
            self.requests.lock().unwrap().push(request.url.clone());
            match self.responses.get(&request.url) {
                Some(scripted) => {
                    tokio::time::sleep(scripted.delay).await;
                    Ok(HttpResponse {
                        status: scripted.status,
                        headers: HashMap::new(),
                        body: Bytes::from(scripted.body.clone()),
                    })
                }
                None => Err(BridgeError::Network("unreachable".to_string())),
            }
        }
    }

    struct FixedNavigation {
        hostname: String,
    }

    #[async_trait::async_trait]
    impl NavigationSurface for FixedNavigation {
        fn hostname(&self) -> String {
            self.hostname.clone()
        }
        fn current_url(&self) -> String {
            format!("https://{}/", self.hostname)
        }
        async fn replace_url(&self, _url: &str) -> BridgeResult<()> {
            Ok(())
        }
        async fn redirect(&self, _url: &str) -> BridgeResult<()> {
            Ok(())
        }
    }

    fn document_json(region: &str) -> String {
        format!(
            r#"{{
                "applicationClientId": "client-{region}",
                "identityPoolId": "{region}:11111111-2222-3333-4444-555555555555",
                "cognitoPoolId": "{region}_Example",
                "applicationLoginUrl": "tenant"
            }}"#
        )
    }

    fn region_url(account: &str, region: &str) -> String {
        format!("https://s3.{region}.amazonaws.com/s3-explorer.{account}.{region}/configuration.json")
    }

    fn resolver_with(
        http: ScriptedHttpClient,
        hostname: &str,
    ) -> (ConfigResolver, Arc<ScriptedHttpClient>, SessionHandle) {
        let http = Arc::new(http);
        let session = SessionHandle::new();
        let navigation = Arc::new(FixedNavigation {
            hostname: hostname.to_string(),
        });
        let resolver = ConfigResolver::new(session.clone(), http.clone(), navigation);
        (resolver, http, session)
    }

    #[tokio::test]
    async fn test_clearing_account_issues_no_requests() {
        let (resolver, http, session) = resolver_with(ScriptedHttpClient::default(), "localhost");
        session
            .update(|s| {
                s.client_id = Some("client".to_string());
                s.login_url = Some("https://login".to_string());
                s.user_role_id = Some("role".to_string());
            })
            .await;

        assert!(!resolver.set_configuration(None).await);

        let state = session.snapshot().await;
        assert!(state.client_id.is_none());
        assert!(state.login_url.is_none());
        assert!(state.user_role_id.is_none());
        assert!(http.seen().is_empty());
    }

    #[tokio::test]
    async fn test_probe_skipped_on_local_and_canonical_hosts() {
        for host in [LOCAL_DEV_HOST, CANONICAL_CONSOLE_HOST] {
            let (resolver, http, _) = resolver_with(ScriptedHttpClient::default(), host);
            assert!(!resolver.probe_custom_domain().await);
            assert!(http.seen().is_empty());
        }
    }

    #[tokio::test]
    async fn test_probe_populates_configuration_and_auto_login() {
        let mut http = ScriptedHttpClient::default();
        http.respond(
            &format!("{}/?hostname=files.tenant.example", DISCOVERY_SERVICE),
            200,
            &document_json("eu-west-2"),
            0,
        );
        http.respond(
            &format!("{}/shared?hostname=files.tenant.example", DISCOVERY_SERVICE),
            200,
            r#"{"defaultBuckets": ["logs"]}"#,
            0,
        );
        let (resolver, _, session) = resolver_with(http, "files.tenant.example");

        assert!(resolver.probe_custom_domain().await);

        let state = session.snapshot().await;
        assert_eq!(state.client_id.as_deref(), Some("client-eu-west-2"));
        assert_eq!(state.region.as_deref(), Some("eu-west-2"));
        assert_eq!(
            state.login_url.as_deref(),
            Some("https://tenant.auth.eu-west-2.amazoncognito.com")
        );
        assert_eq!(state.default_buckets, vec!["logs"]);
        assert!(state.auto_login);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tier_winner_is_list_order_not_wall_clock() {
        // Two primary-tier successes: the later list entry responds much
        // faster, but the earlier entry must still win.
        let account = "123456789012";
        let mut http = ScriptedHttpClient::default();
        http.respond(
            &region_url(account, "us-east-1"),
            200,
            &document_json("us-east-1"),
            500,
        );
        http.respond(
            &region_url(account, "eu-west-1"),
            200,
            &document_json("eu-west-1"),
            5,
        );
        let (resolver, _, session) = resolver_with(http, "localhost");

        assert!(resolver.set_configuration(Some(account)).await);
        let state = session.snapshot().await;
        assert_eq!(state.client_id.as_deref(), Some("client-us-east-1"));
        assert_eq!(state.region.as_deref(), Some("us-east-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_secondary_tier_fourth_entry_wins_after_primary_exhausted() {
        let account = "210987654321";
        let mut http = ScriptedHttpClient::default();
        // Primary tier: both present but failing, one of them slowly.
        http.respond(&region_url(account, "us-east-1"), 404, "missing", 200);
        http.respond(&region_url(account, "eu-west-1"), 403, "denied", 0);
        // Secondary tier: only the 4th entry (ca-central-1) succeeds.
        let region = SECONDARY_REGIONS[3];
        http.respond(
            &region_url(account, region),
            200,
            &document_json(region),
            50,
        );
        let (resolver, http, session) = resolver_with(http, "localhost");

        assert!(resolver.set_configuration(Some(account)).await);

        let state = session.snapshot().await;
        assert_eq!(state.region.as_deref(), Some("ca-central-1"));
        assert_eq!(
            state.identity_pool_id.as_deref(),
            Some("ca-central-1:11111111-2222-3333-4444-555555555555")
        );

        // Tier ordering: both primary lookups come before any secondary one.
        let seen = http.seen();
        let first_secondary = seen
            .iter()
            .position(|url| url == &region_url(account, SECONDARY_REGIONS[0]))
            .unwrap();
        assert!(seen[..first_secondary].contains(&region_url(account, "us-east-1")));
        assert!(seen[..first_secondary].contains(&region_url(account, "eu-west-1")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_direct_fetch_is_last_resort() {
        let account = "555566667777";
        let mut http = ScriptedHttpClient::default();
        http.respond(
            &format!("https://s3.amazonaws.com/s3-explorer.{account}/configuration.json"),
            200,
            &document_json("sa-east-1"),
            0,
        );
        let (resolver, http, session) = resolver_with(http, "localhost");

        assert!(resolver.set_configuration(Some(account)).await);
        assert_eq!(
            session.snapshot().await.region.as_deref(),
            Some("sa-east-1")
        );

        // 2 primary + 15 secondary + 1 direct.
        assert_eq!(http.seen().len(), 18);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolution_aborts_when_every_source_misses() {
        let (resolver, http, session) =
            resolver_with(ScriptedHttpClient::default(), "localhost");
        assert!(!resolver.set_configuration(Some("000011112222")).await);
        assert!(session.snapshot().await.client_id.is_none());
        assert_eq!(http.seen().len(), 18);
    }
}

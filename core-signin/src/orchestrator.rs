//! Login Orchestrator
//!
//! Drives the authorization-code + PKCE protocol as a resumable state
//! machine. A single entry point, [`LoginOrchestrator::login`], is invoked
//! on every process start and after explicit user action; it decides
//! between resuming a still-valid session, completing a callback code
//! exchange, demanding settings, staying idle, or redirecting to the
//! authorize endpoint.
//!
//! The hardest boundary is the redirect: control never "returns" from the
//! authorize navigation. The continuation is the next `login()` call in a
//! fresh process, correlated only through the `code` query parameter and
//! the durably persisted code verifier.

use crate::error::{Result, SigninError};
use crate::federation::CredentialFederator;
use crate::pkce::PkceMaterial;
use crate::resolver::ConfigResolver;
use crate::types::LoginOutcome;
use bridge_host::http::{HttpClient, HttpMethod, HttpRequest};
use bridge_host::identity::ClaimsDecoder;
use bridge_host::navigation::NavigationSurface;
use bridge_host::storage::DurableStore;
use core_session::{SessionHandle, TokenSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Durable-storage key holding the PKCE code verifier across the redirect.
pub const CODE_VERIFIER_KEY: &str = "console.signin.code_verifier";

/// Query parameters belonging to the authorization protocol, scrubbed from
/// the visible URL once consumed.
const PROTOCOL_QUERY_PARAMS: [&str; 7] = [
    "nonce",
    "expires_in",
    "access_token",
    "id_token",
    "state",
    "code",
    "iss",
];

/// Grace period granted to opportunistic federation once the authorize
/// redirect has been issued and the page is tearing down.
const REDIRECT_GRACE: Duration = Duration::from_millis(2000);

/// The login state machine.
///
/// Holds the bridge capabilities plus the resolver and federator it
/// delegates to. Not re-entrant: a second `login()` while one is in flight
/// fails fast with [`SigninError::LoginInProgress`].
pub struct LoginOrchestrator {
    session: SessionHandle,
    http: Arc<dyn HttpClient>,
    store: Arc<dyn DurableStore>,
    navigation: Arc<dyn NavigationSurface>,
    claims: Arc<dyn ClaimsDecoder>,
    resolver: Arc<ConfigResolver>,
    federator: Arc<CredentialFederator>,
    in_flight: Mutex<()>,
}

impl LoginOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session: SessionHandle,
        http: Arc<dyn HttpClient>,
        store: Arc<dyn DurableStore>,
        navigation: Arc<dyn NavigationSurface>,
        claims: Arc<dyn ClaimsDecoder>,
        resolver: Arc<ConfigResolver>,
        federator: Arc<CredentialFederator>,
    ) -> Self {
        Self {
            session,
            http,
            store,
            navigation,
            claims,
            resolver,
            federator,
            in_flight: Mutex::new(()),
        }
    }

    /// Run one pass of the login state machine.
    ///
    /// `force_login` bypasses the auto-login gate: a redirect is issued even
    /// when no auto-login is pending, provided configuration is complete.
    ///
    /// # Errors
    ///
    /// Only protocol-fatal conditions surface as errors: a lost code
    /// verifier during a callback, a rejected code exchange, or a concurrent
    /// login attempt. Everything else terminates in a quiescent
    /// [`LoginOutcome`].
    #[instrument(skip(self))]
    pub async fn login(&self, force_login: bool) -> Result<LoginOutcome> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| SigninError::LoginInProgress)?;

        // Resume a still-valid session without touching the network.
        if let Some(token_set) = self.session.read(|s| s.token_set.clone()).await {
            if self.access_token_valid(&token_set) {
                info!("stored token set still valid; resuming session");
                self.session
                    .update(|s| {
                        s.auto_login = true;
                        s.show_settings = false;
                    })
                    .await;
                self.federator.federate().await;
                return Ok(LoginOutcome::AlreadyAuthenticated);
            }
            debug!("stored token set expired; discarding");
            self.session.update(|s| s.token_set = None).await;
        }

        // An authorization code in the URL means we are the continuation of
        // a redirect issued by an earlier process.
        let current = Url::parse(&self.navigation.current_url())?;
        let code = current
            .query_pairs()
            .find(|(key, _)| key == "code")
            .map(|(_, value)| value.into_owned());
        if let Some(code) = code {
            return self.exchange_code(&current, &code).await;
        }

        // Fresh entry: resolve configuration, or demand settings.
        if !self.resolver.probe_custom_domain().await {
            let configured = self.session.read(|s| s.has_mandatory_config()).await;
            if !configured {
                info!("mandatory configuration incomplete; settings required");
                self.session.update(|s| s.show_settings = true).await;
                return Ok(LoginOutcome::NeedsSettings);
            }
        }

        let login_url = self
            .session
            .read(|s| s.login_url.clone())
            .await
            .unwrap_or_default();
        if let Err(e) = Url::parse(&login_url) {
            warn!(error = %e, "login URL is not a well-formed absolute URL");
            return Ok(LoginOutcome::Idle);
        }

        let auto_login = self.session.read(|s| s.auto_login).await;
        if !force_login && !auto_login {
            debug!("no pending auto-login and login not forced");
            return Ok(LoginOutcome::Idle);
        }

        self.redirect_to_authorize(&current, &login_url).await
    }

    /// Drop tokens and credentials and mark the session logged out. The
    /// account and tenant configuration are kept so the next login is one
    /// click away.
    pub async fn logout(&self) {
        info!("logging out");
        self.session
            .update(|s| {
                s.token_set = None;
                s.credentials = None;
                s.user_role_id = None;
                s.auto_login = false;
                s.logged_out = true;
            })
            .await;
    }

    /// Complete the code exchange leg: scrub the URL, recover the persisted
    /// verifier, POST to the token endpoint, store the token set, federate.
    async fn exchange_code(&self, current: &Url, code: &str) -> Result<LoginOutcome> {
        // Scrub protocol parameters first so a reload cannot replay them,
        // whatever happens next.
        let scrubbed = strip_protocol_params(current);
        self.navigation.replace_url(scrubbed.as_str()).await?;

        let code_verifier = self
            .store
            .get_item(CODE_VERIFIER_KEY)
            .await?
            .ok_or(SigninError::VerifierMissing)?;

        let (client_id, login_url) = self
            .session
            .read(|s| {
                (
                    s.client_id.clone().unwrap_or_default(),
                    s.login_url.clone().unwrap_or_default(),
                )
            })
            .await;
        let redirect_uri = redirect_uri(current);
        let token_url = format!("{}/oauth2/token", login_url.trim_end_matches('/'));

        info!("exchanging authorization code for tokens");
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", client_id.as_str()),
            ("code", code),
            ("code_verifier", code_verifier.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
        ];
        let request = HttpRequest::new(HttpMethod::Post, token_url).form(&params)?;
        let response = self.http.execute(request).await?;

        if !response.is_success() {
            let body = response.json::<serde_json::Value>().unwrap_or_else(|_| {
                serde_json::Value::String(response.text().unwrap_or_default())
            });
            warn!(status = response.status, "token exchange rejected");
            return Err(SigninError::TokenEndpoint {
                status: response.status,
                body,
            });
        }

        let token_set: TokenSet = response.json()?;
        info!("token exchange completed");
        self.session
            .update(|s| s.token_set = Some(token_set))
            .await;
        self.federator.federate().await;
        self.session
            .update(|s| {
                s.show_settings = false;
                s.auto_login = true;
            })
            .await;
        Ok(LoginOutcome::Authenticated)
    }

    /// Issue the authorize redirect: fresh PKCE material, verifier
    /// persisted, full-page navigation. The page is tearing down after
    /// this; federation is started opportunistically and given a fixed
    /// grace window, best-effort only.
    async fn redirect_to_authorize(
        &self,
        current: &Url,
        login_url: &str,
    ) -> Result<LoginOutcome> {
        self.session.update(|s| s.auto_login = false).await;

        let material = PkceMaterial::generate();
        self.store
            .set_item(CODE_VERIFIER_KEY, &material.code_verifier)
            .await?;
        self.session.update(|s| s.logged_out = false).await;

        let client_id = self
            .session
            .read(|s| s.client_id.clone())
            .await
            .unwrap_or_default();
        let redirect_uri = redirect_uri(current);

        let mut authorize = Url::parse(&format!(
            "{}/oauth2/authorize",
            login_url.trim_end_matches('/')
        ))?;
        {
            let mut query = authorize.query_pairs_mut();
            query.append_pair("response_type", "code");
            query.append_pair("client_id", &client_id);
            query.append_pair("state", &material.nonce);
            query.append_pair("code_challenge_method", "S256");
            query.append_pair("code_challenge", &material.code_challenge);
            query.append_pair("redirect_uri", &redirect_uri);
        }

        info!("redirecting to authorize endpoint");
        self.navigation.redirect(authorize.as_str()).await?;

        self.federator.federate().await;
        sleep(REDIRECT_GRACE).await;
        Ok(LoginOutcome::Redirected)
    }

    /// A token set is valid iff its access token's `exp` claim is strictly
    /// in the future. Undecodable tokens are treated as expired.
    fn access_token_valid(&self, token_set: &TokenSet) -> bool {
        match self.claims.decode_claims(&token_set.access_token) {
            Ok(claims) => claims
                .get("exp")
                .and_then(|v| v.as_i64())
                .map(|exp| exp > chrono::Utc::now().timestamp())
                .unwrap_or(false),
            Err(e) => {
                debug!(error = %e, "access token claims undecodable");
                false
            }
        }
    }
}

/// The redirect URI registered with the authorization server: the current
/// URL with query and fragment removed.
fn redirect_uri(current: &Url) -> String {
    let mut uri = current.clone();
    uri.set_query(None);
    uri.set_fragment(None);
    uri.to_string()
}

/// Remove authorization-protocol query parameters, keeping everything else.
fn strip_protocol_params(url: &Url) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !PROTOCOL_QUERY_PARAMS.contains(&key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut scrubbed = url.clone();
    scrubbed.set_query(None);
    if !kept.is_empty() {
        let mut query = scrubbed.query_pairs_mut();
        for (key, value) in &kept {
            query.append_pair(key, value);
        }
    }
    scrubbed
}

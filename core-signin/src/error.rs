use bridge_host::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SigninError {
    /// A login attempt is already in flight; the flow is not re-entrant.
    #[error("Login already in progress")]
    LoginInProgress,

    /// An authorization code arrived but the persisted code verifier is
    /// gone. The PKCE round-trip cannot be completed; this usually means
    /// the callback was opened from a different browser context.
    #[error("Authorization code received but the stored code verifier is missing")]
    VerifierMissing,

    /// The token endpoint rejected the code exchange.
    #[error("Token endpoint returned {status}: {body}")]
    TokenEndpoint {
        status: u16,
        body: serde_json::Value,
    },

    #[error("Bridge failure: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Malformed URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, SigninError>;

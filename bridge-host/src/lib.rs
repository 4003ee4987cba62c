//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host surface
//! embedding the console sign-in core.
//!
//! ## Overview
//!
//! This crate defines the contract between the sign-in core and the
//! environment it runs in. The core never talks to the network, the address
//! bar, durable storage, or the cloud provider's federation service directly;
//! it goes through these traits, which keeps the protocol logic testable and
//! host-agnostic.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP requests (token exchange,
//!   configuration discovery)
//! - [`DurableStore`](storage::DurableStore) - Origin-scoped key-value
//!   persistence that survives a full page navigation
//! - [`NavigationSurface`](navigation::NavigationSurface) - Address-bar
//!   inspection, history replacement, and full-page redirects
//! - [`ClaimsDecoder`](identity::ClaimsDecoder) - Opaque JWT payload decoding
//! - [`CredentialBroker`](identity::CredentialBroker) - Federated credential
//!   acquisition and caller-identity validation
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Host
//! implementations should convert platform-specific failures into it with
//! actionable messages and must never embed secrets in error text.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so they can be shared across async
//! tasks behind `Arc`.

pub mod error;
pub mod http;
pub mod identity;
pub mod navigation;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use identity::{AwsCredentials, CallerIdentity, ClaimsDecoder, CredentialBroker, FederationRequest};
pub use navigation::NavigationSurface;
pub use storage::DurableStore;

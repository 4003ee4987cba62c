//! # Sign-in Core
//!
//! Login orchestration for the console: OAuth 2.0 authorization-code flow
//! with PKCE, tenant configuration discovery, and token-to-credential
//! federation.
//!
//! ## Overview
//!
//! The flow is a resumable state machine driven by
//! [`LoginOrchestrator::login`](orchestrator::LoginOrchestrator::login).
//! The authorize redirect is a full-page navigation, so no state survives
//! in memory; continuity comes from the durable code verifier plus the
//! `code` query parameter on re-entry.
//!
//! ## Components
//!
//! - [`orchestrator`] - The login state machine and logout
//! - [`resolver`] - Tenant configuration discovery (custom-domain probe +
//!   three-tier region cascade)
//! - [`federation`] - Token-to-credential exchange and role validation
//! - [`watcher`] - Background re-resolution on account changes
//! - [`pkce`] - Verifier/challenge/nonce generation

pub mod error;
pub mod federation;
pub mod orchestrator;
pub mod pkce;
pub mod resolver;
pub mod types;
pub mod watcher;

pub use error::{Result, SigninError};
pub use federation::CredentialFederator;
pub use orchestrator::LoginOrchestrator;
pub use resolver::ConfigResolver;
pub use types::{LoginOutcome, SharedSettings, TenantConfigDocument};
pub use watcher::spawn_account_watcher;

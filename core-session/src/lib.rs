//! # Session Runtime
//!
//! Shared session state and runtime plumbing for the console sign-in core.
//!
//! ## Overview
//!
//! The original console kept its session in a reactive global store mutated
//! from everywhere. This crate replaces that with an explicit record
//! ([`SessionState`](state::SessionState)) behind a cloneable handle
//! ([`SessionHandle`](state::SessionHandle)); components receive the handle
//! and mutate the record while they hold logical control of the flow.
//! Account-identifier changes are surfaced through a `tokio::sync::watch`
//! channel so the configuration watcher can re-resolve without implicit
//! reactive tracking.
//!
//! Logging setup lives in [`logging`].

pub mod error;
pub mod logging;
pub mod state;

pub use error::{Error, Result};
pub use state::{SessionHandle, SessionState, TokenSet};

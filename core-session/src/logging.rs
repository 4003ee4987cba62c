//! # Logging Infrastructure
//!
//! Configures the `tracing-subscriber` stack for hosts embedding the core.
//!
//! Tokens, verifiers and credentials never reach log output - the types
//! carrying them redact their `Debug` representations - so the layers here
//! stay purely about format and filtering.
//!
//! ## Usage
//!
//! ```ignore
//! use core_session::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! let config = LoggingConfig {
//!     format: LogFormat::Pretty,
//!     filter: "core_signin=debug,info".to_string(),
//! };
//! init_logging(config).expect("Failed to initialize logging");
//! tracing::info!("console sign-in core starting");
//! ```

use crate::error::{Error, Result};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors
    Pretty,
    /// Structured JSON format for machine parsing
    Json,
    /// Compact format for production
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Filter directives (e.g. "core_signin=debug,info"); falls back to
    /// `RUST_LOG` when empty.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: String::new(),
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed or the filter string
/// does not parse.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = if config.filter.is_empty() {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::try_new(&config.filter)
            .map_err(|e| Error::InitializationFailed(format!("invalid log filter: {}", e)))?
    };

    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
    }
    .map_err(|e| Error::InitializationFailed(format!("subscriber install failed: {}", e)))
}

//! services/clocker/src/error.rs
//!
//! Defines the primary error type for the clocker service.

use crate::config::ConfigError;
use clocker_core::ports::PortError;

/// The primary error type for the `clocker` service.
#[derive(Debug, thiserror::Error)]
pub enum ClockerError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error building the HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., reading the confirmation from stdin).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

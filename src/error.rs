//! Error types for the few edges that can actually fail.
//!
//! Services themselves never return errors: bad persisted state and out of
//! range input are defaulted or clamped. These types cover loading
//! configuration and talking to browser APIs.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Failure to load a [`crate::config::SettingsConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid settings config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A browser API was missing or threw.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("{what} is unavailable")]
    Unavailable { what: &'static str },
    #[error("{op} failed: {detail}")]
    Js { op: &'static str, detail: String },
}

impl HostError {
    #[must_use]
    pub fn unavailable(what: &'static str) -> Self {
        Self::Unavailable { what }
    }
}

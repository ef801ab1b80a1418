//! # UI Error Types
//!
//! Errors only come out of construction paths (configuration, layout rule
//! parsing). Frame operations contain failures locally and never return
//! these to the host.

use thiserror::Error;

/// Errors that can occur while building UI state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UiError {
    /// Container configuration could not be parsed.
    #[error("invalid container configuration: {0}")]
    Config(String),

    /// A layout token did not match the ruleset grammar.
    #[error("invalid layout token '{token}': {reason}")]
    InvalidLayoutToken {
        /// The offending token.
        token: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A screen-size bucket name was not recognised.
    #[error("unknown screen size '{0}'")]
    UnknownScreenSize(String),
}

impl From<toml::de::Error> for UiError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for UI construction.
pub type UiResult<T> = Result<T, UiError>;

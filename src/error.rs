//! Error types
//!
//! Gateway and submission failures never reach the simulation; they are
//! logged and surfaced to the player as messages.

use thiserror::Error;

/// Failures talking to the leaderboard backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No backend endpoint configured for this build/session
    #[error("leaderboard backend not configured")]
    NotConfigured,

    /// Anonymous sign-in was refused
    #[error("sign-in failed: {0}")]
    Auth(String),

    /// Backend answered with a non-success status
    #[error("backend returned {status}: {message}")]
    Http { status: u16, message: String },

    /// Request never completed
    #[error("network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape
    #[error("malformed response: {0}")]
    Decode(String),
}

/// A leaderboard submission rejected before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("please enter a name")]
    NameEmpty,

    #[error("name is {len} characters, at most {max} allowed")]
    NameTooLong { len: usize, max: usize },

    #[error("please enter a valid email address")]
    InvalidEmail,

    /// Form submitted while no high score is pending
    #[error("no score is waiting to be submitted")]
    NotAccepting,
}

/// Tuning/config could not be loaded
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value: {0}")]
    Invalid(String),
}

//! Client-side error types.
//!
//! Errors raised while a call runs are [`ChainError`]s from `hopchain-core`;
//! this module only adds [`ClientBuildError`] for misconfiguration caught in
//! [`ClientBuilder::build`](crate::ClientBuilder::build).

pub use hopchain_core::{ChainError, ProtocolViolation};

/// Error returned when a client or transport cannot be built.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ClientBuildError {
    /// A configured timeout is negative, too large or too small.
    #[error(transparent)]
    InvalidTimeout(ChainError),

    /// The retry policy is internally inconsistent.
    #[error("invalid retry policy: {0}")]
    InvalidRetryPolicy(&'static str),

    /// The user agent is not a valid header value.
    #[error("invalid user agent: {0:?}")]
    InvalidUserAgent(String),

    /// The HTTP transport could not be created.
    #[error("failed to create transport: {0}")]
    Transport(String),
}

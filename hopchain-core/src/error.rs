//! Chain error types.
//!
//! This module provides the error types produced while running a request
//! through an interceptor chain:
//! - [`ChainError`]: every failure a call can surface
//! - [`ProtocolViolation`]: a stage broke the chain's structural contract

/// A breach of the chain contract by a stage.
///
/// Every variant names the offending stage so a misbehaving interceptor can
/// be found quickly in a pipeline assembled from independently written parts.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolViolation {
    /// A request was redirected to a different scheme/host/port after a
    /// transport session had already been established.
    #[error("network interceptor {stage} must retain the same host and port (session {expected}, request {actual})")]
    TargetChanged {
        stage: String,
        expected: String,
        actual: String,
    },

    /// A stage running with an attached session did not call `proceed`
    /// exactly once.
    #[error("network interceptor {stage} must call proceed() exactly once (called {calls} times)")]
    ProceedNotOnce { stage: String, calls: u32 },

    /// A stage returned a response without a body.
    #[error("interceptor {stage} returned a response with no body")]
    MissingBody { stage: String },

    /// A stage tried to attach a second session to a chain that already
    /// carries one.
    #[error("interceptor {stage} attached an exchange to a chain that already carries one")]
    ExchangeAlreadyAttached { stage: String },
}

impl ProtocolViolation {
    /// The name of the stage that violated the contract.
    pub fn stage(&self) -> &str {
        match self {
            ProtocolViolation::TargetChanged { stage, .. }
            | ProtocolViolation::ProceedNotOnce { stage, .. }
            | ProtocolViolation::MissingBody { stage }
            | ProtocolViolation::ExchangeAlreadyAttached { stage } => stage,
        }
    }
}

/// Errors surfaced by a call running through the chain.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ChainError {
    /// `proceed` was called past the last stage. This is an engine
    /// consistency failure and is never retried.
    #[error("interceptor chain exhausted: index {index} with {len} interceptors")]
    Exhausted { index: usize, len: usize },

    /// A stage broke the chain contract.
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),

    /// A timeout override was outside the accepted range.
    #[error("invalid {name}: {reason}")]
    InvalidTimeout {
        name: &'static str,
        reason: &'static str,
    },

    /// The request could not be built or has no usable target.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Transport-level failure (connect refused, reset, TLS, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// A connect, read or write timeout elapsed.
    #[error("timeout: {0}")]
    Timeout(String),

    /// The owning call was canceled.
    #[error("call canceled")]
    Canceled,

    /// The call was already executed once.
    #[error("call already executed")]
    AlreadyExecuted,

    /// The terminal stage ran without an attached exchange.
    #[error("no exchange attached to the chain")]
    NoExchange,

    /// Response body decoding failed.
    #[error("decode error: {0}")]
    Decode(String),

    /// A failure authored by an interceptor.
    #[error("interceptor error: {0}")]
    Interceptor(String),
}

impl ChainError {
    /// Create an interceptor-authored error.
    pub fn interceptor<S: Into<String>>(message: S) -> Self {
        ChainError::Interceptor(message.into())
    }

    /// Create a transport error.
    pub fn transport<S: Into<String>>(message: S) -> Self {
        ChainError::Transport(message.into())
    }

    /// Returns the protocol violation, if this error is one.
    pub fn violation(&self) -> Option<&ProtocolViolation> {
        match self {
            ChainError::Protocol(violation) => Some(violation),
            _ => None,
        }
    }

    /// Returns whether this error is a detected contract breach by a stage.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, ChainError::Protocol(_))
    }

    /// Returns whether this error indicates a transient condition that may
    /// be resolved by retrying the whole call.
    ///
    /// Only transport failures and timeouts qualify. Protocol violations and
    /// engine failures are programming errors and are never retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChainError::Transport(_) | ChainError::Timeout(_))
    }
}

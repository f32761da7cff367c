//! Core chain executor for hopchain.
//!
//! This crate holds the part of the client that has real protocol contracts:
//! the [`Chain`] that threads one request through an ordered list of
//! [`Interceptor`]s and checks that every stage played by the rules.
//!
//! ## Modules
//!
//! - [`chain`]: the position-indexed chain view and `proceed`
//! - [`interceptor`]: the stage trait
//! - [`exchange`]: the transport session boundary
//! - [`error`]: [`ChainError`] and [`ProtocolViolation`]
//! - [`request`], [`response`], [`address`], [`timeout`], [`call`]: value types
//!
//! The crate does no I/O. Transports and concrete stages live in
//! `hopchain-client`.

pub mod address;
pub mod call;
pub mod chain;
pub mod error;
pub mod exchange;
pub mod interceptor;
pub mod request;
pub mod response;
pub mod timeout;

pub use address::{Address, Scheme};
pub use call::CallHandle;
pub use chain::Chain;
pub use error::{ChainError, ProtocolViolation};
pub use exchange::Exchange;
pub use interceptor::Interceptor;
pub use request::{Request, RequestBuilder};
pub use response::{Response, ResponseBody};
pub use timeout::{MAX_TIMEOUT_MS, Timeouts, check_duration};

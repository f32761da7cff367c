//! Blocking HTTP client built on the hopchain interceptor chain.
//!
//! Every call runs through an ordered pipeline of [`Interceptor`]s. The
//! application contributes stages at two points: before connection handling
//! (application interceptors) and after the connection is attached (network
//! interceptors). The chain enforces the contract of each position and
//! reports breaches as [`ProtocolViolation`]s naming the offending stage.
//!
//! ## Features
//!
//! - HTTP/1.1 over hyper, TLS through rustls (`tls` feature, on by default)
//! - Per-client and per-call connect, read and write timeouts
//! - Retries with exponential backoff ([`RetryPolicy`])
//! - Request/response logging through `tracing` ([`LoggingInterceptor`],
//!   `tracing` feature, on by default)
//!
//! ## Example
//!
//! ```no_run
//! use hopchain_client::{Client, HeaderInterceptor, Request};
//! use std::time::Duration;
//!
//! let client = Client::builder()
//!     .add_interceptor(HeaderInterceptor::new("accept", "application/json")?)
//!     .read_timeout(Duration::from_secs(30))
//!     .build()?;
//!
//! let request = Request::get("https://api.github.com/repos/square/okhttp/contributors")?;
//! let response = client.execute(request)?;
//! println!("{} ({} bytes)", response.status(), response.body().map_or(0, |b| b.len()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Threading
//!
//! Calls block the calling thread. Do not execute calls, or drop the last
//! clone of a [`Client`] using the default transport, from inside an async
//! runtime.

mod builder;
mod client;
pub mod config;
mod error;
pub mod interceptor;
#[cfg(test)]
mod testing;
pub mod transport;

pub use builder::{ClientBuilder, DEFAULT_USER_AGENT};
pub use client::{Call, Client};
pub use config::{CallOptions, ExponentialBackoff, FnInterceptor, HeaderInterceptor, RetryPolicy};
pub use error::{ChainError, ClientBuildError, ProtocolViolation};
pub use interceptor::{
    BridgeInterceptor, CallServerInterceptor, ConnectInterceptor, RetryInterceptor,
};
#[cfg(feature = "tracing")]
pub use interceptor::{LogLevel, LoggingInterceptor};
pub use transport::{HyperExchange, HyperTransport, HyperTransportBuilder, Transport};

// Re-export core types for convenience
pub use hopchain_core::{
    Address, CallHandle, Chain, Exchange, Interceptor, Request, RequestBuilder, Response,
    ResponseBody, Scheme, Timeouts,
};

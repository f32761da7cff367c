//! Built-in stages of the client pipeline.
//!
//! For every call the client runs, in order:
//!
//! 1. application interceptors ([`ClientBuilder::add_interceptor`](crate::ClientBuilder::add_interceptor))
//! 2. [`RetryInterceptor`], when a retry policy is configured
//! 3. [`BridgeInterceptor`]
//! 4. [`ConnectInterceptor`], which attaches the exchange
//! 5. network interceptors ([`ClientBuilder::add_network_interceptor`](crate::ClientBuilder::add_network_interceptor))
//! 6. [`CallServerInterceptor`]
//!
//! Stages before the connect stage may proceed any number of times; the
//! network interceptors after it must proceed exactly once and keep the
//! target unchanged.

mod bridge;
mod call_server;
mod connect;
#[cfg(feature = "tracing")]
mod logging;
mod retry;

pub use bridge::BridgeInterceptor;
pub use call_server::CallServerInterceptor;
pub use connect::ConnectInterceptor;
#[cfg(feature = "tracing")]
pub use logging::{LogLevel, LoggingInterceptor};
pub use retry::RetryInterceptor;

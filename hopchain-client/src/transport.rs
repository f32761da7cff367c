//! Connection establishment.
//!
//! A [`Transport`] turns an [`Address`] into a live [`Exchange`]. The built-in
//! [`ConnectInterceptor`](crate::ConnectInterceptor) calls it once per
//! attempt and attaches the result to the chain.
//!
//! [`HyperTransport`] is the default: HTTP/1.1 over hyper's connection API,
//! with TLS through rustls (feature-gated). Each exchange owns one
//! connection; there is no pooling.
//!
//! # Feature Flags
//!
//! - `tls` (default) - Enables `tls-ring` + `tls-native-roots` for convenience
//! - `tls-ring` / `tls-aws-lc` - Crypto providers
//! - `tls-native-roots` / `tls-webpki-roots` - Root certificates

use std::fmt;
use std::sync::Arc;

use hopchain_core::{Address, ChainError, Exchange, Timeouts};

mod body;
mod connector;
mod hyper;

pub use connector::{
    DangerousAcceptAnyCertVerifier, build_http_connector, build_https_connector,
    danger_accept_invalid_certs_config, default_tls_config, has_tls_support,
};
pub use hyper::{HyperExchange, HyperTransport, HyperTransportBuilder};

// Re-export rustls types that users might need for TLS configuration
pub use rustls::ClientConfig as TlsClientConfig;

/// Opens transport sessions.
///
/// Implementations honor `timeouts.connect` while connecting. Read and write
/// timeouts reach the exchange per request through [`Exchange::send`].
pub trait Transport: Send + Sync + fmt::Debug {
    fn connect(&self, address: &Address, timeouts: Timeouts)
    -> Result<Arc<dyn Exchange>, ChainError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn connect(
        &self,
        address: &Address,
        timeouts: Timeouts,
    ) -> Result<Arc<dyn Exchange>, ChainError> {
        (**self).connect(address, timeouts)
    }
}

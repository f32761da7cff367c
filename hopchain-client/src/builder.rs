//! Fluent configuration for [`Client`].

use std::sync::Arc;
use std::time::Duration;

use http::HeaderValue;
use hopchain_core::{Interceptor, Timeouts, check_duration};

use crate::client::Client;
use crate::transport::{HyperTransport, TlsClientConfig, Transport};
use crate::{
    BridgeInterceptor, CallServerInterceptor, ClientBuildError, ConnectInterceptor,
    RetryInterceptor, RetryPolicy,
};

/// Default `User-Agent` sent when the application sets none.
pub const DEFAULT_USER_AGENT: &str = concat!("hopchain/", env!("CARGO_PKG_VERSION"));

/// Builder for creating a [`Client`].
///
/// # Example
///
/// ```no_run
/// use hopchain_client::{Client, HeaderInterceptor, RetryPolicy};
/// use std::time::Duration;
///
/// let client = Client::builder()
///     .add_interceptor(HeaderInterceptor::new("authorization", "Bearer token123")?)
///     .connect_timeout(Duration::from_secs(5))
///     .read_timeout(Duration::from_secs(30))
///     .retry_policy(RetryPolicy::default())
///     .build()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ClientBuilder {
    interceptors: Vec<Arc<dyn Interceptor>>,
    network_interceptors: Vec<Arc<dyn Interceptor>>,
    connect_timeout: Duration,
    read_timeout: Duration,
    write_timeout: Duration,
    retry_policy: Option<RetryPolicy>,
    user_agent: String,
    transport: Option<Arc<dyn Transport>>,
    tls_config: Option<TlsClientConfig>,
    danger_accept_invalid_certs: bool,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("interceptor_count", &self.interceptors.len())
            .field("network_interceptor_count", &self.network_interceptors.len())
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("write_timeout", &self.write_timeout)
            .field("retry_policy", &self.retry_policy)
            .field("user_agent", &self.user_agent)
            .field("transport", &self.transport)
            .field("tls_config", &self.tls_config.is_some())
            .field("danger_accept_invalid_certs", &self.danger_accept_invalid_certs)
            .finish()
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Create a builder with 10 second timeouts, no retries and the default
    /// hyper transport.
    pub fn new() -> Self {
        let timeouts = Timeouts::default();
        Self {
            interceptors: Vec::new(),
            network_interceptors: Vec::new(),
            connect_timeout: timeouts.connect,
            read_timeout: timeouts.read,
            write_timeout: timeouts.write,
            retry_policy: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            transport: None,
            tls_config: None,
            danger_accept_invalid_certs: false,
        }
    }

    /// Add an application interceptor.
    ///
    /// Application interceptors run first, once per call, before any retry
    /// or connection handling. They may short-circuit or proceed several
    /// times.
    pub fn add_interceptor<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Add a network interceptor.
    ///
    /// Network interceptors run after the connection is attached, once per
    /// attempt. Each must call `proceed` exactly once and must not change the
    /// request's scheme, host or port.
    pub fn add_network_interceptor<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.network_interceptors.push(Arc::new(interceptor));
        self
    }

    /// Zero means no timeout. Validated in [`ClientBuilder::build`].
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Zero means no timeout. Validated in [`ClientBuilder::build`].
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Zero means no timeout. Validated in [`ClientBuilder::build`].
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Retry transient failures with `policy`.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Use a custom transport instead of [`HyperTransport`].
    ///
    /// The TLS settings of this builder only apply to the default transport.
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Set a custom TLS configuration for the default transport.
    pub fn tls_config(mut self, config: TlsClientConfig) -> Self {
        self.tls_config = Some(config);
        self
    }

    /// Accept invalid TLS certificates.
    ///
    /// # Warning
    ///
    /// This is extremely dangerous and should only be used for development/testing!
    pub fn danger_accept_invalid_certs(mut self) -> Self {
        self.danger_accept_invalid_certs = true;
        self
    }

    /// Validate the configuration and assemble the pipeline.
    pub fn build(self) -> Result<Client, ClientBuildError> {
        let timeouts = Timeouts::new(
            check_duration("connect timeout", self.connect_timeout)
                .map_err(ClientBuildError::InvalidTimeout)?,
            check_duration("read timeout", self.read_timeout)
                .map_err(ClientBuildError::InvalidTimeout)?,
            check_duration("write timeout", self.write_timeout)
                .map_err(ClientBuildError::InvalidTimeout)?,
        );

        if let Some(policy) = &self.retry_policy {
            policy
                .validate()
                .map_err(ClientBuildError::InvalidRetryPolicy)?;
        }

        let user_agent = HeaderValue::from_str(&self.user_agent)
            .map_err(|_| ClientBuildError::InvalidUserAgent(self.user_agent.clone()))?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let mut builder = HyperTransport::builder();
                if let Some(config) = self.tls_config {
                    builder = builder.tls_config(config);
                }
                if self.danger_accept_invalid_certs {
                    builder = builder.danger_accept_invalid_certs();
                }
                Arc::new(builder.build()?)
            }
        };

        let mut pipeline = self.interceptors;
        if let Some(policy) = self.retry_policy {
            pipeline.push(Arc::new(RetryInterceptor::new(policy)));
        }
        pipeline.push(Arc::new(BridgeInterceptor::new(user_agent)));
        pipeline.push(Arc::new(ConnectInterceptor::new(transport)));
        pipeline.extend(self.network_interceptors);
        pipeline.push(Arc::new(CallServerInterceptor));

        #[cfg(feature = "tracing")]
        tracing::debug!(stages = pipeline.len(), ?timeouts, "client built");

        Ok(Client::from_parts(pipeline, timeouts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;

    fn builder() -> ClientBuilder {
        ClientBuilder::new().transport(MockTransport::default())
    }

    #[test]
    fn test_defaults() {
        let client = builder().build().unwrap();
        assert_eq!(client.timeouts(), Timeouts::default());
        // bridge, connect, call-server
        assert_eq!(client.pipeline_len(), 3);
    }

    #[test]
    fn test_pipeline_assembly() {
        let client = builder()
            .add_interceptor(crate::HeaderInterceptor::new("x-a", "1").unwrap())
            .add_network_interceptor(crate::HeaderInterceptor::new("x-b", "2").unwrap())
            .retry_policy(RetryPolicy::no_retry())
            .build()
            .unwrap();
        assert_eq!(client.pipeline_len(), 6);
    }

    #[test]
    fn test_invalid_timeouts() {
        let err = builder()
            .read_timeout(Duration::from_micros(10))
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid read timeout: too small");

        let err = builder()
            .connect_timeout(Duration::from_millis(i32::MAX as u64 + 1))
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid connect timeout: too large");

        let client = builder().write_timeout(Duration::ZERO).build().unwrap();
        assert_eq!(client.timeouts().write, Duration::ZERO);
    }

    #[test]
    fn test_invalid_retry_policy() {
        let policy = RetryPolicy {
            base_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(1),
            ..Default::default()
        };
        let err = builder().retry_policy(policy).build().unwrap_err();
        assert!(matches!(err, ClientBuildError::InvalidRetryPolicy(_)));
    }

    #[test]
    fn test_invalid_user_agent() {
        let err = builder().user_agent("bad\nagent").build().unwrap_err();
        assert!(matches!(err, ClientBuildError::InvalidUserAgent(_)));
    }
}

//! Opens the transport session for an attempt.

use std::sync::Arc;

use hopchain_core::{Chain, ChainError, Interceptor, Response};

use crate::Transport;

/// Connects to the request's address and attaches the resulting exchange.
///
/// Runs once per attempt: a retry stage in front of it gets a fresh
/// connection for every pass.
#[derive(Debug)]
pub struct ConnectInterceptor {
    transport: Arc<dyn Transport>,
}

impl ConnectInterceptor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

impl Interceptor for ConnectInterceptor {
    fn intercept(&self, chain: &Chain<'_>) -> Result<Response, ChainError> {
        if chain.call().is_canceled() {
            return Err(ChainError::Canceled);
        }

        let address = chain.request().address()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(%address, connect_timeout_ms = chain.connect_timeout().as_millis() as u64, "connecting");

        let exchange = self.transport.connect(&address, chain.timeouts())?;
        chain.proceed_with_exchange(chain.request().clone(), exchange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockTransport, Script};
    use crate::CallServerInterceptor;
    use hopchain_core::{CallHandle, Request, Timeouts};

    #[test]
    fn test_connects_once_per_attempt() {
        let transport = Arc::new(MockTransport::default());
        let stages: Vec<Arc<dyn Interceptor>> = vec![
            Arc::new(ConnectInterceptor::new(transport.clone())),
            Arc::new(CallServerInterceptor),
        ];

        let response = crate::testing::run(&stages, "http://localhost:8080/").unwrap();
        assert!(response.is_success());
        assert_eq!(transport.connects(), 1);
    }

    #[test]
    fn test_canceled_before_connect() {
        let transport = Arc::new(MockTransport::new(Script::default()));
        let stages: Vec<Arc<dyn Interceptor>> = vec![
            Arc::new(ConnectInterceptor::new(transport.clone())),
            Arc::new(CallServerInterceptor),
        ];

        let call = CallHandle::new();
        call.cancel();
        let chain = Chain::new(&stages, &call, Request::get("http://localhost/").unwrap(), Timeouts::default());

        let err = chain.proceed(chain.request().clone()).unwrap_err();
        assert!(matches!(err, ChainError::Canceled));
        assert_eq!(transport.connects(), 0);
    }
}

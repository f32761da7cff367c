//! The terminal stage.

use hopchain_core::{Chain, ChainError, Interceptor, Response};

/// Sends the request through the attached exchange and returns the response.
///
/// Must be last in the pipeline. Fails with [`ChainError::NoExchange`] when
/// no connect stage ran before it.
#[derive(Clone, Copy, Debug, Default)]
pub struct CallServerInterceptor;

impl Interceptor for CallServerInterceptor {
    fn intercept(&self, chain: &Chain<'_>) -> Result<Response, ChainError> {
        let exchange = chain.exchange().ok_or(ChainError::NoExchange)?;
        if chain.call().is_canceled() {
            return Err(ChainError::Canceled);
        }
        exchange.send(chain.request().clone(), chain.timeouts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ConnectStub, run};
    use std::sync::Arc;

    #[test]
    fn test_without_exchange() {
        let stages: Vec<Arc<dyn Interceptor>> = vec![Arc::new(CallServerInterceptor)];
        let err = run(&stages, "http://localhost/").unwrap_err();
        assert!(matches!(err, ChainError::NoExchange));
    }

    #[test]
    fn test_sends_through_exchange() {
        let stages: Vec<Arc<dyn Interceptor>> =
            vec![Arc::new(ConnectStub), Arc::new(CallServerInterceptor)];
        let response = run(&stages, "http://localhost/").unwrap();
        assert_eq!(response.body().unwrap().text().unwrap(), "ok");
    }
}

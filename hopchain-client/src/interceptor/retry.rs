//! Re-runs the rest of the chain on transient failures.

use hopchain_core::{Chain, ChainError, Interceptor, Response};

use crate::RetryPolicy;

/// Retries the downstream stages according to a [`RetryPolicy`].
///
/// Sits before the connect stage, so every attempt opens a fresh exchange.
/// The call's cancellation flag is checked before each attempt.
#[derive(Clone, Debug)]
pub struct RetryInterceptor {
    policy: RetryPolicy,
}

impl RetryInterceptor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl Interceptor for RetryInterceptor {
    fn intercept(&self, chain: &Chain<'_>) -> Result<Response, ChainError> {
        let mut backoff = self.policy.backoff();

        loop {
            if chain.call().is_canceled() {
                return Err(ChainError::Canceled);
            }

            let outcome = chain.proceed(chain.request().clone());
            let retry = match &outcome {
                Ok(response) => self.policy.should_retry_status(response.status()),
                Err(e) => self.policy.should_retry_error(e, chain.request().method()),
            };
            if !retry || !backoff.can_retry() {
                return outcome;
            }

            let delay = backoff.next_delay();
            #[cfg(feature = "tracing")]
            match &outcome {
                Ok(response) => tracing::debug!(
                    status = response.status().as_u16(),
                    attempt = backoff.attempts(),
                    delay_ms = delay.as_millis() as u64,
                    "retrying after retryable status"
                ),
                Err(e) => tracing::debug!(
                    error = %e,
                    attempt = backoff.attempts(),
                    delay_ms = delay.as_millis() as u64,
                    "retrying after transient error"
                ),
            }
            std::thread::sleep(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockTransport, Script};
    use crate::{CallServerInterceptor, ConnectInterceptor};
    use http::StatusCode;
    use hopchain_core::{CallHandle, Request, Timeouts};
    use std::sync::Arc;
    use std::time::Duration;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new()
            .max_retries(max_retries)
            .base_delay(Duration::ZERO)
            .jitter(0.0)
    }

    fn pipeline(policy: RetryPolicy, transport: Arc<MockTransport>) -> Vec<Arc<dyn Interceptor>> {
        vec![
            Arc::new(RetryInterceptor::new(policy)),
            Arc::new(ConnectInterceptor::new(transport)),
            Arc::new(CallServerInterceptor),
        ]
    }

    #[test]
    fn test_retries_transient_errors() {
        let script = Script::new([
            Err(ChainError::transport("connection reset")),
            Err(ChainError::Timeout("read timed out".into())),
            Ok(StatusCode::OK),
        ]);
        let transport = Arc::new(MockTransport::new(script));
        let stages = pipeline(fast_policy(3), transport.clone());

        let response = crate::testing::run(&stages, "http://localhost/").unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(transport.connects(), 3);
    }

    #[test]
    fn test_retries_configured_statuses() {
        let script = Script::new([Ok(StatusCode::SERVICE_UNAVAILABLE), Ok(StatusCode::OK)]);
        let transport = Arc::new(MockTransport::new(script));
        let stages = pipeline(fast_policy(3), transport.clone());

        let response = crate::testing::run(&stages, "http://localhost/").unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(transport.connects(), 2);
    }

    #[test]
    fn test_gives_up_after_max_retries() {
        let script = Script::new([
            Ok(StatusCode::BAD_GATEWAY),
            Ok(StatusCode::BAD_GATEWAY),
            Ok(StatusCode::BAD_GATEWAY),
        ]);
        let transport = Arc::new(MockTransport::new(script));
        let stages = pipeline(fast_policy(2), transport.clone());

        let response = crate::testing::run(&stages, "http://localhost/").unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(transport.connects(), 3);
    }

    #[test]
    fn test_does_not_retry_other_failures() {
        let script = Script::new([Ok(StatusCode::INTERNAL_SERVER_ERROR)]);
        let transport = Arc::new(MockTransport::new(script));
        let stages = pipeline(fast_policy(3), transport.clone());

        let response = crate::testing::run(&stages, "http://localhost/").unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(transport.connects(), 1);

        let script = Script::new([Err(ChainError::interceptor("boom"))]);
        let transport = Arc::new(MockTransport::new(script));
        let stages = pipeline(fast_policy(3), transport.clone());

        let err = crate::testing::run(&stages, "http://localhost/").unwrap_err();
        assert!(matches!(err, ChainError::Interceptor(_)));
        assert_eq!(transport.connects(), 1);
    }

    #[test]
    fn test_timeout_of_non_idempotent_request_is_not_replayed() {
        let post = || {
            Request::builder()
                .method(http::Method::POST)
                .uri("http://localhost/orders")
                .body("{}")
                .build()
                .unwrap()
        };

        let script = Script::new([Err(ChainError::Timeout("read timed out after 10 ms".into()))]);
        let transport = Arc::new(MockTransport::new(script));
        let stages = pipeline(fast_policy(3), transport.clone());
        let call = CallHandle::new();
        let chain = Chain::new(&stages, &call, post(), Timeouts::default());

        let err = chain.proceed(chain.request().clone()).unwrap_err();
        assert!(matches!(err, ChainError::Timeout(_)));
        assert_eq!(transport.connects(), 1);

        let script = Script::new([Err(ChainError::transport("connection reset")), Ok(StatusCode::OK)]);
        let transport = Arc::new(MockTransport::new(script));
        let stages = pipeline(fast_policy(3), transport.clone());
        let chain = Chain::new(&stages, &call, post(), Timeouts::default());

        assert_eq!(chain.proceed(chain.request().clone()).unwrap().status(), StatusCode::OK);
        assert_eq!(transport.connects(), 2);
    }

    #[test]
    fn test_canceled_call_is_not_attempted() {
        let transport = Arc::new(MockTransport::default());
        let stages = pipeline(fast_policy(3), transport.clone());

        let call = CallHandle::new();
        call.cancel();
        let chain = Chain::new(&stages, &call, Request::get("http://localhost/").unwrap(), Timeouts::default());

        assert!(matches!(
            chain.proceed(chain.request().clone()),
            Err(ChainError::Canceled)
        ));
        assert_eq!(transport.connects(), 0);
    }
}

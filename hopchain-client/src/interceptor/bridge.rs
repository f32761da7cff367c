//! Fills the headers every HTTP/1.1 request needs.

use http::HeaderValue;
use http::header::{CONTENT_LENGTH, HOST, USER_AGENT};
use hopchain_core::{Chain, ChainError, Interceptor, Response};

/// Adds `Host`, `User-Agent` and `Content-Length` when the application did
/// not set them.
#[derive(Clone, Debug)]
pub struct BridgeInterceptor {
    user_agent: HeaderValue,
}

impl BridgeInterceptor {
    pub fn new(user_agent: HeaderValue) -> Self {
        Self { user_agent }
    }
}

impl Interceptor for BridgeInterceptor {
    fn intercept(&self, chain: &Chain<'_>) -> Result<Response, ChainError> {
        let mut request = chain.request().clone();
        let address = request.address()?;
        let content_length = request.body().map(|body| body.len());
        let headers = request.headers_mut();

        if !headers.contains_key(HOST) {
            let host = HeaderValue::from_str(&address.host_header())
                .map_err(|e| ChainError::InvalidRequest(format!("invalid host: {}", e)))?;
            headers.insert(HOST, host);
        }
        if !headers.contains_key(USER_AGENT) {
            headers.insert(USER_AGENT, self.user_agent.clone());
        }
        if let Some(len) = content_length {
            if !headers.contains_key(CONTENT_LENGTH) {
                headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
            }
        }

        chain.proceed(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Echo, run};
    use std::sync::Arc;

    fn stages(bridge: BridgeInterceptor) -> Vec<Arc<dyn Interceptor>> {
        vec![Arc::new(bridge), Arc::new(Echo)]
    }

    #[test]
    fn test_fills_defaults() {
        let bridge = BridgeInterceptor::new(HeaderValue::from_static("hopchain-test"));
        let response = run(&stages(bridge), "http://example.com:8080/path").unwrap();

        let headers = response.request().headers();
        assert_eq!(headers[HOST], "example.com:8080");
        assert_eq!(headers[USER_AGENT], "hopchain-test");
        assert!(!headers.contains_key(CONTENT_LENGTH));
    }

    #[test]
    fn test_default_port_omitted() {
        let bridge = BridgeInterceptor::new(HeaderValue::from_static("hopchain-test"));
        let response = run(&stages(bridge), "https://example.com/").unwrap();
        assert_eq!(response.request().headers()[HOST], "example.com");
    }

    #[test]
    fn test_keeps_application_headers() {
        use hopchain_core::{CallHandle, Request, Timeouts};

        let stages = stages(BridgeInterceptor::new(HeaderValue::from_static("hopchain-test")));
        let call = CallHandle::new();
        let request = Request::builder()
            .method(http::Method::POST)
            .uri("http://example.com/upload")
            .header("user-agent", "custom/1.0")
            .body("hello")
            .build()
            .unwrap();
        let chain = Chain::new(&stages, &call, request, Timeouts::default());

        let response = chain.proceed(chain.request().clone()).unwrap();
        let headers = response.request().headers();
        assert_eq!(headers[USER_AGENT], "custom/1.0");
        assert_eq!(headers[CONTENT_LENGTH], "5");
    }
}

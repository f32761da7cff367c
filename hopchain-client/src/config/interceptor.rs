//! Ready-made application interceptors.
//!
//! # Example
//!
//! ```no_run
//! use hopchain_client::{Client, FnInterceptor, HeaderInterceptor};
//!
//! let auth = HeaderInterceptor::new("authorization", "Bearer token123")?;
//!
//! let short_circuit = FnInterceptor::new("deny-admin", |chain| {
//!     if chain.request().uri().path().starts_with("/admin") {
//!         return Err(hopchain_client::ChainError::interceptor("admin paths are blocked"));
//!     }
//!     chain.proceed(chain.request().clone())
//! });
//!
//! let client = Client::builder()
//!     .add_interceptor(auth)
//!     .add_interceptor(short_circuit)
//!     .build()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::borrow::Cow;
use std::fmt;

use http::{HeaderName, HeaderValue};
use hopchain_core::{Chain, ChainError, Interceptor, Response};

/// Sets one header on every request passing through.
///
/// An existing header with the same name is replaced.
#[derive(Clone, Debug)]
pub struct HeaderInterceptor {
    name: HeaderName,
    value: HeaderValue,
}

impl HeaderInterceptor {
    /// Create a header interceptor, validating the name and value.
    pub fn new(name: &str, value: &str) -> Result<Self, ChainError> {
        let name = name
            .parse()
            .map_err(|_| ChainError::InvalidRequest(format!("invalid header name: {}", name)))?;
        let value = value
            .parse()
            .map_err(|_| ChainError::InvalidRequest(format!("invalid header value: {:?}", value)))?;
        Ok(Self { name, value })
    }

    /// Create a header interceptor from pre-parsed values.
    pub fn from_parts(name: HeaderName, value: HeaderValue) -> Self {
        Self { name, value }
    }
}

impl Interceptor for HeaderInterceptor {
    fn intercept(&self, chain: &Chain<'_>) -> Result<Response, ChainError> {
        let mut request = chain.request().clone();
        request
            .headers_mut()
            .insert(self.name.clone(), self.value.clone());
        chain.proceed(request)
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("HeaderInterceptor({})", self.name))
    }
}

/// Adapts a closure to the [`Interceptor`] trait.
///
/// The closure receives the chain exactly like a hand-written stage and
/// carries the same obligations.
pub struct FnInterceptor<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> FnInterceptor<F>
where
    F: Fn(&Chain<'_>) -> Result<Response, ChainError> + Send + Sync,
{
    /// Create an interceptor named `name` from `f`.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> fmt::Debug for FnInterceptor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInterceptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F> Interceptor for FnInterceptor<F>
where
    F: Fn(&Chain<'_>) -> Result<Response, ChainError> + Send + Sync,
{
    fn intercept(&self, chain: &Chain<'_>) -> Result<Response, ChainError> {
        (self.f)(chain)
    }

    fn name(&self) -> Cow<'static, str> {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Echo, run};
    use http::StatusCode;
    use std::sync::Arc;

    #[test]
    fn test_header_interceptor() {
        let stages: Vec<Arc<dyn Interceptor>> = vec![
            Arc::new(HeaderInterceptor::new("x-custom-header", "test-value").unwrap()),
            Arc::new(Echo),
        ];

        let response = run(&stages, "http://localhost/").unwrap();
        assert_eq!(
            response.request().headers()["x-custom-header"],
            "test-value"
        );
    }

    #[test]
    fn test_header_interceptor_replaces() {
        let stages: Vec<Arc<dyn Interceptor>> = vec![
            Arc::new(HeaderInterceptor::new("x-first", "1").unwrap()),
            Arc::new(HeaderInterceptor::new("x-first", "2").unwrap()),
            Arc::new(Echo),
        ];

        let response = run(&stages, "http://localhost/").unwrap();
        let values: Vec<_> = response.request().headers().get_all("x-first").iter().collect();
        assert_eq!(values, vec!["2"]);
    }

    #[test]
    fn test_header_interceptor_invalid() {
        assert!(HeaderInterceptor::new("bad header", "v").is_err());
        assert!(HeaderInterceptor::new("x-ok", "line\nbreak").is_err());
    }

    #[test]
    fn test_fn_interceptor_short_circuit() {
        let stages: Vec<Arc<dyn Interceptor>> = vec![
            Arc::new(FnInterceptor::new("cache", |chain: &Chain<'_>| {
                Ok(Response::new(
                    chain.request().clone(),
                    StatusCode::NOT_MODIFIED,
                    Default::default(),
                ))
            })),
            Arc::new(Echo),
        ];

        let response = run(&stages, "http://localhost/").unwrap();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    }

    #[test]
    fn test_fn_interceptor_name_in_violation() {
        let stages: Vec<Arc<dyn Interceptor>> = vec![
            Arc::new(FnInterceptor::new("twice", |chain: &Chain<'_>| {
                chain.proceed(chain.request().clone())?;
                chain.proceed(chain.request().clone())
            })),
            Arc::new(crate::testing::ConnectStub),
            Arc::new(Echo),
        ];

        // Proceeding twice before the exchange is attached is allowed.
        assert!(run(&stages, "http://localhost/").is_ok());

        let stages: Vec<Arc<dyn Interceptor>> = vec![
            Arc::new(crate::testing::ConnectStub),
            Arc::new(FnInterceptor::new("twice", |chain: &Chain<'_>| {
                chain.proceed(chain.request().clone())?;
                chain.proceed(chain.request().clone())
            })),
            Arc::new(Echo),
        ];
        let err = run(&stages, "http://localhost/").unwrap_err();
        assert_eq!(err.violation().unwrap().stage(), "twice");
    }
}

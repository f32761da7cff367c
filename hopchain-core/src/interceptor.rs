//! The stage trait.
//!
//! Interceptors observe, rewrite, short-circuit or retry the request of a
//! call. Each one receives the chain positioned just past itself and decides
//! whether to call [`Chain::proceed`] and what to do with the response.
//!
//! # Example
//!
//! ```
//! use hopchain_core::{Chain, ChainError, Interceptor, Response};
//!
//! struct UserAgent;
//!
//! impl Interceptor for UserAgent {
//!     fn intercept(&self, chain: &Chain<'_>) -> Result<Response, ChainError> {
//!         let request = chain
//!             .request()
//!             .to_builder()
//!             .header("user-agent", "hopchain")
//!             .build()?;
//!         chain.proceed(request)
//!     }
//! }
//! ```

use std::borrow::Cow;

use crate::{Chain, ChainError, Response};

/// One pluggable stage of the chain.
///
/// Rules enforced by the chain:
/// - before a transport session is attached, a stage may call `proceed` any
///   number of times, including zero (short-circuit) or several (retry);
/// - once a session is attached, a stage must call `proceed` exactly once
///   and must not change the request's scheme, host or port;
/// - the returned response must carry a body.
pub trait Interceptor: Send + Sync {
    fn intercept(&self, chain: &Chain<'_>) -> Result<Response, ChainError>;

    /// Name used to identify this stage in protocol violations.
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(std::any::type_name::<Self>())
    }
}

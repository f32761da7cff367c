//! Client configuration.
//!
//! - [`CallOptions`]: per-call timeouts and headers
//! - [`RetryPolicy`]: retry behavior with exponential backoff
//! - [`HeaderInterceptor`] and [`FnInterceptor`]: small application stages

mod interceptor;
mod options;
mod retry;

pub use interceptor::{FnInterceptor, HeaderInterceptor};
pub use options::CallOptions;
pub use retry::{ExponentialBackoff, RetryPolicy, defaults};

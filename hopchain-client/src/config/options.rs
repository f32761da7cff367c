//! Per-call options.

use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue};

/// Options for one call that differ from the client defaults.
///
/// Timeouts set here are applied to the call's initial chain view through
/// [`Chain::with_connect_timeout`](hopchain_core::Chain::with_connect_timeout)
/// and friends, so every stage of the call observes them. Headers are added to
/// the request before the first stage runs, replacing any header of the same
/// name.
///
/// # Example
///
/// ```
/// use hopchain_client::CallOptions;
/// use std::time::Duration;
///
/// let options = CallOptions::new()
///     .read_timeout(Duration::from_secs(30))
///     .header("authorization", "Bearer token123");
/// assert_eq!(options.get_read_timeout(), Some(Duration::from_secs(30)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub(crate) connect_timeout: Option<Duration>,
    pub(crate) read_timeout: Option<Duration>,
    pub(crate) write_timeout: Option<Duration>,
    pub(crate) headers: HeaderMap,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    pub fn get_connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    pub fn get_read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    pub fn get_write_timeout(&self) -> Option<Duration> {
        self.write_timeout
    }

    /// Add a header for this call.
    ///
    /// Invalid names or values are ignored; use [`CallOptions::try_header`]
    /// to detect them.
    pub fn header<K, V>(mut self, name: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        V: TryInto<HeaderValue>,
    {
        if let (Ok(name), Ok(value)) = (name.try_into(), value.try_into()) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Try to add a header for this call.
    ///
    /// Returns `None` if the header name or value is invalid.
    pub fn try_header<K, V>(mut self, name: K, value: V) -> Option<Self>
    where
        K: TryInto<HeaderName>,
        V: TryInto<HeaderValue>,
    {
        let name = name.try_into().ok()?;
        let value = value.try_into().ok()?;
        self.headers.insert(name, value);
        Some(self)
    }

    /// Set all headers for this call, replacing any existing ones.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn get_headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether any timeout override is set.
    pub(crate) fn has_timeouts(&self) -> bool {
        self.connect_timeout.is_some() || self.read_timeout.is_some() || self.write_timeout.is_some()
    }
}

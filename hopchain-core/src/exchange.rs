//! The transport session boundary.

use std::fmt;

use http::Uri;

use crate::{Address, ChainError, Request, Response, Timeouts};

/// A live transport session for one network exchange.
///
/// An exchange is attached to the chain exactly once per call, by the stage
/// that establishes the connection. From then on the chain checks every
/// request against [`Exchange::supports_url`] and the terminal stage sends the
/// request through [`Exchange::send`].
pub trait Exchange: Send + Sync + fmt::Debug {
    /// The address this session is connected to.
    fn address(&self) -> &Address;

    /// Whether this session can keep serving `uri`.
    ///
    /// The default accepts URIs with the same scheme, host and port.
    fn supports_url(&self, uri: &Uri) -> bool {
        self.address().matches(uri)
    }

    /// Write `request` and read the full response, applying the read and
    /// write timeouts.
    fn send(&self, request: Request, timeouts: Timeouts) -> Result<Response, ChainError>;
}

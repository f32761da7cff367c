//! Response values returned up the chain.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::{ChainError, Request};

/// A fully buffered response body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseBody {
    bytes: Bytes,
}

impl ResponseBody {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// An empty body (e.g. for `HEAD` or `204 No Content`).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode the body as UTF-8 text.
    pub fn text(&self) -> Result<&str, ChainError> {
        std::str::from_utf8(&self.bytes)
            .map_err(|e| ChainError::Decode(format!("body is not utf-8: {}", e)))
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ChainError> {
        serde_json::from_slice(&self.bytes)
            .map_err(|e| ChainError::Decode(format!("invalid json body: {}", e)))
    }
}

/// An HTTP response.
///
/// The body is optional at the type level so that a stage handing back a
/// body-less response can be detected by the chain; every response leaving
/// a successful `proceed` has one.
#[derive(Clone, Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<ResponseBody>,
    request: Request,
}

impl Response {
    /// Create a response for `request` with the given status and body.
    pub fn new(request: Request, status: StatusCode, body: ResponseBody) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Some(body),
            request,
        }
    }

    /// Create a response that has no body at all.
    pub fn without_body(request: Request, status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: None,
            request,
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a mutable reference to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> Option<&ResponseBody> {
        self.body.as_ref()
    }

    pub fn into_body(self) -> Option<ResponseBody> {
        self.body
    }

    pub fn set_body(&mut self, body: ResponseBody) {
        self.body = Some(body);
    }

    /// The request that produced this response, as it was when it reached
    /// the network.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ChainError> {
        self.body
            .as_ref()
            .ok_or_else(|| ChainError::Decode("response has no body".into()))?
            .json()
    }
}

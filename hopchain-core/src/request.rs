//! Request values passed down the chain.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};

use crate::{Address, ChainError};

/// An HTTP request as seen by one position of the chain.
///
/// Requests are plain values. A stage that wants to rewrite the request
/// clones or rebuilds it and passes the new value to `proceed`.
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl Request {
    /// Start building a request.
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// Build a `GET` request for `uri`.
    pub fn get<U>(uri: U) -> Result<Self, ChainError>
    where
        U: TryInto<Uri>,
        U::Error: std::fmt::Display,
    {
        Self::builder().uri(uri).build()
    }

    /// Copy this request into a builder for rewriting.
    pub fn to_builder(&self) -> RequestBuilder {
        RequestBuilder {
            method: self.method.clone(),
            uri: Ok(Some(self.uri.clone())),
            headers: Ok(self.headers.clone()),
            body: self.body.clone(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a mutable reference to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// The target this request is sent to.
    pub fn address(&self) -> Result<Address, ChainError> {
        Address::from_uri(&self.uri)
    }

    /// The origin-form target (`/path?query`) for the request line.
    pub fn path_and_query(&self) -> &str {
        self.uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/")
    }
}

/// Builder for [`Request`].
///
/// Invalid parts are remembered and reported by [`RequestBuilder::build`].
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    uri: Result<Option<Uri>, String>,
    headers: Result<HeaderMap, String>,
    body: Option<Bytes>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: Method::GET,
            uri: Ok(None),
            headers: Ok(HeaderMap::new()),
            body: None,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn uri<U>(mut self, uri: U) -> Self
    where
        U: TryInto<Uri>,
        U::Error: std::fmt::Display,
    {
        self.uri = uri
            .try_into()
            .map(Some)
            .map_err(|e| format!("invalid uri: {}", e));
        self
    }

    /// Set a header, replacing any existing values for that name.
    pub fn header<K, V>(mut self, name: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        K::Error: std::fmt::Display,
        V: TryInto<HeaderValue>,
        V::Error: std::fmt::Display,
    {
        self.headers = self.headers.and_then(|mut headers| {
            let name = name
                .try_into()
                .map_err(|e| format!("invalid header name: {}", e))?;
            let value = value
                .try_into()
                .map_err(|e| format!("invalid header value: {}", e))?;
            headers.insert(name, value);
            Ok(headers)
        });
        self
    }

    /// Remove every value for a header.
    pub fn remove_header(mut self, name: &str) -> Self {
        if let Ok(headers) = &mut self.headers {
            headers.remove(name);
        }
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn build(self) -> Result<Request, ChainError> {
        let uri = self
            .uri
            .map_err(ChainError::InvalidRequest)?
            .ok_or_else(|| ChainError::InvalidRequest("request has no uri".into()))?;
        let headers = self.headers.map_err(ChainError::InvalidRequest)?;
        // Fail early on targets no transport could serve.
        Address::from_uri(&uri)?;
        Ok(Request {
            method: self.method,
            uri,
            headers,
            body: self.body,
        })
    }
}

//! Request targets.

use std::fmt;

use http::Uri;

use crate::ChainError;

/// URI scheme supported by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    /// Port used when the URI does not carry one.
    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

/// The scheme, host and port a request is sent to.
///
/// A transport session serves exactly one address; two requests can share a
/// session only if their addresses are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    scheme: Scheme,
    host: String,
    port: u16,
}

impl Address {
    pub fn new(scheme: Scheme, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme,
            host: host.into().to_ascii_lowercase(),
            port,
        }
    }

    /// Derive the address from an absolute `http`/`https` URI.
    pub fn from_uri(uri: &Uri) -> Result<Self, ChainError> {
        let scheme = match uri.scheme_str() {
            Some("http") => Scheme::Http,
            Some("https") => Scheme::Https,
            Some(other) => {
                return Err(ChainError::InvalidRequest(format!(
                    "unsupported scheme: {}",
                    other
                )));
            }
            None => {
                return Err(ChainError::InvalidRequest(format!(
                    "uri has no scheme: {}",
                    uri
                )));
            }
        };
        let host = uri
            .host()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ChainError::InvalidRequest(format!("uri has no host: {}", uri)))?;
        let port = uri.port_u16().unwrap_or_else(|| scheme.default_port());
        Ok(Self::new(scheme, host, port))
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether the port is the scheme's default.
    pub fn has_default_port(&self) -> bool {
        self.port == self.scheme.default_port()
    }

    /// The value for a `Host` header: the host, plus the port if non-default.
    pub fn host_header(&self) -> String {
        if self.has_default_port() {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Whether `uri` targets this address.
    pub fn matches(&self, uri: &Uri) -> bool {
        Address::from_uri(uri).is_ok_and(|other| &other == self)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme.as_str(), self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_uri_default_ports() {
        let http = Address::from_uri(&"http://example.com/a".parse().unwrap()).unwrap();
        assert_eq!(http.port(), 80);
        assert_eq!(http.scheme(), Scheme::Http);

        let https = Address::from_uri(&"https://Example.COM".parse().unwrap()).unwrap();
        assert_eq!(https.port(), 443);
        assert_eq!(https.host(), "example.com");
        assert_eq!(https.host_header(), "example.com");
    }

    #[test]
    fn test_from_uri_explicit_port() {
        let addr = Address::from_uri(&"http://127.0.0.1:8080/x?y=1".parse().unwrap()).unwrap();
        assert_eq!(addr.port(), 8080);
        assert_eq!(addr.host_header(), "127.0.0.1:8080");
        assert_eq!(addr.to_string(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_from_uri_rejects_relative_and_unknown_schemes() {
        assert!(Address::from_uri(&"/only/a/path".parse().unwrap()).is_err());
        assert!(Address::from_uri(&"ftp://example.com".parse().unwrap()).is_err());
    }

    #[test]
    fn test_matches() {
        let addr = Address::new(Scheme::Https, "api.example.com", 443);
        assert!(addr.matches(&"https://api.example.com/v1".parse().unwrap()));
        assert!(addr.matches(&"https://api.example.com:443/v2".parse().unwrap()));
        assert!(!addr.matches(&"http://api.example.com/v1".parse().unwrap()));
        assert!(!addr.matches(&"https://api.example.com:8443/v1".parse().unwrap()));
        assert!(!addr.matches(&"https://other.example.com/v1".parse().unwrap()));
    }
}

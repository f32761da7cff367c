//! Hyper-based transport.
//!
//! The public API is blocking, so the transport owns a small multi-threaded
//! tokio runtime. Connecting and every exchange run through
//! [`Runtime::block_on`] on the calling thread; the connection driver task
//! runs on the runtime's workers.
//!
//! A transport must not be used or dropped from inside another async
//! runtime.

use std::fmt;
use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use http::header::HOST;
use http::{HeaderValue, Uri};
use http_body_util::BodyExt;
use hyper::client::conn::http1::{self, SendRequest};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hopchain_core::{Address, ChainError, Exchange, Request, Response, ResponseBody, Scheme, Timeouts};
use rustls::ClientConfig;
use tokio::runtime::Runtime;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tower::ServiceExt;

use super::Transport;
use super::body::RequestBody;
use super::connector::{
    build_http_connector, build_https_connector, danger_accept_invalid_certs_config,
    default_tls_config,
};
use crate::ClientBuildError;

type Sender = SendRequest<RequestBody>;

/// HTTP/1.1 transport over hyper.
///
/// # Example
///
/// ```no_run
/// use hopchain_client::{Client, HyperTransport};
///
/// let transport = HyperTransport::builder().io_threads(2).build()?;
/// let client = Client::builder().transport(transport).build()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct HyperTransport {
    runtime: Arc<Runtime>,
    http: HttpConnector,
    https: Option<HttpsConnector<HttpConnector>>,
}

impl fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperTransport")
            .field("tls", &self.https.is_some())
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Create a new transport builder.
    pub fn builder() -> HyperTransportBuilder {
        HyperTransportBuilder::new()
    }

    /// Create a new transport with default settings.
    pub fn new() -> Result<Self, ClientBuildError> {
        Self::builder().build()
    }

    /// Whether `https` targets can be reached.
    pub fn supports_tls(&self) -> bool {
        self.https.is_some()
    }

    async fn open(&self, address: &Address, timeouts: Timeouts) -> Result<(Sender, AbortHandle), ChainError> {
        let uri: Uri = format!("{}://{}:{}", address.scheme().as_str(), address.host(), address.port())
            .parse()
            .map_err(|e| ChainError::InvalidRequest(format!("invalid address {}: {}", address, e)))?;

        match address.scheme() {
            Scheme::Http => {
                let io = with_timeout(timeouts.connect, "connect", self.http.clone().oneshot(uri)).await?;
                handshake(io, timeouts.connect).await
            }
            Scheme::Https => {
                let https = self.https.clone().ok_or_else(|| {
                    ChainError::transport(
                        "https requires TLS support: enable a `tls` feature or configure a TLS client config",
                    )
                })?;
                let io = with_timeout(timeouts.connect, "connect", https.oneshot(uri)).await?;
                handshake(io, timeouts.connect).await
            }
        }
    }
}

impl Transport for HyperTransport {
    fn connect(&self, address: &Address, timeouts: Timeouts) -> Result<Arc<dyn Exchange>, ChainError> {
        let (sender, driver) = self.runtime.block_on(self.open(address, timeouts))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(%address, "connected");

        Ok(Arc::new(HyperExchange {
            address: address.clone(),
            sender: Mutex::new(sender),
            driver,
            runtime: self.runtime.clone(),
        }))
    }
}

async fn handshake<T>(io: T, timeout: Duration) -> Result<(Sender, AbortHandle), ChainError>
where
    T: hyper::rt::Read + hyper::rt::Write + Unpin + Send + 'static,
{
    let (sender, connection) = with_timeout(timeout, "handshake", http1::handshake(io)).await?;
    let driver = tokio::spawn(async move {
        if let Err(_err) = connection.await {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %_err, "connection closed with error");
        }
    });
    Ok((sender, driver.abort_handle()))
}

/// Run `fut` under `duration`; zero means no limit.
async fn with_timeout<F, T, E>(duration: Duration, what: &'static str, fut: F) -> Result<T, ChainError>
where
    F: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let result = if duration.is_zero() {
        fut.await
    } else {
        tokio::time::timeout(duration, fut).await.map_err(|_| {
            ChainError::Timeout(format!("{} timed out after {} ms", what, duration.as_millis()))
        })?
    };
    result.map_err(|e| ChainError::transport(format!("{} failed: {}", what, e)))
}

/// One HTTP/1.1 connection attached to a call.
///
/// The connection is closed when the exchange is dropped.
pub struct HyperExchange {
    address: Address,
    sender: Mutex<Sender>,
    driver: AbortHandle,
    runtime: Arc<Runtime>,
}

impl Drop for HyperExchange {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

impl fmt::Debug for HyperExchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperExchange")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Exchange for HyperExchange {
    fn address(&self) -> &Address {
        &self.address
    }

    /// Sends `request` and reads the whole response.
    ///
    /// The write timeout covers waiting for the connection and handing it
    /// the request body. The read timeout starts once the body is taken and
    /// covers the response head, then separately the response body.
    fn send(&self, request: Request, timeouts: Timeouts) -> Result<Response, ChainError> {
        let (body, flushed) = RequestBody::new(request.body().cloned().unwrap_or_default());
        let outgoing = to_http_request(&request, &self.address)?.map(|()| body);

        self.runtime.block_on(async {
            let mut sender = self.sender.lock().await;
            with_timeout(timeouts.write, "write", sender.ready()).await?;

            let mut pending = pin!(sender.send_request(outgoing));
            let early = with_timeout(timeouts.write, "write", async {
                tokio::select! {
                    biased;
                    result = &mut pending => result.map(Some),
                    _ = flushed => Ok(None),
                }
            })
            .await?;
            let response = match early {
                Some(response) => response,
                None => with_timeout(timeouts.read, "read", pending).await?,
            };

            let (parts, body) = response.into_parts();
            let bytes = with_timeout(timeouts.read, "read", body.collect()).await?.to_bytes();

            Ok::<_, ChainError>(
                Response::new(request, parts.status, ResponseBody::new(bytes)).with_headers(parts.headers),
            )
        })
    }
}

/// Convert to an origin-form request head, filling `Host` when missing.
fn to_http_request(request: &Request, address: &Address) -> Result<http::Request<()>, ChainError> {
    let mut outgoing = http::Request::new(());
    *outgoing.method_mut() = request.method().clone();
    *outgoing.uri_mut() = request
        .path_and_query()
        .parse()
        .map_err(|e| ChainError::InvalidRequest(format!("invalid path: {}", e)))?;
    *outgoing.headers_mut() = request.headers().clone();

    if !outgoing.headers().contains_key(HOST) {
        let host = HeaderValue::from_str(&address.host_header())
            .map_err(|e| ChainError::InvalidRequest(format!("invalid host: {}", e)))?;
        outgoing.headers_mut().insert(HOST, host);
    }
    Ok(outgoing)
}

/// Builder for [`HyperTransport`].
#[derive(Default)]
pub struct HyperTransportBuilder {
    tls_config: Option<ClientConfig>,
    danger_accept_invalid_certs: bool,
    io_threads: Option<usize>,
}

impl fmt::Debug for HyperTransportBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperTransportBuilder")
            .field("tls_config", &self.tls_config.is_some())
            .field("danger_accept_invalid_certs", &self.danger_accept_invalid_certs)
            .field("io_threads", &self.io_threads)
            .finish()
    }
}

impl HyperTransportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom TLS configuration.
    ///
    /// Use this for custom root certificates or client certificates (mTLS).
    pub fn tls_config(mut self, config: ClientConfig) -> Self {
        self.tls_config = Some(config);
        self
    }

    /// Accept invalid TLS certificates.
    ///
    /// # Warning
    ///
    /// This is extremely dangerous and should only be used for development/testing!
    /// It makes the connection vulnerable to man-in-the-middle attacks.
    pub fn danger_accept_invalid_certs(mut self) -> Self {
        self.danger_accept_invalid_certs = true;
        self
    }

    /// Number of runtime worker threads driving connections. Default: 1.
    pub fn io_threads(mut self, threads: usize) -> Self {
        self.io_threads = Some(threads.max(1));
        self
    }

    pub fn build(self) -> Result<HyperTransport, ClientBuildError> {
        let tls_config = if self.danger_accept_invalid_certs {
            Some(danger_accept_invalid_certs_config().ok_or_else(|| {
                ClientBuildError::Transport(
                    "accepting invalid certificates requires a TLS crypto provider".into(),
                )
            })?)
        } else {
            self.tls_config.or_else(default_tls_config)
        };

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.io_threads.unwrap_or(1))
            .thread_name("hopchain-io")
            .enable_all()
            .build()
            .map_err(|e| ClientBuildError::Transport(format!("failed to start io runtime: {}", e)))?;

        Ok(HyperTransport {
            runtime: Arc::new(runtime),
            http: build_http_connector(),
            https: tls_config.map(build_https_connector),
        })
    }
}

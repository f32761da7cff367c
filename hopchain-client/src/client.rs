//! The client and its calls.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use hopchain_core::{CallHandle, Chain, ChainError, Interceptor, Request, Response, Timeouts};

use crate::{CallOptions, ClientBuildError, ClientBuilder};

/// A blocking HTTP client.
///
/// Cloning is cheap; clones share the same pipeline and transport.
///
/// # Example
///
/// ```no_run
/// use hopchain_client::{Client, Request};
///
/// let client = Client::new()?;
/// let response = client.execute(Request::get("http://localhost:3000/health")?)?;
/// println!("{}", response.status());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    pipeline: Vec<Arc<dyn Interceptor>>,
    timeouts: Timeouts,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("stages", &self.inner.pipeline.len())
            .field("timeouts", &self.inner.timeouts)
            .finish()
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client with default settings.
    pub fn new() -> Result<Self, ClientBuildError> {
        Self::builder().build()
    }

    pub(crate) fn from_parts(pipeline: Vec<Arc<dyn Interceptor>>, timeouts: Timeouts) -> Self {
        Self {
            inner: Arc::new(ClientInner { pipeline, timeouts }),
        }
    }

    /// Default timeouts for calls made by this client.
    pub fn timeouts(&self) -> Timeouts {
        self.inner.timeouts
    }

    /// Number of stages every call runs through, built-in stages included.
    pub fn pipeline_len(&self) -> usize {
        self.inner.pipeline.len()
    }

    /// Prepare a call for `request`.
    pub fn new_call(&self, request: Request) -> Call {
        self.new_call_with_options(request, CallOptions::default())
    }

    pub fn new_call_with_options(&self, request: Request, options: CallOptions) -> Call {
        Call {
            client: self.clone(),
            request,
            options,
            handle: Arc::new(CallHandle::new()),
            executed: AtomicBool::new(false),
        }
    }

    /// Prepare and execute a call in one step.
    pub fn execute(&self, request: Request) -> Result<Response, ChainError> {
        self.new_call(request).execute()
    }
}

/// One request/response exchange, possibly spanning several attempts.
///
/// A call executes at most once. It may be canceled from another thread
/// while it runs; stages that do I/O stop at their next cancellation check.
pub struct Call {
    client: Client,
    request: Request,
    options: CallOptions,
    handle: Arc<CallHandle>,
    executed: AtomicBool,
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("id", &self.handle.id())
            .field("method", self.request.method())
            .field("uri", self.request.uri())
            .field("executed", &self.is_executed())
            .field("canceled", &self.is_canceled())
            .finish()
    }
}

impl Call {
    pub fn id(&self) -> u64 {
        self.handle.id()
    }

    /// The request as the application created it.
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.handle.is_canceled()
    }

    pub fn is_executed(&self) -> bool {
        self.executed.load(Ordering::Acquire)
    }

    /// Shared handle for canceling this call from elsewhere.
    pub fn handle(&self) -> Arc<CallHandle> {
        self.handle.clone()
    }

    /// Run the request through the pipeline, blocking until the response
    /// is fully read.
    pub fn execute(&self) -> Result<Response, ChainError> {
        if self.executed.swap(true, Ordering::AcqRel) {
            return Err(ChainError::AlreadyExecuted);
        }
        if self.is_canceled() {
            return Err(ChainError::Canceled);
        }

        let mut request = self.request.clone();
        for name in self.options.headers.keys() {
            let headers = request.headers_mut();
            headers.remove(name);
            for value in self.options.headers.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }

        #[cfg(feature = "tracing")]
        let span = tracing::info_span!(
            "http.call",
            call.id = self.handle.id(),
            http.method = %request.method(),
            url = %request.uri(),
        );
        #[cfg(feature = "tracing")]
        let _guard = span.enter();

        let chain = Chain::new(
            &self.client.inner.pipeline,
            &self.handle,
            request,
            self.client.inner.timeouts,
        );
        let chain = self.apply_timeouts(chain)?;

        let result = chain.proceed(chain.request().clone());

        #[cfg(feature = "tracing")]
        match &result {
            Ok(response) => tracing::debug!(status = response.status().as_u16(), "call finished"),
            Err(e) if e.is_protocol_violation() => tracing::error!(error = %e, "interceptor broke the chain contract"),
            Err(e) => tracing::debug!(error = %e, "call failed"),
        }

        result
    }

    fn apply_timeouts<'a>(&self, mut chain: Chain<'a>) -> Result<Chain<'a>, ChainError> {
        if !self.options.has_timeouts() {
            return Ok(chain);
        }
        if let Some(timeout) = self.options.connect_timeout {
            chain = chain.with_connect_timeout(timeout)?;
        }
        if let Some(timeout) = self.options.read_timeout {
            chain = chain.with_read_timeout(timeout)?;
        }
        if let Some(timeout) = self.options.write_timeout {
            chain = chain.with_write_timeout(timeout)?;
        }
        Ok(chain)
    }
}

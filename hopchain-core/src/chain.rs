//! The interceptor chain executor.
//!
//! A [`Chain`] is an immutable view of "the pipeline remaining from position
//! `index` onward" for one call. [`Chain::proceed`] never moves a view; it
//! builds the next view at `index + 1`, hands it to the interceptor at the
//! current position and validates what comes back.
//!
//! The pipeline has two phases. Before a transport session ([`Exchange`]) is
//! attached, stages may short-circuit or re-enter `proceed` freely. Once the
//! connecting stage attaches one with [`Chain::proceed_with_exchange`], every
//! later stage must call `proceed` exactly once and keep the same target.
//!
//! ```text
//!  [app interceptors] -> [connect] -> [network interceptors] -> [call server]
//!  <---- no exchange ---->|<---------- exchange attached ----------------->
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    CallHandle, ChainError, Exchange, Interceptor, ProtocolViolation, Request, Response, Timeouts,
    check_duration,
};

/// One position of the interceptor chain.
///
/// Everything but the private call counter is immutable. The counter is
/// shared with views derived through the `with_*_timeout` builders, so a
/// stage that adjusts a timeout and then proceeds is counted once.
pub struct Chain<'a> {
    interceptors: &'a [Arc<dyn Interceptor>],
    index: usize,
    request: Request,
    exchange: Option<Arc<dyn Exchange>>,
    call: &'a CallHandle,
    timeouts: Timeouts,
    calls: Rc<Cell<u32>>,
}

impl<'a> Chain<'a> {
    /// Create the entry view (position 0, no exchange) for one call.
    pub fn new(
        interceptors: &'a [Arc<dyn Interceptor>],
        call: &'a CallHandle,
        request: Request,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            interceptors,
            index: 0,
            request,
            exchange: None,
            call,
            timeouts,
            calls: Rc::new(Cell::new(0)),
        }
    }

    /// The request as of this position.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The attached transport session, if the chain is past the connecting stage.
    pub fn exchange(&self) -> Option<&Arc<dyn Exchange>> {
        self.exchange.as_ref()
    }

    /// The owning call.
    pub fn call(&self) -> &CallHandle {
        self.call
    }

    /// Position of this view in the interceptor list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of interceptors in the chain.
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Whether the chain has no interceptors at all.
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Timeouts in effect for this view.
    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// Zero means no timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.timeouts.connect
    }

    /// Zero means no timeout.
    pub fn read_timeout(&self) -> Duration {
        self.timeouts.read
    }

    /// Zero means no timeout.
    pub fn write_timeout(&self) -> Duration {
        self.timeouts.write
    }

    /// A view at the same position with a different connect timeout.
    pub fn with_connect_timeout(&self, timeout: Duration) -> Result<Chain<'a>, ChainError> {
        let connect = check_duration("connect timeout", timeout)?;
        Ok(self.with_timeouts(Timeouts {
            connect,
            ..self.timeouts
        }))
    }

    /// A view at the same position with a different read timeout.
    pub fn with_read_timeout(&self, timeout: Duration) -> Result<Chain<'a>, ChainError> {
        let read = check_duration("read timeout", timeout)?;
        Ok(self.with_timeouts(Timeouts {
            read,
            ..self.timeouts
        }))
    }

    /// A view at the same position with a different write timeout.
    pub fn with_write_timeout(&self, timeout: Duration) -> Result<Chain<'a>, ChainError> {
        let write = check_duration("write timeout", timeout)?;
        Ok(self.with_timeouts(Timeouts {
            write,
            ..self.timeouts
        }))
    }

    fn with_timeouts(&self, timeouts: Timeouts) -> Chain<'a> {
        Chain {
            interceptors: self.interceptors,
            index: self.index,
            request: self.request.clone(),
            exchange: self.exchange.clone(),
            call: self.call,
            timeouts,
            calls: Rc::clone(&self.calls),
        }
    }

    /// Run the rest of the chain with `request`.
    pub fn proceed(&self, request: Request) -> Result<Response, ChainError> {
        self.proceed_inner(request, self.exchange.clone())
    }

    /// Attach `exchange` and run the rest of the chain with `request`.
    ///
    /// Called by the stage that establishes the transport session. Stages
    /// after this one run with the exchange attached.
    pub fn proceed_with_exchange(
        &self,
        request: Request,
        exchange: Arc<dyn Exchange>,
    ) -> Result<Response, ChainError> {
        if self.exchange.is_some() {
            return Err(ProtocolViolation::ExchangeAlreadyAttached {
                stage: self.previous_stage_name(),
            }
            .into());
        }
        self.proceed_inner(request, Some(exchange))
    }

    fn proceed_inner(
        &self,
        request: Request,
        exchange: Option<Arc<dyn Exchange>>,
    ) -> Result<Response, ChainError> {
        let len = self.interceptors.len();
        if self.index >= len {
            return Err(ChainError::Exhausted {
                index: self.index,
                len,
            });
        }

        let calls = self.calls.get() + 1;
        self.calls.set(calls);

        if let Some(current) = &self.exchange {
            // With a live session the request must still target it.
            if !current.supports_url(request.uri()) {
                return Err(ProtocolViolation::TargetChanged {
                    stage: self.previous_stage_name(),
                    expected: current.address().to_string(),
                    actual: request.uri().to_string(),
                }
                .into());
            }
            if calls > 1 {
                return Err(ProtocolViolation::ProceedNotOnce {
                    stage: self.previous_stage_name(),
                    calls,
                }
                .into());
            }
        }

        let next = Chain {
            interceptors: self.interceptors,
            index: self.index + 1,
            request,
            exchange,
            call: self.call,
            timeouts: self.timeouts,
            calls: Rc::new(Cell::new(0)),
        };
        let interceptor = &self.interceptors[self.index];
        let response = interceptor.intercept(&next)?;

        if next.exchange.is_some() && next.index < len && next.calls.get() != 1 {
            return Err(ProtocolViolation::ProceedNotOnce {
                stage: interceptor.name().into_owned(),
                calls: next.calls.get(),
            }
            .into());
        }

        if response.body().is_none() {
            return Err(ProtocolViolation::MissingBody {
                stage: interceptor.name().into_owned(),
            }
            .into());
        }

        Ok(response)
    }

    /// Name of the interceptor that handed this view its request.
    fn previous_stage_name(&self) -> String {
        self.index
            .checked_sub(1)
            .and_then(|i| self.interceptors.get(i))
            .map(|interceptor| interceptor.name().into_owned())
            .unwrap_or_else(|| "<chain entry>".to_string())
    }
}

impl fmt::Debug for Chain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("index", &self.index)
            .field("len", &self.interceptors.len())
            .field("call", &self.call.id())
            .field("request", &self.request.uri())
            .field("exchange", &self.exchange.as_ref().map(|e| e.address()))
            .field("timeouts", &self.timeouts)
            .field("calls", &self.calls.get())
            .finish()
    }
}

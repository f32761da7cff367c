//! Shared fixtures for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use http::StatusCode;
use hopchain_core::{
    Address, CallHandle, Chain, ChainError, Exchange, Interceptor, Request, Response,
    ResponseBody, Timeouts,
};

use crate::Transport;

/// Run `stages` for a GET of `uri` with default timeouts.
pub(crate) fn run(stages: &[Arc<dyn Interceptor>], uri: &str) -> Result<Response, ChainError> {
    let call = CallHandle::new();
    let chain = Chain::new(stages, &call, Request::get(uri)?, Timeouts::default());
    chain.proceed(chain.request().clone())
}

/// Terminal stage answering 200 with body "ok".
pub(crate) struct Echo;

impl Interceptor for Echo {
    fn intercept(&self, chain: &Chain<'_>) -> Result<Response, ChainError> {
        Ok(Response::new(
            chain.request().clone(),
            StatusCode::OK,
            ResponseBody::new("ok"),
        ))
    }
}

/// Attaches a [`ScriptedExchange`] for the request's address.
pub(crate) struct ConnectStub;

impl Interceptor for ConnectStub {
    fn intercept(&self, chain: &Chain<'_>) -> Result<Response, ChainError> {
        let exchange = Arc::new(ScriptedExchange::new(chain.request().address()?, Script::default()));
        chain.proceed_with_exchange(chain.request().clone(), exchange)
    }
}

/// Scripted outcomes, consumed one per exchange. Once empty, every send
/// answers 200 "ok".
#[derive(Clone, Debug, Default)]
pub(crate) struct Script {
    outcomes: Arc<Mutex<VecDeque<Result<StatusCode, ChainError>>>>,
    sent: Arc<Mutex<Vec<(Request, Timeouts)>>>,
}

impl Script {
    pub(crate) fn new(outcomes: impl IntoIterator<Item = Result<StatusCode, ChainError>>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into_iter().collect())),
            sent: Arc::default(),
        }
    }

    /// Requests seen by the exchanges, with the timeouts they were sent with.
    pub(crate) fn sent(&self) -> Vec<(Request, Timeouts)> {
        self.sent.lock().unwrap().clone()
    }

    fn next(&self, request: Request, timeouts: Timeouts) -> Result<Response, ChainError> {
        self.sent.lock().unwrap().push((request.clone(), timeouts));
        let status = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(StatusCode::OK))?;
        Ok(Response::new(request, status, ResponseBody::new("ok")))
    }
}

#[derive(Debug)]
pub(crate) struct ScriptedExchange {
    address: Address,
    script: Script,
}

impl ScriptedExchange {
    pub(crate) fn new(address: Address, script: Script) -> Self {
        Self { address, script }
    }
}

impl Exchange for ScriptedExchange {
    fn address(&self) -> &Address {
        &self.address
    }

    fn send(&self, request: Request, timeouts: Timeouts) -> Result<Response, ChainError> {
        self.script.next(request, timeouts)
    }
}

/// Transport handing out [`ScriptedExchange`]s that share one script.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    pub(crate) script: Script,
    connects: AtomicUsize,
}

impl MockTransport {
    pub(crate) fn new(script: Script) -> Self {
        Self {
            script,
            connects: AtomicUsize::new(0),
        }
    }

    pub(crate) fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    fn connect(&self, address: &Address, _timeouts: Timeouts) -> Result<Arc<dyn Exchange>, ChainError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(ScriptedExchange::new(
            address.clone(),
            self.script.clone(),
        )))
    }
}

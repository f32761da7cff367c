//! Request body for the hyper transport.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};
use tokio::sync::oneshot;

/// Largest frame handed to the connection at once.
const CHUNK_SIZE: usize = 16 * 1024;

/// A buffered request body that reports when the connection has taken all
/// of it.
///
/// The body is yielded in [`CHUNK_SIZE`] frames. hyper only polls for the
/// next frame once its write buffer has room, so the signal fires once the
/// connection has accepted the whole upload. An empty body signals on
/// creation.
pub(crate) struct RequestBody {
    remaining: Bytes,
    flushed: Option<oneshot::Sender<()>>,
}

impl RequestBody {
    pub(crate) fn new(data: Bytes) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let mut body = Self {
            remaining: data,
            flushed: Some(tx),
        };
        if body.remaining.is_empty() {
            body.signal();
        }
        (body, rx)
    }

    fn signal(&mut self) {
        if let Some(tx) = self.flushed.take() {
            let _ = tx.send(());
        }
    }
}

impl Body for RequestBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if this.remaining.is_empty() {
            this.signal();
            return Poll::Ready(None);
        }
        let len = this.remaining.len().min(CHUNK_SIZE);
        Poll::Ready(Some(Ok(Frame::data(this.remaining.split_to(len)))))
    }

    // Stays open after the last chunk so the final poll can signal.
    fn is_end_stream(&self) -> bool {
        self.remaining.is_empty() && self.flushed.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.remaining.len() as u64)
    }
}

impl std::fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBody")
            .field("remaining", &self.remaining.len())
            .field("flushed", &self.flushed.is_none())
            .finish()
    }
}

//! Identity and cancellation state of one logical call.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

static NEXT_CALL_ID: AtomicU64 = AtomicU64::new(1);

/// The owning call, as visible to stages through [`Chain::call`](crate::Chain::call).
///
/// The chain never reads the cancellation flag itself; stages that do I/O
/// check it before starting work.
#[derive(Debug)]
pub struct CallHandle {
    id: u64,
    canceled: AtomicBool,
}

impl Default for CallHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CallHandle {
    /// Create a handle with a fresh, process-unique id.
    pub fn new() -> Self {
        Self {
            id: NEXT_CALL_ID.fetch_add(1, Ordering::Relaxed),
            canceled: AtomicBool::new(false),
        }
    }

    /// Identifier of the call, unique within the process.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Mark the call canceled. Safe to call from any thread.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Release);
    }

    /// Whether [`CallHandle::cancel`] has been called.
    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }
}

//! Cancellation context (`Cx`).
//!
//! A `Cx` is cheap to clone; clones share one cancellation flag, so a handle
//! kept by another thread can interrupt a parse running on this one. The
//! parse driver polls it with [`Cx::checkpoint`] at whitespace and illegal
//! token boundaries only, so cancellation is observed at the next such
//! boundary rather than mid-token.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use sqlfront_error::{FrontendError, Result};
use tracing::debug;

/// Reason for cancellation, ordered from weakest to strongest.
///
/// Repeated cancel requests are monotone: the strongest reason wins and the
/// reason never gets weaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CancelReason {
    Timeout = 0,
    UserInterrupt = 1,
    Shutdown = 2,
}

impl CancelReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::UserInterrupt => "user_interrupt",
            Self::Shutdown => "shutdown",
        }
    }
}

#[derive(Debug, Default)]
struct CxInner {
    cancel_requested: AtomicBool,
    cancel_reason: Mutex<Option<CancelReason>>,
}

/// Cooperative cancellation context passed by reference into a parse.
#[derive(Debug, Clone, Default)]
pub struct Cx {
    inner: Arc<CxInner>,
}

impl Cx {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_cancel_requested(&self) -> bool {
        self.inner.cancel_requested.load(Ordering::Acquire)
    }

    /// Request cancellation with the default reason (`UserInterrupt`).
    pub fn cancel(&self) {
        self.cancel_with_reason(CancelReason::UserInterrupt);
    }

    /// Request cancellation with an explicit reason.
    pub fn cancel_with_reason(&self, reason: CancelReason) {
        debug!(reason = reason.as_str(), "cancellation requested");
        {
            let mut current = self.inner.cancel_reason.lock();
            if current.is_none_or(|existing| existing < reason) {
                *current = Some(reason);
            }
        }
        self.inner.cancel_requested.store(true, Ordering::Release);
    }

    /// The strongest cancellation reason set so far, if any.
    #[must_use]
    pub fn cancel_reason(&self) -> Option<CancelReason> {
        *self.inner.cancel_reason.lock()
    }

    /// Poll for cancellation.
    ///
    /// Returns [`FrontendError::Interrupted`] once any holder of this
    /// context has requested cancellation.
    pub fn checkpoint(&self) -> Result<()> {
        if self.inner.cancel_requested.load(Ordering::Acquire) {
            return Err(FrontendError::Interrupted);
        }
        Ok(())
    }
}

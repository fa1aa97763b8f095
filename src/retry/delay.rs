//! Injectable backoff suspension.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

/// Suspends the current task between attempts.
///
/// The executor only awaits the returned future, so a test double can resolve
/// immediately and record the requested duration instead of waiting.
pub trait Delay: Send + Sync {
    /// Wait for `duration` without blocking the thread.
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

impl<D: Delay + ?Sized> Delay for Arc<D> {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        (**self).sleep(duration)
    }
}

impl<D: Delay + ?Sized> Delay for &D {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        (**self).sleep(duration)
    }
}

/// Timer-backed delay using `tokio::time::sleep`.
#[cfg(feature = "async")]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokioDelay;

#[cfg(feature = "async")]
impl Delay for TokioDelay {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

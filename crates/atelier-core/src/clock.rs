//! Clock abstraction for scheduled follow-up work.

use std::time::Duration;

use async_trait::async_trait;

/// A suspendable clock.
///
/// The dispatcher's deferred asset refresh waits on this trait rather than
/// on the runtime directly, so tests can inject a clock that returns
/// immediately.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Suspends the caller for the given duration.
    async fn sleep(&self, duration: Duration);
}

/// Production clock backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

//! Wall-clock ReconContext for runs against the remote API.

use crate::ReconContext;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Clock for real reconciliation runs.
///
/// `now()` is time since the context was created, read from Tokio's clock
/// so a paused test runtime drives it the same way it drives `sleep`.
pub struct TokioContext {
    started: Instant,
}

impl TokioContext {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Arc-wrapped, ready to hand to a `Reconciler`.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for TokioContext {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReconContext for TokioContext {
    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_pacing_waits_advance_run_clock() {
        let ctx = TokioContext::shared();
        assert_eq!(ctx.now(), Duration::ZERO);

        // Three mutations at the default 3s spacing.
        for _ in 0..3 {
            ctx.sleep(Duration::from_secs(3)).await;
        }

        let elapsed = ctx.now();
        assert!(elapsed >= Duration::from_secs(9), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(10), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unpaced_wait_takes_no_time() {
        let ctx = TokioContext::new();
        ctx.sleep(Duration::ZERO).await;
        assert!(ctx.now() < Duration::from_millis(2), "elapsed {:?}", ctx.now());
    }
}

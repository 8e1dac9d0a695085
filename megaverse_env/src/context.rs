//! Time abstraction for the reconciliation driver.

use async_trait::async_trait;
use std::time::Duration;

/// The driver's view of time.
///
/// Pacing between remote mutations is the only place the engine waits,
/// so abstracting it lets the simulator run a multi-minute reconciliation
/// in microseconds while production uses the real clock.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`
/// - **Simulation**: `SimContext` - virtual clock advanced by `sleep`
#[async_trait]
pub trait ReconContext: Send + Sync + 'static {
    /// Returns the monotonic time since context creation.
    ///
    /// In simulation, this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In simulation: advances virtual clock
    async fn sleep(&self, duration: Duration);
}

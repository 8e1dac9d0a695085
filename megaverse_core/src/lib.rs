//! Megaverse Core - Goal/Current Map Reconciliation
//!
//! This library moves a remote universe toward its goal map in one pass:
//! 1. **Plan**: fetch both maps concurrently and diff them cell by cell
//! 2. **Apply**: issue one create call per missing or mismatched cell, serially
//! 3. **Pace**: wait a fixed interval after every call to stay under the rate limit
//!
//! Failed calls are reported, not retried. Re-running re-derives exactly
//! the cells that are still wrong.

pub mod client;
pub mod config;
pub mod driver;
pub mod error;
pub mod pacing;
pub mod plan;

// Re-export key types for convenience
pub use client::MegaverseClient;
pub use config::{MegaverseConfig, DEFAULT_BASE_URL};
pub use driver::{FailedOperation, OperationState, ReconReport, Reconciler};
pub use error::ReconError;
pub use pacing::PacingPolicy;
pub use plan::{decode_goal, diff, needs_create, PendingOperation};

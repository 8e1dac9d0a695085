//! Megaverse Deterministic Simulation Harness
//!
//! Runs the real [`Reconciler`](megaverse_core::Reconciler) against an
//! in-memory universe instead of the remote API, so full reconciliation
//! passes can be checked end-to-end without a network or wall-clock waits.
//!
//! # Core Principle
//!
//! Every source of non-determinism is controlled:
//! - **Time**: a virtual clock that `sleep` advances instantly
//! - **Remote**: a [`SimUniverse`] with injectable faults
//! - **Randomness**: goal maps derived from a single 64-bit seed
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                    ScenarioRunner                    │
//! │   ┌────────────┐                 ┌───────────────┐   │
//! │   │ SimContext │◄── sleep/now ───│  Reconciler   │   │
//! │   │ (clock)    │                 │ (megaverse_   │   │
//! │   └─────▲──────┘                 │  core)        │   │
//! │         │ rate limit             └───────┬───────┘   │
//! │   ┌─────┴──────────────────────┐  fetch  │ create    │
//! │   │        SimUniverse         │◄────────┘           │
//! │   │  goal + current + faults   │                     │
//! │   └────────────────────────────┘                     │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use megaverse_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let result = ScenarioRunner::new(42, 11).run(ScenarioId::FreshCross).await;
//! assert!(result.passed);
//! ```

mod context;
mod patterns;
mod runner;
pub mod scenarios;
mod universe;

pub use context::SimContext;
pub use patterns::{all_objects, cross_goal, occupied_cells, partial_current, seeded_goal};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use universe::{RemoteCall, SimUniverse};

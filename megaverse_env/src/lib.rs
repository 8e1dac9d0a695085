//! Megaverse Environment Abstraction Layer
//!
//! This crate provides the seams that let the reconciliation engine run
//! against both the **Remote** Megaverse API and an in-memory **Simulation**.
//!
//! # Core Concept: Collaborators at the Edge
//!
//! The engine never talks to the outside world directly. Everything it
//! observes or changes goes through three traits:
//! - Time (`now()`, `sleep()`) via [`ReconContext`]
//! - Map reads (`fetch_goal_grid()`, `fetch_current_grid()`) via [`MapProvider`]
//! - Mutations (`create_*`, `delete_*`) via [`EntityMutator`]
//!
//! Swapping the implementations swaps the universe; the diff and pacing
//! logic is unchanged.
//!
//! # Example
//!
//! ```ignore
//! use megaverse_env::{MapProvider, ReconContext};
//!
//! async fn snapshot<Ctx: ReconContext, Maps: MapProvider>(ctx: &Ctx, maps: &Maps) {
//!     let (goal, current) = tokio::try_join!(
//!         maps.fetch_goal_grid(),
//!         maps.fetch_current_grid(),
//!     )?;
//!     ctx.sleep(Duration::from_secs(3)).await;
//! }
//! ```

mod context;
mod error;
mod grid;
mod remote;
mod tokio_impl;
mod types;

pub use context::ReconContext;
pub use error::EnvError;
pub use grid::Grid;
pub use remote::{EntityMutator, MapProvider};
pub use tokio_impl::TokioContext;
pub use types::{
    AstralObject, ComethDirection, CurrentGrid, GoalCell, GoalGrid, MapKind, ObjectKind,
    SoloonColor,
};

//! # ctrk-context — Scoped Correlation Context
//!
//! Per-execution-unit storage for the correlation triple (`correlation_id`,
//! `parent_id`, `origin_type`), a closed set of domain fields, and an
//! open-ended metadata map, with nested scopes that restore the prior state
//! exactly on every exit path.
//!
//! ## Layers
//!
//! 1. **[`state`]**: the plain data. [`ContextState`] is the live store,
//!    [`ContextSnapshot`] an immutable copy, [`Overrides`] a batch of writes.
//!
//! 2. **[`scope`]**: binds one store per thread (`thread_local!`) or per tokio
//!    task (`task_local!`) and provides [`scope::run_scoped`] and
//!    [`scope::run_scoped_async`].
//!
//! 3. **[`Tracker`]**: the facade adapters call. It adds identifier generation
//!    from `ctrk-core`, configuration, and the inbound acceptance policy.
//!
//! ## Crate Policy
//!
//! - Named fields are a closed enum. Unknown names are rejected at the
//!   boundary with [`ContextError::UnknownField`].
//! - Stores are never shared between execution units. Context crosses a task
//!   boundary only as a [`ContextSnapshot`] value.
//! - The context layer never swallows or rewrites a scoped body's outcome.

pub mod config;
pub mod error;
pub mod field;
pub mod inbound;
pub mod scope;
pub mod state;
pub mod tracker;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, TrackerConfig};
pub use error::ContextError;
pub use field::Field;
pub use state::{ContextSnapshot, ContextState, Overrides};
pub use tracker::{Establish, IdGenerator, Tracker};

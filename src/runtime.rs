//! Runtime for executing journeys
//!
//! Owns the session store, the per-user locks and the delayed-notice
//! scheduler, and turns the effects returned by `journey::transition` into
//! sends and timers.

mod executor;
mod scheduler;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::JourneyRuntime;
pub use traits::*;

use std::sync::Arc;

/// Type alias for the runtime behind the HTTP API
pub type ProductionRuntime = JourneyRuntime<Arc<dyn SessionStore>>;

/// A message could not be handled
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("session store failure: {0}")]
    Store(String),
    #[error("handler task failed: {0}")]
    Task(String),
}

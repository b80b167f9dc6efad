//! Activity coordinator
//!
//! Facade over the queue, predictor, simulator, and collaborators.

mod engine;

pub use engine::{ActivityCoordinator, CoordinatorConfig, EngineError};

pub mod error;
pub mod linear;
pub mod traits;

pub use error::EngineError;
pub use linear::{LinearEngine, LinearModel};
pub use traits::{EngineFactory, FlightDynamics, ModelReference, PropertySlot};

/// Factory for the bundled linear engine.
pub fn linear_engine_factory() -> EngineFactory {
    Box::new(|| Box::new(LinearEngine::new()) as Box<dyn FlightDynamics>)
}

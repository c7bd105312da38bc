use std::path::PathBuf;

use crate::physics::EngineError;

/// Engine-side handle for one bound property.
///
/// Obtained once from [`FlightDynamics::bind`]; the meaning of the index is
/// private to the engine that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertySlot(pub usize);

/// Where an engine should find an aircraft model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReference {
    /// Engine model identifier, e.g. `c172p`.
    pub model_id: String,
    /// Resolved model file.
    pub path: PathBuf,
}

/// Boundary to a flight-dynamics engine exposing named properties.
///
/// One instance is owned by exactly one simulation; nothing here is shared
/// across threads, but instances may be moved into a worker thread.
pub trait FlightDynamics: Send {
    fn name(&self) -> &str;

    fn load_model(&mut self, model: &ModelReference) -> Result<(), EngineError>;

    /// Resolve an engine property identifier such as `position/h-sl-ft`.
    fn bind(&self, engine_id: &str) -> Option<PropertySlot>;

    fn get(&self, slot: PropertySlot) -> f64;

    fn set(&mut self, slot: PropertySlot, value: f64);

    fn set_dt(&mut self, dt: f64);

    fn dt(&self) -> f64;

    /// Apply the `ic/*` inputs and recompute derived outputs without advancing time.
    fn run_ic(&mut self) -> Result<(), EngineError>;

    /// Advance one engine timestep.
    fn run(&mut self) -> Result<(), EngineError>;

    fn sim_time(&self) -> f64;

    /// Release the loaded model. Safe to call when nothing is loaded.
    fn unload(&mut self);
}

/// Creates a fresh engine for each environment instance.
pub type EngineFactory = Box<dyn Fn() -> Box<dyn FlightDynamics> + Send>;

//! Adapter between the environment and a flight-dynamics engine.

mod adapter;
mod conditions;
mod trim;

pub use adapter::{SimResult, Simulation};
pub use conditions::{
    InitialConditions, INITIAL_ALTITUDE_FT, INITIAL_HEADING_DEG, INITIAL_LATITUDE_DEG,
    INITIAL_LONGITUDE_DEG,
};
pub use trim::{TrimBounds, TrimError, TrimResult, TrimSolverConfig};

//! Bundled stability-derivative engine used for headless runs and tests.

mod engine;
mod model;

pub use engine::LinearEngine;
pub use model::{LateralDerivatives, LinearModel, LongitudinalDerivatives, ReferenceCondition};

#[cfg(test)]
pub(crate) use model::C172_YAML;

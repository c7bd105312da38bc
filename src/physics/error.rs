use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Engine has no property bound to '{0}'")]
    UnboundProperty(String),

    #[error("Integration diverged at t={sim_time:.3}s: {detail}")]
    Diverged { sim_time: f64, detail: String },

    #[error("No aircraft model is loaded")]
    NotLoaded,

    #[error("Invalid model '{model}': {reason}")]
    InvalidModel { model: String, reason: String },
}

//! The agent-facing environment: configuration, ids, spaces and the registry.

mod config;
mod env;
mod id;
pub mod registry;
mod spaces;

pub use config::{resolve_asset_dir, EnvConfig, EnvConfigBuilder, ASSETS_ENV_VAR};
pub use env::Environment;
pub use id::EnvId;
pub use registry::{all_env_ids, make, make_with};
pub use spaces::BoxSpace;

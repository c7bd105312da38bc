//! Fixed-wing flight control tasks exposed as reinforcement-learning environments.
//!
//! ```no_run
//! use flyer_gym::environment::make;
//!
//! let mut env = make("C172-HeadingControlTask-Shaping.EXTRA-NoFG-v0")?;
//! let (_obs, _info) = env.reset(Some(0))?;
//! let step = env.step(&[0.0, 0.0, 0.0])?;
//! println!("reward {}", step.reward);
//! # Ok::<(), flyer_gym::utils::EnvError>(())
//! ```

pub mod aircraft;
pub mod environment;
pub mod physics;
pub mod properties;
pub mod render;
pub mod rewards;
pub mod server;
pub mod simulation;
pub mod tasks;
pub mod utils;

pub use environment::{make, EnvConfig, EnvConfigBuilder, EnvId, Environment};
pub use utils::{EnvError, EnvResult};

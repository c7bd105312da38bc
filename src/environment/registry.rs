//! Every environment id the crate can build.

use super::config::{EnvConfig, EnvConfigBuilder};
use super::env::Environment;
use super::id::EnvId;
use crate::aircraft::AircraftId;
use crate::rewards::Shaping;
use crate::tasks::TaskKind;
use crate::utils::EnvResult;

/// All buildable ids, in registry order (task, aircraft, shaping, FG then NoFG).
pub fn all_env_ids() -> Vec<EnvId> {
    let mut ids = Vec::new();
    for task in TaskKind::ALL {
        for aircraft in AircraftId::ALL {
            for shaping in Shaping::ALL {
                if !task.supports(shaping) {
                    continue;
                }
                for flightgear in [true, false] {
                    ids.push(EnvId::new(aircraft, task, shaping, flightgear));
                }
            }
        }
    }
    ids
}

/// Build the environment named by `id` with default settings.
pub fn make(id: &str) -> EnvResult<Environment> {
    Environment::new(EnvConfig::from_env_id(id)?)
}

/// Build the environment named by `id`, overriding settings from `builder`.
pub fn make_with(id: &str, builder: EnvConfigBuilder) -> EnvResult<Environment> {
    Environment::new(builder.env_id(id).build()?)
}

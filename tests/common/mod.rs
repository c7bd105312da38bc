mod assertions;
mod engines;
mod fixtures;

pub use assertions::{assert_in_space, assert_reward_in_range, assert_step_finite};
pub use engines::{diverging_engine_factory, switchable_ic_engine_factory, DivergingEngine};
pub use fixtures::{
    bundled_assets, c172_builder, c172_env, empty_assets, env_for, single_model_assets,
    C172_HEADING_EXTRA,
};

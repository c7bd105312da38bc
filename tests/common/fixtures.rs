use std::fs;
use std::path::PathBuf;

use flyer_gym::environment::{EnvConfigBuilder, Environment};
use flyer_gym::EnvConfig;
use tempfile::TempDir;

pub const C172_HEADING_EXTRA: &str = "C172-HeadingControlTask-Shaping.EXTRA-NoFG-v0";

/// The asset tree shipped with the crate.
pub fn bundled_assets() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}

/// Asset directory holding only `<engine_model>.yaml` copied from the bundled tree.
pub fn single_model_assets(engine_model: &str) -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let aircraft = dir.path().join("aircraft");
    fs::create_dir_all(&aircraft).expect("Failed to create aircraft dir");
    let file = format!("{}.yaml", engine_model);
    fs::copy(bundled_assets().join("aircraft").join(&file), aircraft.join(&file))
        .expect("Failed to copy aircraft model");
    dir
}

/// Asset directory with no aircraft models at all.
pub fn empty_assets() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

pub fn c172_builder(env_id: &str) -> EnvConfigBuilder {
    EnvConfigBuilder::from_env_id(env_id).asset_dir(bundled_assets())
}

pub fn env_for(config: EnvConfig) -> Environment {
    Environment::new(config).expect("Failed to build environment")
}

/// C172 heading-hold environment on the bundled assets.
pub fn c172_env() -> Environment {
    let config = c172_builder(C172_HEADING_EXTRA)
        .seed(7)
        .build()
        .expect("Failed to build config");
    env_for(config)
}

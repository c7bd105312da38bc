use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::id::EnvId;
use crate::aircraft::AircraftId;
use crate::render::{FlightGearConfig, RenderMode};
use crate::rewards::Shaping;
use crate::simulation::TrimSolverConfig;
use crate::tasks::{TaskError, TaskKind};
use crate::utils::{
    EnvError, EnvResult, DEFAULT_AGENT_HZ, DEFAULT_ENGINE_HZ, DEFAULT_EPISODE_TIME_S,
    MAX_ENGINE_HZ, MIN_ENGINE_HZ,
};

/// Environment variable overriding the asset directory.
pub const ASSETS_ENV_VAR: &str = "FLYER_GYM_ASSETS";

/// Everything fixed for the lifetime of one environment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvConfig {
    pub aircraft: AircraftId,
    pub task: TaskKind,
    pub shaping: Shaping,
    pub render_mode: RenderMode,
    /// Agent interaction frequency.
    pub agent_hz: u32,
    /// Engine integration frequency; a multiple of `agent_hz`.
    pub engine_hz: u32,
    pub episode_time_s: f64,
    /// Seed used by the first `reset` when the caller passes none.
    pub seed: Option<u64>,
    pub flightgear: FlightGearConfig,
    pub asset_dir: PathBuf,
    pub trim: TrimSolverConfig,
}

impl EnvConfig {
    pub fn from_env_id(id: &str) -> EnvResult<Self> {
        EnvConfigBuilder::from_env_id(id).build()
    }

    pub fn from_json(value: &Value) -> EnvResult<Self> {
        EnvConfigBuilder::from_json(value)?.build()
    }

    /// Steps before truncation, `ceil(episode_time_s * agent_hz)`.
    pub fn max_episode_steps(&self) -> u64 {
        (self.episode_time_s * self.agent_hz as f64).ceil() as u64
    }

    pub fn env_id(&self) -> EnvId {
        EnvId::new(
            self.aircraft,
            self.task,
            self.shaping,
            self.render_mode == RenderMode::FlightGear,
        )
    }
}

/// Partial configuration from an id, JSON or YAML. Unset fields take defaults
/// in [`EnvConfigBuilder::build`]; explicit fields override the id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvConfigBuilder {
    pub env_id: Option<String>,
    pub aircraft: Option<String>,
    pub task: Option<String>,
    pub shaping: Option<String>,
    pub render_mode: Option<String>,
    pub agent_hz: Option<u32>,
    pub engine_hz: Option<u32>,
    pub episode_time_s: Option<f64>,
    pub seed: Option<u64>,
    pub flightgear: Option<FlightGearConfig>,
    pub asset_dir: Option<PathBuf>,
    pub trim: Option<TrimSolverConfig>,
}

impl EnvConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env_id(id: &str) -> Self {
        Self::new().env_id(id)
    }

    pub fn from_json(value: &Value) -> EnvResult<Self> {
        serde_json::from_value(value.clone()).map_err(|e| EnvError::Config(e.to_string()))
    }

    pub fn from_yaml_file(path: &Path) -> EnvResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }

    pub fn env_id(mut self, id: &str) -> Self {
        self.env_id = Some(id.to_string());
        self
    }

    pub fn aircraft(mut self, aircraft: AircraftId) -> Self {
        self.aircraft = Some(aircraft.to_string());
        self
    }

    pub fn task(mut self, task: TaskKind) -> Self {
        self.task = Some(task.to_string());
        self
    }

    pub fn shaping(mut self, shaping: Shaping) -> Self {
        self.shaping = Some(shaping.to_string());
        self
    }

    pub fn render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = Some(mode.to_string());
        self
    }

    pub fn agent_hz(mut self, hz: u32) -> Self {
        self.agent_hz = Some(hz);
        self
    }

    pub fn engine_hz(mut self, hz: u32) -> Self {
        self.engine_hz = Some(hz);
        self
    }

    pub fn episode_time_s(mut self, seconds: f64) -> Self {
        self.episode_time_s = Some(seconds);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn flightgear(mut self, config: FlightGearConfig) -> Self {
        self.flightgear = Some(config);
        self
    }

    pub fn asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = Some(dir.into());
        self
    }

    pub fn trim(mut self, config: TrimSolverConfig) -> Self {
        self.trim = Some(config);
        self
    }

    pub fn build(self) -> EnvResult<EnvConfig> {
        let id = self.env_id.as_deref().map(str::parse::<EnvId>).transpose()?;

        let aircraft = match self.aircraft.as_deref() {
            Some(name) => name.parse::<AircraftId>()?,
            None => id.map_or(AircraftId::C172, |id| id.aircraft),
        };
        let task = match self.task.as_deref() {
            Some(name) => name.parse::<TaskKind>()?,
            None => id.map_or(TaskKind::HeadingControl, |id| id.task),
        };
        let shaping = match self.shaping.as_deref() {
            Some(name) => name.parse::<Shaping>().map_err(EnvError::Config)?,
            None => id.map_or(Shaping::Standard, |id| id.shaping),
        };
        let render_mode = match self.render_mode.as_deref() {
            Some(name) => name.parse::<RenderMode>()?,
            None => id.map_or(RenderMode::None, |id| id.render_mode()),
        };

        if !task.supports(shaping) {
            return Err(TaskError::UnsupportedShaping {
                task: task.to_string(),
                shaping,
            }
            .into());
        }

        let agent_hz = self.agent_hz.unwrap_or(DEFAULT_AGENT_HZ);
        let engine_hz = self.engine_hz.unwrap_or(DEFAULT_ENGINE_HZ);
        if !(MIN_ENGINE_HZ..=MAX_ENGINE_HZ).contains(&engine_hz) {
            return Err(EnvError::Config(format!(
                "engine_hz must be within [{}, {}], got {}",
                MIN_ENGINE_HZ, MAX_ENGINE_HZ, engine_hz
            )));
        }
        if agent_hz == 0 || engine_hz % agent_hz != 0 {
            return Err(EnvError::Config(format!(
                "agent_hz ({}) must be a non-zero divisor of engine_hz ({})",
                agent_hz, engine_hz
            )));
        }

        let episode_time_s = self.episode_time_s.unwrap_or(DEFAULT_EPISODE_TIME_S);
        if !(episode_time_s.is_finite() && episode_time_s > 0.0) {
            return Err(EnvError::Config(format!(
                "episode_time_s must be positive, got {}",
                episode_time_s
            )));
        }

        let asset_dir = resolve_asset_dir(self.asset_dir);
        debug!("Using asset directory {}", asset_dir.display());

        Ok(EnvConfig {
            aircraft,
            task,
            shaping,
            render_mode,
            agent_hz,
            engine_hz,
            episode_time_s,
            seed: self.seed,
            flightgear: self.flightgear.unwrap_or_default(),
            asset_dir,
            trim: self.trim.unwrap_or_default(),
        })
    }
}

/// Explicit value, then `$FLYER_GYM_ASSETS`, then the crate's `assets/`,
/// then `<data dir>/flyer-gym/assets`.
pub fn resolve_asset_dir(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }
    if let Some(dir) = std::env::var_os(ASSETS_ENV_VAR) {
        return PathBuf::from(dir);
    }
    let bundled = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
    if bundled.is_dir() {
        return bundled;
    }
    dirs::data_dir()
        .map(|dir| dir.join("flyer-gym").join("assets"))
        .unwrap_or(bundled)
}

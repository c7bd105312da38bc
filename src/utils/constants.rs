pub const GRAVITY_FPS2: f64 = 32.174; // ft/s^2
pub const EARTH_RADIUS_FT: f64 = 20_925_646.3; // mean radius, ft
pub const KTS_TO_FPS: f64 = 1.6878098571; // knots -> ft/s

/// Engine integration frequency used when the config does not override it.
pub const DEFAULT_ENGINE_HZ: u32 = 60;
/// Agent interaction frequency used when the config does not override it.
pub const DEFAULT_AGENT_HZ: u32 = 5;
/// Episode length used when the config does not override it.
pub const DEFAULT_EPISODE_TIME_S: f64 = 60.0;

pub const MIN_ENGINE_HZ: u32 = 1;
pub const MAX_ENGINE_HZ: u32 = 1000;

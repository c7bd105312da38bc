use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical unit attached to a catalogued property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Feet,
    Degrees,
    Radians,
    FeetPerSecond,
    RadiansPerSecond,
    FeetPerSecondSquared,
    RadiansPerSecondSquared,
    Normalised,
    Seconds,
    Count,
    Dimensionless,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Feet => "ft",
            Unit::Degrees => "deg",
            Unit::Radians => "rad",
            Unit::FeetPerSecond => "ft/s",
            Unit::RadiansPerSecond => "rad/s",
            Unit::FeetPerSecondSquared => "ft/s^2",
            Unit::RadiansPerSecondSquared => "rad/s^2",
            Unit::Normalised => "norm",
            Unit::Seconds => "s",
            Unit::Count => "count",
            Unit::Dimensionless => "-",
        }
    }
}

/// Who owns a property and therefore how reads/writes are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Engine output. Read unclamped.
    State,
    /// Engine input driven by the agent or the task. Clamped on write.
    Actuator,
    /// Engine `ic/*` input, applied by the engine's initial-condition run.
    InitialCondition,
    /// Task-owned value (errors, targets, counters) held by the simulation adapter.
    Derived,
}

/// Index of a descriptor in the process-wide catalog.
///
/// Resolved once from a semantic name; all per-step access goes through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyId(pub(crate) u16);

impl PropertyId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Immutable description of one simulation property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    pub semantic_name: &'static str,
    pub engine_id: &'static str,
    pub description: &'static str,
    pub unit: Unit,
    pub kind: PropertyKind,
    pub min: f64,
    pub max: f64,
}

impl PropertyDescriptor {
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_engine_backed(&self) -> bool {
        self.kind != PropertyKind::Derived
    }
}

impl fmt::Display for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) [{}, {}] {}",
            self.semantic_name,
            self.engine_id,
            self.min,
            self.max,
            self.unit.symbol()
        )
    }
}

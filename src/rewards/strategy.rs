use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::components::{ErrorComponent, Gate, ShapingTerm};
use crate::properties::{catalog, PropertySnapshot};

/// Reward shaping variant, fixed for an environment's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shaping {
    Standard,
    Extra,
    ExtraSequential,
}

impl Shaping {
    pub const ALL: [Shaping; 3] = [Shaping::Standard, Shaping::Extra, Shaping::ExtraSequential];

    pub fn name(&self) -> &'static str {
        match self {
            Shaping::Standard => "STANDARD",
            Shaping::Extra => "EXTRA",
            Shaping::ExtraSequential => "EXTRA_SEQUENTIAL",
        }
    }
}

impl fmt::Display for Shaping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shaping.{}", self.name())
    }
}

impl FromStr for Shaping {
    type Err = String;

    /// Accepts `Shaping.EXTRA` as well as the bare `EXTRA`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = s.strip_prefix("Shaping.").unwrap_or(s);
        Shaping::ALL
            .iter()
            .copied()
            .find(|shaping| shaping.name() == bare)
            .ok_or_else(|| format!("unknown shaping '{}'", s))
    }
}

/// Scored transition, broken down by component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reward {
    /// Negative weighted mean of the normalised tracking errors, in [-1, 0].
    pub base: f64,
    /// Sum of potential-difference terms; 0 under STANDARD shaping.
    pub shaping: f64,
    pub components: Vec<(&'static str, f64)>,
}

impl Reward {
    pub fn total(&self) -> f64 {
        self.base + self.shaping
    }

    pub fn components_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.components
            .iter()
            .map(|(name, value)| (name.to_string(), serde_json::json!(value)))
            .collect()
    }
}

/// Pure reward function of (previous snapshot, current snapshot).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardFunction {
    shaping: Shaping,
    base: Vec<ErrorComponent>,
    terms: Vec<ShapingTerm>,
}

impl RewardFunction {
    /// # Arguments
    /// - `shaping`: Variant selecting which shaping terms exist.
    /// - `base`: Error components averaged into the base reward.
    /// - `terms`: Potential-difference terms, ignored under STANDARD.
    pub fn new(shaping: Shaping, base: Vec<ErrorComponent>, terms: Vec<ShapingTerm>) -> Self {
        let terms = if shaping == Shaping::Standard {
            Vec::new()
        } else {
            terms
        };
        Self {
            shaping,
            base,
            terms,
        }
    }

    pub fn shaping(&self) -> Shaping {
        self.shaping
    }

    pub fn base_components(&self) -> &[ErrorComponent] {
        &self.base
    }

    pub fn shaping_terms(&self) -> &[ShapingTerm] {
        &self.terms
    }

    pub fn evaluate(&self, previous: &PropertySnapshot, current: &PropertySnapshot) -> Reward {
        let mut components = Vec::with_capacity(self.base.len() + self.terms.len());

        let total_weight: f64 = self.base.iter().map(|c| c.weight).sum();
        let mut base = 0.0;
        for component in &self.base {
            let value = -component.weight * component.normalised_error(current);
            components.push((component.name, value));
            base += value;
        }
        if total_weight > 0.0 {
            base /= total_weight;
        }

        let mut shaping = 0.0;
        for term in &self.terms {
            let value = term.evaluate(previous, current);
            components.push((term.name, value));
            shaping += value;
        }

        Reward {
            base,
            shaping,
            components,
        }
    }
}

/// Scaling constants shared by the heading tasks.
pub mod scaling {
    pub const ALTITUDE_FT: f64 = 150.0;
    pub const TRACK_DEG: f64 = 8.0;
    pub const ROLL_RAD: f64 = 0.15;
    pub const SIDESLIP_DEG: f64 = 3.0;
    pub const ACTION_PENALTY: f64 = 0.5;
    /// Track error within which the sequential shaping terms engage.
    pub const SEQUENTIAL_TRACK_THRESHOLD_DEG: f64 = 10.0;
    pub const TRAJECTORY_ALTITUDE_FT: f64 = 100.0;
    pub const POSITION_FT: f64 = 5000.0;
}

/// Reward function for the heading tasks.
///
/// Base components are altitude and track error, plus an elevator action
/// penalty when `action_penalty` is set. EXTRA adds progress on both errors
/// together with wings-level and no-sideslip terms. EXTRA_SEQUENTIAL keeps
/// track progress unconditional and gates every other term on the track error.
pub fn heading_reward(shaping: Shaping, action_penalty: bool) -> RewardFunction {
    let altitude = ErrorComponent::new(
        "altitude_error",
        catalog::ALTITUDE_ERROR_FT,
        scaling::ALTITUDE_FT,
    );
    let track = ErrorComponent::new("track_error", catalog::TRACK_ERROR_DEG, scaling::TRACK_DEG);

    let mut base = vec![altitude.clone(), track.clone()];
    if action_penalty {
        base.push(ErrorComponent::new(
            "elevator_penalty",
            catalog::ELEVATOR_CMD,
            scaling::ACTION_PENALTY,
        ));
    }

    let gate = (shaping == Shaping::ExtraSequential).then(|| Gate {
        property: catalog::TRACK_ERROR_DEG,
        threshold: scaling::SEQUENTIAL_TRACK_THRESHOLD_DEG,
    });
    let gated = |term: ShapingTerm| match &gate {
        Some(gate) => term.gated_by(gate.clone()),
        None => term,
    };

    let terms = vec![
        ShapingTerm::new("track_progress", track),
        gated(ShapingTerm::new("altitude_progress", altitude)),
        gated(ShapingTerm::new(
            "wings_level",
            ErrorComponent::new("wings_level", catalog::ROLL_RAD, scaling::ROLL_RAD),
        )),
        gated(ShapingTerm::new(
            "no_sideslip",
            ErrorComponent::new("no_sideslip", catalog::SIDESLIP_DEG, scaling::SIDESLIP_DEG),
        )),
    ];

    RewardFunction::new(shaping, base, terms)
}

/// Reward function for the trajectory task.
///
/// Base components are altitude error and horizontal distance to the
/// navigation point. EXTRA adds ungated wings-level and no-sideslip terms.
pub fn trajectory_reward(shaping: Shaping) -> RewardFunction {
    let base = vec![
        ErrorComponent::new(
            "altitude_error",
            catalog::ALTITUDE_ERROR_FT,
            scaling::TRAJECTORY_ALTITUDE_FT,
        ),
        ErrorComponent::new(
            "position_error",
            catalog::POSITION_ERROR_FT,
            scaling::POSITION_FT,
        ),
    ];
    let terms = vec![
        ShapingTerm::new(
            "wings_level",
            ErrorComponent::new("wings_level", catalog::ROLL_RAD, scaling::ROLL_RAD),
        ),
        ShapingTerm::new(
            "no_sideslip",
            ErrorComponent::new("no_sideslip", catalog::SIDESLIP_DEG, scaling::SIDESLIP_DEG),
        ),
    ];
    RewardFunction::new(shaping, base, terms)
}

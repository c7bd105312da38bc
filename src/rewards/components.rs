use serde::Serialize;

use crate::properties::{catalog, PropertyId, PropertySnapshot};

/// Asymptotic error term on one property.
///
/// With absolute error `e` and scaling `s` the normalised error is `e / (e + s)`,
/// which is 0 on target, 0.5 at `e == s` and tends to 1. Missing or non-finite
/// values count as the worst case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorComponent {
    pub name: &'static str,
    #[serde(serialize_with = "serialize_property")]
    pub property: PropertyId,
    pub target: f64,
    pub scaling: f64,
    pub weight: f64,
}

fn serialize_property<S: serde::Serializer>(id: &PropertyId, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(catalog::descriptor(*id).semantic_name)
}

impl ErrorComponent {
    pub fn new(name: &'static str, property: PropertyId, scaling: f64) -> Self {
        Self {
            name,
            property,
            target: 0.0,
            scaling,
            weight: 1.0,
        }
    }

    pub fn with_target(mut self, target: f64) -> Self {
        self.target = target;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn error(&self, snapshot: &PropertySnapshot) -> f64 {
        (snapshot.get(self.property) - self.target).abs()
    }

    pub fn normalised_error(&self, snapshot: &PropertySnapshot) -> f64 {
        let error = self.error(snapshot);
        if !error.is_finite() {
            return 1.0;
        }
        error / (error + self.scaling)
    }

    /// 1 on target, falling towards 0 as the error grows.
    pub fn potential(&self, snapshot: &PropertySnapshot) -> f64 {
        1.0 - self.normalised_error(snapshot)
    }
}

/// Condition under which a shaping term is allowed to contribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gate {
    #[serde(serialize_with = "serialize_property")]
    pub property: PropertyId,
    /// Term is active while `|value| <= threshold` in the current snapshot.
    pub threshold: f64,
}

impl Gate {
    pub fn is_open(&self, snapshot: &PropertySnapshot) -> bool {
        let value = snapshot.get(self.property);
        value.is_finite() && value.abs() <= self.threshold
    }
}

/// Potential-difference term: `potential(current) - potential(previous)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapingTerm {
    pub name: &'static str,
    pub component: ErrorComponent,
    pub gate: Option<Gate>,
}

impl ShapingTerm {
    pub fn new(name: &'static str, component: ErrorComponent) -> Self {
        Self {
            name,
            component,
            gate: None,
        }
    }

    pub fn gated_by(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn evaluate(&self, previous: &PropertySnapshot, current: &PropertySnapshot) -> f64 {
        if let Some(gate) = &self.gate {
            if !gate.is_open(current) {
                return 0.0;
            }
        }
        let delta = self.component.potential(current) - self.component.potential(previous);
        self.component.weight * delta
    }
}

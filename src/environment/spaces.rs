use serde::{Deserialize, Serialize};

use crate::properties::{catalog, PropertyId};

/// Axis-aligned box of named real values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSpace {
    pub low: Vec<f64>,
    pub high: Vec<f64>,
    pub names: Vec<String>,
}

impl BoxSpace {
    /// Space spanning each property's catalogued range.
    pub fn from_properties(properties: &[PropertyId]) -> Self {
        let descriptors: Vec<_> = properties.iter().map(|id| catalog::descriptor(*id)).collect();
        Self {
            low: descriptors.iter().map(|d| d.min).collect(),
            high: descriptors.iter().map(|d| d.max).collect(),
            names: descriptors
                .iter()
                .map(|d| d.semantic_name.to_string())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_empty()
    }

    pub fn contains(&self, values: &[f64]) -> bool {
        values.len() == self.len()
            && values
                .iter()
                .zip(self.low.iter().zip(&self.high))
                .all(|(v, (lo, hi))| v.is_finite() && lo <= v && v <= hi)
    }

    /// Why `values` is not in the space, if it is not.
    pub fn violation(&self, values: &[f64]) -> Option<String> {
        if values.len() != self.len() {
            return Some(format!(
                "expected {} values, got {}",
                self.len(),
                values.len()
            ));
        }
        values
            .iter()
            .zip(&self.names)
            .zip(self.low.iter().zip(&self.high))
            .find(|((v, _), (lo, hi))| !(v.is_finite() && *lo <= *v && *v <= *hi))
            .map(|((v, name), (lo, hi))| format!("{} = {} is outside [{}, {}]", name, v, lo, hi))
    }
}

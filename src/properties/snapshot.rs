use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{catalog, PropertyId};

/// Point-in-time copy of every catalogued property value.
///
/// Values never written read back as NaN. Reward strategies consume a pair of
/// these (previous, current) and nothing else.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySnapshot {
    values: Vec<f64>,
}

impl Default for PropertySnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertySnapshot {
    pub fn new() -> Self {
        Self {
            values: vec![f64::NAN; catalog::len()],
        }
    }

    /// Build a snapshot from explicit `(id, value)` pairs; everything else is NaN.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (PropertyId, f64)>,
    {
        let mut snapshot = Self::new();
        for (id, value) in pairs {
            snapshot.set(id, value);
        }
        snapshot
    }

    #[inline]
    pub fn get(&self, id: PropertyId) -> f64 {
        self.values[id.index()]
    }

    #[inline]
    pub fn set(&mut self, id: PropertyId, value: f64) {
        self.values[id.index()] = value;
    }

    pub fn is_set(&self, id: PropertyId) -> bool {
        !self.get(id).is_nan()
    }
}

impl Serialize for PropertySnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let set: Vec<_> = catalog::all()
            .filter(|(id, _)| self.is_set(*id))
            .collect();
        let mut map = serializer.serialize_map(Some(set.len()))?;
        for (id, descriptor) in set {
            map.serialize_entry(descriptor.semantic_name, &self.get(id))?;
        }
        map.end()
    }
}

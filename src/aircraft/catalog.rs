use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::AircraftError;
use crate::physics::ModelReference;
use crate::utils::KTS_TO_FPS;

/// Aircraft available to the environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AircraftId {
    C172,
    A320,
    F15,
    PA28,
    B747,
    F16,
    J3,
    MD11,
    OV10,
    DHC6,
    PC7,
    C130,
    WF,
    SS,
}

impl AircraftId {
    pub const ALL: [AircraftId; 14] = [
        AircraftId::C172,
        AircraftId::A320,
        AircraftId::F15,
        AircraftId::PA28,
        AircraftId::B747,
        AircraftId::F16,
        AircraftId::J3,
        AircraftId::MD11,
        AircraftId::OV10,
        AircraftId::DHC6,
        AircraftId::PC7,
        AircraftId::C130,
        AircraftId::WF,
        AircraftId::SS,
    ];

    pub fn as_str(&self) -> &'static str {
        self.spec().name
    }

    pub fn spec(&self) -> &'static AircraftSpec {
        // ALL and SPECS share ordering
        &SPECS[*self as usize]
    }
}

impl fmt::Display for AircraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AircraftId {
    type Err = AircraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AircraftId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| AircraftError::UnknownAircraft(s.to_string()))
    }
}

/// Static description of one aircraft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AircraftSpec {
    pub id: AircraftId,
    /// Short name used in environment ids.
    pub name: &'static str,
    /// Flight-dynamics model identifier; the model file is `aircraft/<engine_model>.yaml`.
    pub engine_model: &'static str,
    /// Model name passed to FlightGear.
    pub flightgear_model: &'static str,
    pub cruise_speed_kts: f64,
}

impl AircraftSpec {
    pub fn cruise_speed_fps(&self) -> f64 {
        self.cruise_speed_kts * KTS_TO_FPS
    }

    pub fn model_path(&self, asset_dir: &Path) -> PathBuf {
        asset_dir
            .join("aircraft")
            .join(format!("{}.yaml", self.engine_model))
    }

    /// Locate the model file, failing if it is not present on disk.
    pub fn model_reference(&self, asset_dir: &Path) -> Result<ModelReference, AircraftError> {
        let path = self.model_path(asset_dir);
        if !path.is_file() {
            return Err(AircraftError::ModelNotFound {
                aircraft: self.name.to_string(),
                path,
            });
        }
        Ok(ModelReference {
            model_id: self.engine_model.to_string(),
            path,
        })
    }
}

const fn spec(
    id: AircraftId,
    name: &'static str,
    engine_model: &'static str,
    flightgear_model: &'static str,
    cruise_speed_kts: f64,
) -> AircraftSpec {
    AircraftSpec {
        id,
        name,
        engine_model,
        flightgear_model,
        cruise_speed_kts,
    }
}

static SPECS: [AircraftSpec; 14] = [
    spec(AircraftId::C172, "C172", "c172p", "c172p", 120.0),
    spec(AircraftId::A320, "A320", "A320", "A320-200-CFM", 430.0),
    spec(AircraftId::F15, "F15", "f15", "f15c", 500.0),
    spec(AircraftId::PA28, "PA28", "pa28", "pa28-161-180", 130.0),
    spec(AircraftId::B747, "B747", "B747", "747-400", 490.0),
    spec(AircraftId::F16, "F16", "f16", "f16-block52", 500.0),
    spec(AircraftId::J3, "J3", "J3Cub", "J3Cub", 65.0),
    spec(AircraftId::MD11, "MD11", "MD11", "MD11", 480.0),
    spec(AircraftId::OV10, "OV10", "OV10", "OV10", 220.0),
    spec(AircraftId::DHC6, "DHC6", "DHC6", "dhc6", 150.0),
    spec(AircraftId::PC7, "PC7", "pc7", "pc7", 220.0),
    spec(AircraftId::C130, "C130", "C130", "c130", 290.0),
    spec(AircraftId::WF, "WF", "wrightFlyer1903", "wrightFlyer1903", 26.0),
    spec(AircraftId::SS, "SS", "Concorde", "Concorde", 1160.0),
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ids_round_trip_through_names() {
        for id in AircraftId::ALL {
            assert_eq!(id.spec().id, id);
            assert_eq!(id.to_string().parse::<AircraftId>().unwrap(), id);
        }
    }

    #[test]
    fn test_unknown_aircraft() {
        assert!(matches!(
            "Spitfire".parse::<AircraftId>(),
            Err(AircraftError::UnknownAircraft(name)) if name == "Spitfire"
        ));
    }

    #[test]
    fn test_model_path_layout() {
        let spec = AircraftId::C172.spec();
        assert_eq!(
            spec.model_path(Path::new("/data")),
            PathBuf::from("/data/aircraft/c172p.yaml")
        );
        approx::assert_relative_eq!(spec.cruise_speed_fps(), 202.537, epsilon = 1e-3);
    }

    #[test]
    fn test_missing_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AircraftId::F15.spec().model_reference(dir.path()).unwrap_err();
        assert!(matches!(err, AircraftError::ModelNotFound { .. }));
    }
}

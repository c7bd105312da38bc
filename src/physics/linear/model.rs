use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::physics::EngineError;

/// Trimmed reference condition the stability derivatives were taken about.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceCondition {
    pub airspeed_fps: f64,
    pub alpha_rad: f64,
    /// Normalised elevator command holding the reference condition.
    pub elevator: f64,
    /// Normalised throttle command holding the reference condition.
    pub throttle: f64,
}

/// Longitudinal dimensional derivatives (per unit state or normalised command).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LongitudinalDerivatives {
    pub x_u: f64,
    pub x_w: f64,
    pub x_throttle: f64,
    pub z_u: f64,
    pub z_w: f64,
    pub z_elevator: f64,
    pub m_u: f64,
    pub m_w: f64,
    pub m_q: f64,
    pub m_elevator: f64,
}

/// Lateral-directional dimensional derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LateralDerivatives {
    pub y_v: f64,
    pub y_rudder: f64,
    pub l_v: f64,
    pub l_p: f64,
    pub l_r: f64,
    pub l_aileron: f64,
    pub l_rudder: f64,
    pub n_v: f64,
    pub n_p: f64,
    pub n_r: f64,
    pub n_aileron: f64,
    pub n_rudder: f64,
}

/// Small-perturbation aircraft model as stored in `aircraft/<model_id>.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearModel {
    pub name: String,
    pub reference: ReferenceCondition,
    pub longitudinal: LongitudinalDerivatives,
    pub lateral: LateralDerivatives,
}

impl LinearModel {
    pub fn from_yaml_str(model_id: &str, contents: &str) -> Result<Self, EngineError> {
        let model: LinearModel =
            serde_yaml::from_str(contents).map_err(|e| EngineError::InvalidModel {
                model: model_id.to_string(),
                reason: e.to_string(),
            })?;
        model.validate(model_id)?;
        Ok(model)
    }

    pub fn from_file(model_id: &str, path: &Path) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path).map_err(|e| EngineError::InvalidModel {
            model: model_id.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })?;
        Self::from_yaml_str(model_id, &contents)
    }

    /// Reject models that cannot hold a trimmed condition or that lack damping.
    pub fn validate(&self, model_id: &str) -> Result<(), EngineError> {
        let invalid = |reason: &str| EngineError::InvalidModel {
            model: model_id.to_string(),
            reason: reason.to_string(),
        };

        let r = &self.reference;
        if !(r.airspeed_fps.is_finite() && r.airspeed_fps > 0.0) {
            return Err(invalid("reference airspeed must be positive"));
        }
        if !(r.alpha_rad.is_finite() && r.alpha_rad.abs() < 0.5) {
            return Err(invalid("reference alpha must lie within ±0.5 rad"));
        }
        if !(-1.0..=1.0).contains(&r.elevator) {
            return Err(invalid("reference elevator must lie within [-1, 1]"));
        }
        if !(0.0..=1.0).contains(&r.throttle) {
            return Err(invalid("reference throttle must lie within [0, 1]"));
        }

        let lon = &self.longitudinal;
        let lat = &self.lateral;
        let all = [
            lon.x_u, lon.x_w, lon.x_throttle, lon.z_u, lon.z_w, lon.z_elevator, lon.m_u, lon.m_w,
            lon.m_q, lon.m_elevator, lat.y_v, lat.y_rudder, lat.l_v, lat.l_p, lat.l_r,
            lat.l_aileron, lat.l_rudder, lat.n_v, lat.n_p, lat.n_r, lat.n_aileron, lat.n_rudder,
        ];
        if all.iter().any(|d| !d.is_finite()) {
            return Err(invalid("derivatives must be finite"));
        }
        if lon.m_q >= 0.0 || lon.z_w >= 0.0 || lat.l_p >= 0.0 || lat.n_r >= 0.0 {
            return Err(invalid("damping derivatives m_q, z_w, l_p and n_r must be negative"));
        }
        Ok(())
    }

    pub fn reference_w_fps(&self) -> f64 {
        self.reference.airspeed_fps * self.reference.alpha_rad.tan()
    }
}

#[cfg(test)]
pub(crate) const C172_YAML: &str = r#"
name: Cessna 172P
reference:
  airspeed_fps: 202.6
  alpha_rad: 0.03
  elevator: -0.03
  throttle: 0.62
longitudinal:
  x_u: -0.03
  x_w: 0.07
  x_throttle: 9.0
  z_u: -0.30
  z_w: -2.2
  z_elevator: -10.0
  m_u: 0.0
  m_w: -0.05
  m_q: -4.0
  m_elevator: -12.0
lateral:
  y_v: -0.3
  y_rudder: 4.0
  l_v: -0.1
  l_p: -10.0
  l_r: 1.8
  l_aileron: 10.0
  l_rudder: 0.7
  n_v: 0.035
  n_p: -0.3
  n_r: -1.0
  n_aileron: -0.5
  n_rudder: -4.5
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_model() {
        let model = LinearModel::from_yaml_str("c172p", C172_YAML).unwrap();
        assert_eq!(model.name, "Cessna 172P");
        assert_eq!(model.reference.throttle, 0.62);
        assert!(model.reference_w_fps() > 0.0);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = C172_YAML.replace("name: Cessna 172P", "name: Cessna 172P\nwingspan: 36");
        assert!(matches!(
            LinearModel::from_yaml_str("c172p", &yaml),
            Err(EngineError::InvalidModel { .. })
        ));
    }

    #[test]
    fn test_undamped_model_rejected() {
        let yaml = C172_YAML.replace("m_q: -4.0", "m_q: 0.5");
        let err = LinearModel::from_yaml_str("c172p", &yaml).unwrap_err();
        assert!(err.to_string().contains("damping"));
    }
}

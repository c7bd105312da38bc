use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{TaskError, TaskTargets};
use crate::properties::{catalog, PropertyId};
use crate::rewards::{heading_reward, trajectory_reward, RewardFunction, Shaping};
use crate::simulation::{INITIAL_ALTITUDE_FT, INITIAL_HEADING_DEG};

/// Navigation point of the trajectory task, relative to the initial position.
pub const NAVIGATION_POINT_NORTH_FT: f64 = 2000.0;
pub const NAVIGATION_POINT_EAST_FT: f64 = -8000.0;

/// Observation layout shared by every heading task.
pub const BASE_OBSERVATION: [PropertyId; 11] = [
    catalog::ALTITUDE_SL_FT,
    catalog::PITCH_RAD,
    catalog::ROLL_RAD,
    catalog::U_FPS,
    catalog::V_FPS,
    catalog::W_FPS,
    catalog::P_RADPS,
    catalog::Q_RADPS,
    catalog::R_RADPS,
    catalog::ALTITUDE_ERROR_FT,
    catalog::TRACK_ERROR_DEG,
];

/// Observation layout of the trajectory task.
pub const TRAJECTORY_OBSERVATION: [PropertyId; 16] = [
    catalog::ALTITUDE_SL_FT,
    catalog::PITCH_RAD,
    catalog::ROLL_RAD,
    catalog::U_FPS,
    catalog::V_FPS,
    catalog::W_FPS,
    catalog::P_RADPS,
    catalog::Q_RADPS,
    catalog::R_RADPS,
    catalog::AILERON_CMD,
    catalog::ELEVATOR_CMD,
    catalog::RUDDER_CMD,
    catalog::ALTITUDE_ERROR_FT,
    catalog::POSITION_ERROR_FT,
    catalog::SIDESLIP_DEG,
    catalog::VERTICAL_SPEED_FPS,
];

/// Aileron, elevator, rudder.
pub const ACTIONS: [PropertyId; 3] = [
    catalog::AILERON_CMD,
    catalog::ELEVATOR_CMD,
    catalog::RUDDER_CMD,
];

/// The closed set of scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    /// Hold heading 270° and the starting altitude.
    HeadingControl,
    /// Turn from a random initial heading onto a random target heading.
    TurnHeadingControl,
    /// Heading hold with sideslip and control positions observed and elevator use penalised.
    SmoothHeading,
    /// Fly to a fixed navigation point while holding the starting altitude.
    Trajectory,
}

impl TaskKind {
    pub const ALL: [TaskKind; 4] = [
        TaskKind::HeadingControl,
        TaskKind::TurnHeadingControl,
        TaskKind::SmoothHeading,
        TaskKind::Trajectory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::HeadingControl => "HeadingControlTask",
            TaskKind::TurnHeadingControl => "TurnHeadingControlTask",
            TaskKind::SmoothHeading => "SmoothHeadingTask",
            TaskKind::Trajectory => "TrajectoryTask",
        }
    }

    /// Sequential shaping needs a track error to gate on, so only the
    /// heading-hold and turn tasks offer it.
    pub fn supports(&self, shaping: Shaping) -> bool {
        match self {
            TaskKind::HeadingControl | TaskKind::TurnHeadingControl => true,
            TaskKind::SmoothHeading | TaskKind::Trajectory => shaping != Shaping::ExtraSequential,
        }
    }

    pub fn observation_properties(&self) -> Vec<PropertyId> {
        match self {
            TaskKind::HeadingControl | TaskKind::TurnHeadingControl => BASE_OBSERVATION.to_vec(),
            TaskKind::SmoothHeading => {
                let mut properties = BASE_OBSERVATION.to_vec();
                properties.push(catalog::SIDESLIP_DEG);
                properties.extend(ACTIONS);
                properties
            }
            TaskKind::Trajectory => TRAJECTORY_OBSERVATION.to_vec(),
        }
    }

    pub fn action_properties(&self) -> Vec<PropertyId> {
        ACTIONS.to_vec()
    }

    pub fn reward_function(&self, shaping: Shaping) -> Result<RewardFunction, TaskError> {
        if !self.supports(shaping) {
            return Err(TaskError::UnsupportedShaping {
                task: self.name().to_string(),
                shaping,
            });
        }
        Ok(match self {
            TaskKind::Trajectory => trajectory_reward(shaping),
            _ => heading_reward(shaping, *self == TaskKind::SmoothHeading),
        })
    }

    /// Draw this episode's targets. Only the turn task consumes randomness.
    pub fn sample_targets<R: Rng>(&self, rng: &mut R) -> TaskTargets {
        match self {
            TaskKind::HeadingControl | TaskKind::SmoothHeading => TaskTargets {
                track_deg: INITIAL_HEADING_DEG,
                altitude_ft: INITIAL_ALTITUDE_FT,
                initial_heading_deg: INITIAL_HEADING_DEG,
                navigation_point_ft: None,
            },
            TaskKind::Trajectory => TaskTargets {
                track_deg: INITIAL_HEADING_DEG,
                altitude_ft: INITIAL_ALTITUDE_FT,
                initial_heading_deg: INITIAL_HEADING_DEG,
                navigation_point_ft: Some([NAVIGATION_POINT_NORTH_FT, NAVIGATION_POINT_EAST_FT]),
            },
            TaskKind::TurnHeadingControl => {
                let initial_heading_deg = rng.gen_range(0.0..360.0);
                let track_deg = rng.gen_range(0.0..360.0);
                TaskTargets {
                    track_deg,
                    altitude_ft: INITIAL_ALTITUDE_FT,
                    initial_heading_deg,
                    navigation_point_ft: None,
                }
            }
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskKind {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| TaskError::UnknownTask(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::RngManager;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_observation_layouts() {
        assert_eq!(TaskKind::HeadingControl.observation_properties().len(), 11);
        let smooth = TaskKind::SmoothHeading.observation_properties();
        assert_eq!(smooth.len(), 15);
        assert_eq!(smooth[11], catalog::SIDESLIP_DEG);
        assert_eq!(&smooth[12..], &ACTIONS);
        let trajectory = TaskKind::Trajectory.observation_properties();
        assert_eq!(trajectory.len(), 16);
        assert_eq!(trajectory[13], catalog::POSITION_ERROR_FT);
    }

    #[test]
    fn test_trajectory_targets_and_shaping() {
        let targets =
            TaskKind::Trajectory.sample_targets(&mut RngManager::new(1).get_rng("task"));
        assert_eq!(targets.navigation_point_ft, Some([2000.0, -8000.0]));
        assert_eq!(targets.initial_heading_deg, 270.0);
        assert!(TaskKind::Trajectory.reward_function(Shaping::Extra).is_ok());
        assert!(matches!(
            TaskKind::Trajectory.reward_function(Shaping::ExtraSequential),
            Err(TaskError::UnsupportedShaping { .. })
        ));
    }

    #[test]
    fn test_smooth_heading_rejects_sequential_shaping() {
        assert!(matches!(
            TaskKind::SmoothHeading.reward_function(Shaping::ExtraSequential),
            Err(TaskError::UnsupportedShaping { .. })
        ));
        assert!(TaskKind::TurnHeadingControl
            .reward_function(Shaping::ExtraSequential)
            .is_ok());
    }

    #[test]
    fn test_turn_targets_are_seeded() {
        let a = TaskKind::TurnHeadingControl
            .sample_targets(&mut RngManager::new(3).get_rng("task"));
        let b = TaskKind::TurnHeadingControl
            .sample_targets(&mut RngManager::new(3).get_rng("task"));
        assert_eq!(a, b);
        assert!((0.0..360.0).contains(&a.track_deg));
        assert!((0.0..360.0).contains(&a.initial_heading_deg));
    }

    #[test]
    fn test_heading_control_targets_are_fixed() {
        let targets =
            TaskKind::HeadingControl.sample_targets(&mut RngManager::new(9).get_rng("task"));
        assert_eq!(targets.track_deg, 270.0);
        assert_eq!(targets.altitude_ft, 5000.0);
    }

    #[test]
    fn test_names_parse() {
        for kind in TaskKind::ALL {
            assert_eq!(kind.name().parse::<TaskKind>().unwrap(), kind);
        }
        assert!("HoverTask".parse::<TaskKind>().is_err());
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use super::kind::TaskKind;
use super::termination::{check_arrival, check_bounds, terminal_penalty, TerminalReason};
use super::TaskError;
use crate::aircraft::AircraftSpec;
use crate::properties::{catalog, PropertyId, PropertySnapshot};
use crate::rewards::{RewardFunction, Shaping};
use crate::simulation::{InitialConditions, Simulation};
use crate::utils::shortest_signed_angle_deg;

/// Episode lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPhase {
    Uninitialized,
    EpisodeActive,
    Terminated,
    Truncated,
}

impl TaskPhase {
    pub fn is_done(&self) -> bool {
        matches!(self, TaskPhase::Terminated | TaskPhase::Truncated)
    }
}

/// Targets sampled at reset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskTargets {
    pub track_deg: f64,
    pub altitude_ft: f64,
    pub initial_heading_deg: f64,
    /// North and east offset of the navigation point from the initial position.
    #[serde(default)]
    pub navigation_point_ft: Option<[f64; 2]>,
}

/// Mutable state of the running episode. Replaced wholesale on every reset.
#[derive(Debug, Clone)]
pub struct EpisodeState {
    pub id: Uuid,
    pub episode: u64,
    pub targets: TaskTargets,
    pub steps_taken: u64,
    pub steps_left: u64,
    pub sim_time: f64,
    pub previous: PropertySnapshot,
    pub current: PropertySnapshot,
    pub observation: Vec<f64>,
    pub phase: TaskPhase,
    pub reason: Option<TerminalReason>,
}

/// Result of one task transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskStep {
    pub observation: Vec<f64>,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
    pub info: Map<String, Value>,
}

/// One scenario: observation layout, targets, termination and reward.
#[derive(Debug)]
pub struct FlightTask {
    kind: TaskKind,
    reward: RewardFunction,
    observation: Vec<PropertyId>,
    actions: Vec<PropertyId>,
    max_steps: u64,
    episodes_started: u64,
    episode: Option<EpisodeState>,
}

impl FlightTask {
    pub fn new(kind: TaskKind, shaping: Shaping, max_steps: u64) -> Result<Self, TaskError> {
        if max_steps == 0 {
            return Err(TaskError::InvalidEpisodeLength);
        }
        let reward = kind.reward_function(shaping)?;
        if let Some(gate) = reward.shaping_terms().iter().find_map(|t| t.gate.as_ref()) {
            debug!(
                "{} sequential shaping engages within {}° of track",
                kind, gate.threshold
            );
        }
        Ok(Self {
            kind,
            reward,
            observation: kind.observation_properties(),
            actions: kind.action_properties(),
            max_steps,
            episodes_started: 0,
            episode: None,
        })
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn shaping(&self) -> Shaping {
        self.reward.shaping()
    }

    pub fn reward_function(&self) -> &RewardFunction {
        &self.reward
    }

    pub fn observation_properties(&self) -> &[PropertyId] {
        &self.observation
    }

    pub fn action_properties(&self) -> &[PropertyId] {
        &self.actions
    }

    pub fn max_steps(&self) -> u64 {
        self.max_steps
    }

    pub fn phase(&self) -> TaskPhase {
        self.episode
            .as_ref()
            .map_or(TaskPhase::Uninitialized, |e| e.phase)
    }

    pub fn episode(&self) -> Option<&EpisodeState> {
        self.episode.as_ref()
    }

    pub fn initial_conditions(
        &self,
        aircraft: &AircraftSpec,
        targets: &TaskTargets,
    ) -> InitialConditions {
        InitialConditions::for_aircraft(aircraft).with_heading(targets.initial_heading_deg)
    }

    /// Start an episode on an initialised and trimmed simulation.
    pub fn begin_episode(
        &mut self,
        sim: &mut Simulation,
        targets: TaskTargets,
    ) -> Result<(Vec<f64>, Map<String, Value>), TaskError> {
        sim.set(catalog::TARGET_TRACK_DEG, targets.track_deg)?;
        sim.set(catalog::TARGET_ALTITUDE_FT, targets.altitude_ft)?;
        sim.set(catalog::STEPS_LEFT, self.max_steps as f64)?;
        if let Some([north, east]) = targets.navigation_point_ft {
            sim.set(catalog::TARGET_NORTH_FT, sim.get(catalog::NORTH_FT) + north)?;
            sim.set(catalog::TARGET_EAST_FT, sim.get(catalog::EAST_FT) + east)?;
        }
        update_errors(sim, &targets)?;

        let snapshot = sim.snapshot();
        let observation = self.observe(&snapshot);
        self.episodes_started += 1;
        let episode = EpisodeState {
            id: Uuid::new_v4(),
            episode: self.episodes_started,
            targets,
            steps_taken: 0,
            steps_left: self.max_steps,
            sim_time: sim.sim_time(),
            previous: snapshot.clone(),
            current: snapshot,
            observation: observation.clone(),
            phase: TaskPhase::EpisodeActive,
            reason: None,
        };
        info!(
            "Episode {} ({}) started: target track {:.1}°, target altitude {:.0} ft, initial heading {:.1}°",
            episode.episode,
            self.kind,
            targets.track_deg,
            targets.altitude_ft,
            targets.initial_heading_deg
        );
        let info = self.base_info(&episode);
        self.episode = Some(episode);
        Ok((observation, info))
    }

    /// Apply an already-validated action and advance one agent step.
    pub fn step(&mut self, sim: &mut Simulation, action: &[f64]) -> Result<TaskStep, TaskError> {
        let episode = self.episode.as_ref().ok_or(TaskError::NoEpisode)?;
        if episode.phase.is_done() {
            let mut info = self.base_info(episode);
            info.insert("already_done".into(), json!(true));
            return Ok(TaskStep {
                observation: episode.observation.clone(),
                reward: 0.0,
                terminated: episode.phase == TaskPhase::Terminated,
                truncated: episode.phase == TaskPhase::Truncated,
                info,
            });
        }
        let targets = episode.targets;

        for (id, value) in self.actions.iter().zip(action) {
            sim.set(*id, *value)?;
        }
        let result = sim.advance();

        let mut episode = match self.episode.take() {
            Some(episode) => episode,
            None => return Err(TaskError::NoEpisode),
        };
        episode.steps_taken += 1;
        episode.steps_left = episode.steps_left.saturating_sub(1);
        episode.sim_time = result.sim_time;
        sim.set(catalog::STEPS_LEFT, episode.steps_left as f64)?;

        let (reward, reason, components) = if result.success {
            update_errors(sim, &targets)?;
            let current = sim.snapshot();
            let scored = self.reward.evaluate(&episode.current, &current);
            episode.observation = self.observe(&current);
            episode.previous = std::mem::replace(&mut episode.current, current);
            let reason = check_bounds(&episode.current).or_else(|| match self.kind {
                TaskKind::Trajectory => check_arrival(&episode.current),
                _ => None,
            });
            (scored.total(), reason, scored.components_json())
        } else {
            // Keep the last valid observation and snapshots.
            let detail = result
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown engine failure".to_string());
            let reason = TerminalReason::SimulationFailure { detail };
            (0.0, Some(reason), Map::new())
        };

        let terminated = reason.is_some();
        let truncated = !terminated && episode.steps_left == 0;
        let failed = reason.as_ref().is_some_and(TerminalReason::is_failure);
        let reward = if failed {
            terminal_penalty(episode.steps_left)
        } else {
            reward
        };
        episode.phase = if terminated {
            TaskPhase::Terminated
        } else if truncated {
            TaskPhase::Truncated
        } else {
            TaskPhase::EpisodeActive
        };

        let mut info = self.base_info(&episode);
        info.insert("reward_components".into(), Value::Object(components));
        if let Some(reason) = &reason {
            info!(
                "Episode {} terminated after {} steps: {}",
                episode.episode, episode.steps_taken, reason
            );
            info.insert("reason".into(), json!(reason.code()));
            info.insert("reason_detail".into(), json!(reason.to_string()));
            if failed {
                info.insert("terminal_penalty".into(), json!(reward));
            }
        } else if truncated {
            info!(
                "Episode {} truncated after {} steps",
                episode.episode, episode.steps_taken
            );
            info.insert("reason".into(), json!("time_limit"));
        }
        episode.reason = reason;

        let observation = episode.observation.clone();
        self.episode = Some(episode);
        Ok(TaskStep {
            observation,
            reward,
            terminated,
            truncated,
            info,
        })
    }

    /// Compose the observation vector, clamped into each descriptor's range.
    pub fn observe(&self, snapshot: &PropertySnapshot) -> Vec<f64> {
        self.observation
            .iter()
            .map(|id| {
                let descriptor = catalog::descriptor(*id);
                let value = snapshot.get(*id);
                if value.is_nan() {
                    descriptor.clamp(0.0)
                } else {
                    descriptor.clamp(value)
                }
            })
            .collect()
    }

    fn base_info(&self, episode: &EpisodeState) -> Map<String, Value> {
        let mut info = Map::new();
        info.insert("episode".into(), json!(episode.episode));
        info.insert("episode_id".into(), json!(episode.id.to_string()));
        info.insert("sim_time_s".into(), json!(episode.sim_time));
        info.insert("steps_left".into(), json!(episode.steps_left));
        info.insert("target_track_deg".into(), json!(episode.targets.track_deg));
        info.insert(
            "target_altitude_ft".into(),
            json!(episode.targets.altitude_ft),
        );
        info
    }

    /// Drop the current episode, returning to the uninitialised phase.
    pub fn clear(&mut self) {
        self.episode = None;
    }
}

/// Recompute the error properties from the current engine state.
fn update_errors(sim: &mut Simulation, targets: &TaskTargets) -> Result<(), TaskError> {
    let altitude_error = targets.altitude_ft - sim.get(catalog::ALTITUDE_SL_FT);
    let track_error = shortest_signed_angle_deg(targets.track_deg, sim.get(catalog::HEADING_DEG));
    sim.set(catalog::ALTITUDE_ERROR_FT, altitude_error)?;
    sim.set(catalog::TRACK_ERROR_DEG, track_error)?;
    if targets.navigation_point_ft.is_some() {
        let north = sim.get(catalog::NORTH_FT) - sim.get(catalog::TARGET_NORTH_FT);
        let east = sim.get(catalog::EAST_FT) - sim.get(catalog::TARGET_EAST_FT);
        sim.set(catalog::POSITION_ERROR_FT, north.hypot(east))?;
    }
    Ok(())
}

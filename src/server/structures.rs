use serde::{Deserialize, Serialize};

use crate::environment::BoxSpace;
use crate::tasks::TaskStep;

/// Enum representing commands sent to the server, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    /// Build the environment. `config` is an `EnvConfigBuilder` in JSON form,
    /// e.g. `{"env_id": "C172-HeadingControlTask-Shaping.STANDARD-NoFG-v0"}`.
    Initialize { config: serde_json::Value },
    /// Start an episode, optionally reseeding.
    Reset {
        #[serde(default)]
        seed: Option<u64>,
    },
    /// Apply one action (aileron, elevator, rudder).
    Step { action: Vec<f64> },
    /// Render in the given mode (`human` or `flightgear`).
    Render { mode: String },
    /// Release the environment and end the connection.
    Close,
}

/// Struct representing the response from the server after a reset or step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Observation vector in observation-space order.
    pub obs: Vec<f64>,
    /// Reward for the current step; 0 after a reset.
    pub reward: f64,
    /// Whether the episode is terminated.
    pub terminated: bool,
    /// Whether the episode is truncated.
    pub truncated: bool,
    /// Additional info about the step or environment state.
    pub info: serde_json::Value,
}

impl From<TaskStep> for Response {
    fn from(step: TaskStep) -> Self {
        Self {
            obs: step.observation,
            reward: step.reward,
            terminated: step.terminated,
            truncated: step.truncated,
            info: serde_json::Value::Object(step.info),
        }
    }
}

/// Reply to a successful `Initialize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub env_id: String,
    pub observation_space: BoxSpace,
    pub action_space: BoxSpace,
}

/// Reply to a `human` render: a base64-encoded RGBA frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResponse {
    pub frame: Option<String>,
    pub width: u32,
    pub height: u32,
}

/// Reply to any command that failed. The connection stays open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

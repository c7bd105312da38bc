//! Reward shaping.
//!
//! Every reward is a pure function of the previous and current property
//! snapshots; no strategy keeps state between calls.

mod components;
mod strategy;

pub use components::{ErrorComponent, Gate, ShapingTerm};
pub use strategy::{
    heading_reward, scaling, trajectory_reward, Reward, RewardFunction, Shaping,
};

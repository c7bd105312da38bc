use approx::assert_relative_eq;
use flyer_gym::environment::EnvConfigBuilder;
use flyer_gym::utils::EnvError;
use pretty_assertions::assert_eq;

use crate::common::{
    assert_in_space, assert_reward_in_range, assert_step_finite, c172_builder, c172_env,
    env_for, C172_HEADING_EXTRA,
};

const NEUTRAL: [f64; 3] = [0.0, 0.0, 0.0];

#[test]
fn test_reset_starts_trimmed_on_target() {
    let mut env = c172_env();
    let (obs, info) = env.reset(Some(11)).unwrap();

    assert_in_space(env.observation_space(), &obs);
    assert_eq!(info["seed"], 11);
    assert!(info["trim_cost"].as_f64().unwrap() < 1e-6);
    assert_eq!(info["steps_left"], 300);
    assert_eq!(info["target_track_deg"], 270.0);

    // altitude error and track error close the base observation
    assert_relative_eq!(obs[9], 0.0, epsilon = 1.0);
    assert_relative_eq!(obs[10], 0.0, epsilon = 0.5);
}

#[test]
fn test_step_before_reset_is_rejected() {
    let mut env = c172_env();
    assert!(matches!(env.step(&NEUTRAL), Err(EnvError::ResetRequired)));
}

#[test]
fn test_same_seed_same_trajectory() {
    let id = "C172-TurnHeadingControlTask-Shaping.EXTRA-NoFG-v0";
    let run = |seed: u64| {
        let mut env = env_for(c172_builder(id).build().unwrap());
        let (obs, info) = env.reset(Some(seed)).unwrap();
        let mut rewards = Vec::new();
        for _ in 0..10 {
            rewards.push(env.step(&[0.1, -0.05, 0.0]).unwrap().reward);
        }
        (obs, info["target_track_deg"].clone(), rewards)
    };

    let first = run(42);
    let second = run(42);
    assert_eq!(first, second);

    let other = run(43);
    assert_ne!(first.1, other.1);
}

#[test]
fn test_reset_without_seed_continues_stream() {
    let id = "C172-TurnHeadingControlTask-Shaping.STANDARD-NoFG-v0";
    let mut env = env_for(c172_builder(id).seed(5).build().unwrap());
    let (_, first) = env.reset(None).unwrap();
    let (_, second) = env.reset(None).unwrap();
    assert_ne!(first["target_track_deg"], second["target_track_deg"]);
    assert_eq!(env.seed(), 5);
}

#[test]
fn test_observations_stay_in_space() {
    let id = "C172-SmoothHeadingTask-Shaping.EXTRA-NoFG-v0";
    let mut env = env_for(c172_builder(id).seed(3).build().unwrap());
    env.reset(None).unwrap();
    for i in 0..40 {
        let roll = if i % 2 == 0 { 1.0 } else { -1.0 };
        let step = env.step(&[roll, 0.2, -0.3]).unwrap();
        assert_step_finite(&step);
        assert_in_space(env.observation_space(), &step.observation);
        if step.terminated || step.truncated {
            break;
        }
    }
}

#[test]
fn test_trajectory_closes_on_navigation_point() {
    let id = "C172-TrajectoryTask-Shaping.EXTRA-NoFG-v0";
    let mut env = env_for(c172_builder(id).seed(4).build().unwrap());
    let (obs, info) = env.reset(None).unwrap();
    assert_eq!(obs.len(), 16);
    assert_in_space(env.observation_space(), &obs);
    assert_relative_eq!(obs[13], 2000.0f64.hypot(8000.0), epsilon = 1e-6);
    assert_eq!(info["target_track_deg"], 270.0);

    let elevator = obs[10];
    let mut distance = obs[13];
    for _ in 0..20 {
        let step = env.step(&[0.0, elevator, 0.0]).unwrap();
        assert_step_finite(&step);
        assert_in_space(env.observation_space(), &step.observation);
        assert!(!step.terminated);
        assert!(step.observation[13] < distance);
        assert!(step.info["reward_components"]
            .as_object()
            .unwrap()
            .contains_key("position_error"));
        distance = step.observation[13];
    }
}

#[test]
fn test_truncates_after_episode_length() {
    let config = c172_builder(C172_HEADING_EXTRA)
        .episode_time_s(1.0)
        .build()
        .unwrap();
    assert_eq!(config.max_episode_steps(), 5);
    let mut env = env_for(config);
    env.reset(Some(1)).unwrap();

    for _ in 0..4 {
        let step = env.step(&NEUTRAL).unwrap();
        assert!(!step.terminated && !step.truncated);
        assert_reward_in_range(&step, -1.0, 1.0);
    }
    let last = env.step(&NEUTRAL).unwrap();
    assert!(last.truncated);
    assert!(!last.terminated);
    assert_eq!(last.info["reason"], "time_limit");
    assert_eq!(last.info["steps_left"], 0);

    let after = env.step(&NEUTRAL).unwrap();
    assert!(after.truncated);
    assert_eq!(after.reward, 0.0);
    assert_eq!(after.info["already_done"], true);
    assert_eq!(after.observation, last.observation);
}

#[test]
fn test_invalid_actions_are_rejected_without_side_effects() {
    let mut env = c172_env();
    env.reset(Some(2)).unwrap();
    let bad = [
        vec![0.0, 1.5, 0.0],
        vec![-1.01, 0.0, 0.0],
        vec![0.0, 0.0, f64::NAN],
        vec![0.0, 0.0],
        vec![0.0, 0.0, 0.0, 0.0],
    ];
    for action in &bad {
        for _ in 0..2 {
            let err = env.step(action).unwrap_err();
            assert!(matches!(err, EnvError::InvalidAction(_)), "{:?}", action);
        }
    }
    let step = env.step(&NEUTRAL).unwrap();
    assert_eq!(step.info["steps_left"], 299);
}

#[test]
fn test_neutral_elevator_does_not_improve_reward() {
    let id = "C172-HeadingControlTask-Shaping.STANDARD-NoFG-v0";
    let mut env = env_for(c172_builder(id).build().unwrap());
    env.reset(Some(0)).unwrap();

    let mut rewards = Vec::new();
    for _ in 0..60 {
        let step = env.step(&NEUTRAL).unwrap();
        assert!(!step.terminated, "{:?}", step.info.get("reason"));
        assert_reward_in_range(&step, -1.0, 0.0);
        rewards.push(step.reward);
    }
    let mean = |values: &[f64]| values.iter().sum::<f64>() / values.len() as f64;
    let early = mean(&rewards[..5]);
    let late = mean(&rewards[rewards.len() - 10..]);
    assert!(
        late <= early + 1e-2,
        "reward trended upward: early {:.4}, late {:.4}",
        early,
        late
    );
}

#[test]
fn test_close_is_idempotent_and_reset_reopens() {
    let mut env = c172_env();
    env.reset(None).unwrap();
    env.close();
    env.close();
    assert!(env.is_closed());
    assert!(env.simulation().is_none());
    assert!(matches!(env.step(&NEUTRAL), Err(EnvError::ResetRequired)));

    let (obs, _) = env.reset(None).unwrap();
    assert!(!env.is_closed());
    assert_eq!(obs.len(), 11);
    assert!(env.step(&NEUTRAL).is_ok());
}

#[test]
fn test_yaml_config_overrides_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("env.yaml");
    std::fs::write(
        &path,
        format!(
            "env_id: {}\nagent_hz: 10\nepisode_time_s: 2.0\nasset_dir: {}\n",
            C172_HEADING_EXTRA,
            crate::common::bundled_assets().display()
        ),
    )
    .unwrap();
    let config = EnvConfigBuilder::from_yaml_file(&path)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(config.agent_hz, 10);
    assert_eq!(config.max_episode_steps(), 20);

    let mut env = env_for(config);
    let (_, info) = env.reset(Some(0)).unwrap();
    assert_eq!(info["steps_left"], 20);
    let step = env.step(&NEUTRAL).unwrap();
    assert_relative_eq!(step.info["sim_time_s"].as_f64().unwrap(), 0.1, epsilon = 1e-9);
}

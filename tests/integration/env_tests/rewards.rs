use approx::assert_relative_eq;
use flyer_gym::properties::catalog::{
    ALTITUDE_ERROR_FT, ELEVATOR_CMD, ROLL_RAD, SIDESLIP_DEG, TRACK_ERROR_DEG,
};
use flyer_gym::properties::PropertySnapshot;
use flyer_gym::rewards::{heading_reward, scaling, Reward, Shaping};
use flyer_gym::utils::{shortest_signed_angle_deg, RngManager};
use rand::Rng;

use crate::common::{c172_builder, env_for};

fn state(altitude_error: f64, track_error: f64, roll: f64, sideslip: f64) -> PropertySnapshot {
    PropertySnapshot::from_pairs([
        (ALTITUDE_ERROR_FT, altitude_error),
        (TRACK_ERROR_DEG, track_error),
        (ROLL_RAD, roll),
        (SIDESLIP_DEG, sideslip),
        (ELEVATOR_CMD, 0.0),
    ])
}

fn component(reward: &Reward, name: &str) -> f64 {
    reward
        .components
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
        .unwrap_or_else(|| panic!("missing component {}", name))
}

#[test]
fn test_base_reward_is_bounded() {
    let errors = [0.0, 1.0, 150.0, 5000.0, 1e9, f64::INFINITY];
    for shaping in Shaping::ALL {
        let function = heading_reward(shaping, true);
        for altitude in errors {
            for track in [0.0, 8.0, 179.0] {
                let reward = function
                    .evaluate(&state(0.0, 0.0, 0.0, 0.0), &state(altitude, track, 0.0, 0.0));
                assert!((-1.0..=0.0).contains(&reward.base), "{} {}", shaping, reward.base);
            }
        }
    }
}

#[test]
fn test_standard_has_no_shaping_terms() {
    let function = heading_reward(Shaping::Standard, false);
    assert!(function.shaping_terms().is_empty());
    let reward = function.evaluate(&state(300.0, 40.0, 0.5, 2.0), &state(0.0, 0.0, 0.0, 0.0));
    assert_eq!(reward.shaping, 0.0);
    assert_eq!(reward.total(), reward.base);
}

#[test]
fn test_progress_is_rewarded_under_extra() {
    let function = heading_reward(Shaping::Extra, false);
    let closer = function.evaluate(&state(300.0, 40.0, 0.3, 2.0), &state(100.0, 10.0, 0.1, 0.5));
    let further = function.evaluate(&state(100.0, 10.0, 0.1, 0.5), &state(300.0, 40.0, 0.3, 2.0));
    assert!(closer.shaping > 0.0);
    assert_relative_eq!(closer.shaping, -further.shaping, epsilon = 1e-12);
    assert!(closer.total() > further.total());
}

#[test]
fn test_sequential_gate_holds_secondary_terms() {
    let function = heading_reward(Shaping::ExtraSequential, false);
    let outside = scaling::SEQUENTIAL_TRACK_THRESHOLD_DEG + 20.0;

    let reward = function.evaluate(
        &state(300.0, outside + 10.0, 0.5, 3.0),
        &state(0.0, outside, 0.0, 0.0),
    );
    assert!(component(&reward, "track_progress") > 0.0);
    for gated in ["altitude_progress", "wings_level", "no_sideslip"] {
        assert_eq!(component(&reward, gated), 0.0, "{}", gated);
    }

    let inside = scaling::SEQUENTIAL_TRACK_THRESHOLD_DEG / 2.0;
    let reward = function.evaluate(
        &state(300.0, inside, 0.5, 3.0),
        &state(0.0, inside, 0.0, 0.0),
    );
    for gated in ["altitude_progress", "wings_level", "no_sideslip"] {
        assert!(component(&reward, gated) > 0.0, "{}", gated);
    }
}

#[test]
fn test_track_error_wraps_across_north() {
    assert_relative_eq!(shortest_signed_angle_deg(10.0, 350.0), 20.0);
    assert_relative_eq!(shortest_signed_angle_deg(350.0, 10.0), -20.0);
    assert_relative_eq!(shortest_signed_angle_deg(270.0, 270.0), 0.0);
    assert!(shortest_signed_angle_deg(0.0, 180.0).abs() <= 180.0);
}

#[test]
fn test_step_reports_reward_components() {
    let id = "C172-TurnHeadingControlTask-Shaping.EXTRA_SEQUENTIAL-NoFG-v0";
    let mut env = env_for(c172_builder(id).build().unwrap());
    let (_, info) = env.reset(Some(9)).unwrap();
    let step = env.step(&[0.0, 0.0, 0.0]).unwrap();

    let components = step.info["reward_components"].as_object().unwrap();
    let sum: f64 = ["track_progress", "altitude_progress", "wings_level", "no_sideslip"]
        .iter()
        .map(|name| components[*name].as_f64().unwrap())
        .sum();
    assert!(sum.is_finite());
    assert!(info["target_track_deg"].as_f64().unwrap() < 360.0);
}

#[test]
fn test_sequential_gate_holds_over_seeded_episodes() {
    let id = "C172-TurnHeadingControlTask-Shaping.EXTRA_SEQUENTIAL-NoFG-v0";
    let mut env = env_for(c172_builder(id).build().unwrap());
    let mut rng = RngManager::new(21).get_rng("actions");
    let mut seed = 0;
    env.reset(Some(seed)).unwrap();

    let mut gated_steps = 0;
    for _ in 0..2000 {
        let action: Vec<f64> = (0..3).map(|_| rng.gen_range(-0.3..0.3)).collect();
        let step = env.step(&action).unwrap();
        let components = step.info["reward_components"].as_object().unwrap();
        assert!(step.reward.is_finite());

        let track_error = step.observation[10];
        if track_error.abs() > scaling::SEQUENTIAL_TRACK_THRESHOLD_DEG && !components.is_empty() {
            gated_steps += 1;
            for gated in ["altitude_progress", "wings_level", "no_sideslip"] {
                assert_eq!(components[gated], 0.0, "{} at {:.2}°", gated, track_error);
            }
        }
        if step.terminated || step.truncated {
            seed += 1;
            env.reset(Some(seed)).unwrap();
        }
    }
    assert!(gated_steps > 0);
}

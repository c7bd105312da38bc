use flyer_gym::environment::Environment;
use flyer_gym::tasks::{terminal_penalty, TaskPhase};
use flyer_gym::utils::EnvError;
use pretty_assertions::assert_eq;
use std::sync::atomic::Ordering;

use crate::common::{
    c172_builder, diverging_engine_factory, empty_assets, switchable_ic_engine_factory,
    C172_HEADING_EXTRA,
};

#[test]
fn test_engine_failure_terminates_with_penalty() {
    let config = c172_builder(C172_HEADING_EXTRA).build().unwrap();
    // 12 engine steps per agent step at the default rates
    let mut env = Environment::with_engine(config, diverging_engine_factory(36)).unwrap();
    env.reset(Some(0)).unwrap();

    let mut last = None;
    for _ in 0..3 {
        let step = env.step(&[0.0, 0.0, 0.0]).unwrap();
        assert!(!step.terminated);
        last = Some(step.observation);
    }

    let failed = env.step(&[0.0, 0.0, 0.0]).unwrap();
    assert!(failed.terminated);
    assert!(!failed.truncated);
    assert_eq!(failed.info["reason"], "simulation_failure");
    assert!(failed.info["reason_detail"]
        .as_str()
        .unwrap()
        .contains("scripted failure"));
    assert_eq!(failed.reward, terminal_penalty(296));
    assert_eq!(Some(failed.observation.clone()), last);
    assert_eq!(env.task().phase(), TaskPhase::Terminated);

    let absorbed = env.step(&[0.0, 0.0, 0.0]).unwrap();
    assert!(absorbed.terminated);
    assert_eq!(absorbed.reward, 0.0);

    // a fresh episode recovers
    let (obs, _) = env.reset(None).unwrap();
    assert_eq!(obs.len(), 11);
    assert!(!env.step(&[0.0, 0.0, 0.0]).unwrap().terminated);
}

#[test]
fn test_failed_reset_leaves_no_live_episode() {
    let config = c172_builder(C172_HEADING_EXTRA).build().unwrap();
    let (factory, fail_ic) = switchable_ic_engine_factory();
    let mut env = Environment::with_engine(config, factory).unwrap();
    env.reset(Some(1)).unwrap();
    env.step(&[0.0, 0.0, 0.0]).unwrap();

    fail_ic.store(true, Ordering::SeqCst);
    let err = env.reset(Some(2)).err().unwrap();
    assert!(matches!(err, EnvError::Engine(_)), "{}", err);
    assert_eq!(env.task().phase(), TaskPhase::Uninitialized);
    assert!(env.task().episode().is_none());
    assert!(matches!(
        env.step(&[0.0, 0.0, 0.0]),
        Err(EnvError::ResetRequired)
    ));

    fail_ic.store(false, Ordering::SeqCst);
    let (_, info) = env.reset(Some(2)).unwrap();
    assert_eq!(info["steps_left"], 300);
    assert_eq!(env.task().phase(), TaskPhase::EpisodeActive);
    assert!(!env.step(&[0.0, 0.0, 0.0]).unwrap().terminated);
}

#[test]
fn test_missing_model_fails_construction() {
    let assets = empty_assets();
    let config = c172_builder(C172_HEADING_EXTRA)
        .asset_dir(assets.path())
        .build()
        .unwrap();
    let err = Environment::new(config).err().unwrap();
    assert!(matches!(err, EnvError::AircraftLoad(_)), "{}", err);
}

#[test]
fn test_malformed_model_fails_construction() {
    let assets = empty_assets();
    let aircraft = assets.path().join("aircraft");
    std::fs::create_dir_all(&aircraft).unwrap();
    std::fs::write(aircraft.join("c172p.yaml"), "name: [unterminated").unwrap();

    let config = c172_builder(C172_HEADING_EXTRA)
        .asset_dir(assets.path())
        .build()
        .unwrap();
    assert!(Environment::new(config).is_err());
}

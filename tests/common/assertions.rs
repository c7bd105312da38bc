use flyer_gym::environment::BoxSpace;
use flyer_gym::tasks::TaskStep;

/// Every observation value lies within the space bounds.
#[track_caller]
pub fn assert_in_space(space: &BoxSpace, observation: &[f64]) {
    assert_eq!(space.len(), observation.len(), "Observation length mismatch");
    if let Some(violation) = space.violation(observation) {
        panic!("Observation outside space: {}", violation);
    }
}

#[track_caller]
pub fn assert_step_finite(step: &TaskStep) {
    assert!(step.reward.is_finite(), "Reward is not finite: {}", step.reward);
    assert!(
        step.observation.iter().all(|v| v.is_finite()),
        "Observation contains non-finite values: {:?}",
        step.observation
    );
}

/// Non-terminal rewards are a base in [-1, 0] plus bounded shaping.
#[track_caller]
pub fn assert_reward_in_range(step: &TaskStep, low: f64, high: f64) {
    assert!(
        (low..=high).contains(&step.reward),
        "Reward {} outside [{}, {}]",
        step.reward,
        low,
        high
    );
}

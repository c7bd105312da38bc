use flyer_gym::aircraft::AircraftId;
use flyer_gym::environment::{all_env_ids, make_with, EnvConfigBuilder, EnvId};
use flyer_gym::render::RenderMode;
use flyer_gym::rewards::Shaping;
use flyer_gym::tasks::{TaskError, TaskKind};
use flyer_gym::utils::EnvError;
use pretty_assertions::assert_eq;

use crate::common::{bundled_assets, single_model_assets};

#[test]
fn test_registry_covers_every_supported_combination() {
    let ids = all_env_ids();
    assert_eq!(ids.len(), 280);
    assert!(ids.iter().all(|id| id.task.supports(id.shaping)));
    assert_eq!(
        ids.iter()
            .filter(|id| id.task == TaskKind::Trajectory)
            .count(),
        14 * 2 * 2
    );
    assert_eq!(
        ids[0].to_string(),
        "C172-HeadingControlTask-Shaping.STANDARD-FG-v0"
    );
    assert_eq!(
        ids[1].to_string(),
        "C172-HeadingControlTask-Shaping.STANDARD-NoFG-v0"
    );
}

#[test]
fn test_parse_components() {
    let id: EnvId = "F16-TurnHeadingControlTask-Shaping.EXTRA_SEQUENTIAL-FG-v0"
        .parse()
        .unwrap();
    assert_eq!(id.aircraft, AircraftId::F16);
    assert_eq!(id.task, TaskKind::TurnHeadingControl);
    assert_eq!(id.shaping, Shaping::ExtraSequential);
    assert_eq!(id.render_mode(), RenderMode::FlightGear);
}

#[test]
fn test_malformed_ids_are_rejected() {
    let bad = [
        "",
        "C172",
        "C999-HeadingControlTask-Shaping.STANDARD-NoFG-v0",
        "C172-HoverTask-Shaping.STANDARD-NoFG-v0",
        "C172-HeadingControlTask-Shaping.MAXIMAL-NoFG-v0",
        "C172-HeadingControlTask-Shaping.STANDARD-Maybe-v0",
        "C172-HeadingControlTask-Shaping.STANDARD-NoFG-v1",
        "C172-HeadingControlTask-Shaping.STANDARD-NoFG-v0-extra",
        "C172-SmoothHeadingTask-Shaping.EXTRA_SEQUENTIAL-NoFG-v0",
        "A320-TrajectoryTask-Shaping.EXTRA_SEQUENTIAL-FG-v0",
    ];
    for id in bad {
        assert!(
            matches!(id.parse::<EnvId>(), Err(EnvError::UnknownEnvironmentId { .. })),
            "{:?} parsed",
            id
        );
    }
}

#[test]
fn test_parse_agrees_with_registry() {
    for task in TaskKind::ALL {
        for shaping in Shaping::ALL {
            let id = EnvId::new(AircraftId::C172, task, shaping, false);
            let parsed = id.to_string().parse::<EnvId>();
            let listed = all_env_ids().contains(&id);
            assert_eq!(parsed.is_ok(), listed, "{}", id);
        }
    }
}

#[test]
fn test_sequential_shaping_needs_a_track_error() {
    for task in [TaskKind::SmoothHeading, TaskKind::Trajectory] {
        let err = EnvConfigBuilder::new()
            .task(task)
            .shaping(Shaping::ExtraSequential)
            .asset_dir(bundled_assets())
            .build()
            .unwrap_err();
        assert!(
            matches!(err, EnvError::Task(TaskError::UnsupportedShaping { .. })),
            "{}",
            task
        );
    }
}

#[test]
fn test_make_every_aircraft_from_bundled_assets() {
    for aircraft in AircraftId::ALL {
        let id = EnvId::new(aircraft, TaskKind::HeadingControl, Shaping::Standard, false);
        let mut env = make_with(
            &id.to_string(),
            EnvConfigBuilder::new().asset_dir(bundled_assets()).seed(0),
        )
        .unwrap();
        let (obs, info) = env.reset(None).unwrap();
        assert_eq!(obs.len(), 11, "{}", id);
        assert!(info["trim_cost"].as_f64().unwrap() < 1e-6, "{}", id);
        let step = env.step(&[0.0, 0.0, 0.0]).unwrap();
        assert!(!step.terminated, "{} terminated on first step", id);
    }
}

#[test]
fn test_single_model_asset_dir() {
    let assets = single_model_assets("pa28");
    let builder = EnvConfigBuilder::new().asset_dir(assets.path());
    assert!(make_with("PA28-HeadingControlTask-Shaping.EXTRA-NoFG-v0", builder.clone()).is_ok());
    assert!(matches!(
        make_with("C172-HeadingControlTask-Shaping.EXTRA-NoFG-v0", builder),
        Err(EnvError::AircraftLoad(_))
    ));
}

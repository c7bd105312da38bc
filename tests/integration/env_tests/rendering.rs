use std::net::UdpSocket;
use std::time::Duration;

use flyer_gym::render::{FlightGearConfig, RenderMode, FIGURE_HEIGHT, FIGURE_WIDTH};
use flyer_gym::utils::EnvError;
use pretty_assertions::assert_eq;

use crate::common::{c172_builder, c172_env, env_for, C172_HEADING_EXTRA};

#[test]
fn test_no_render_mode_rejects_every_request() {
    let mut env = c172_env();
    env.reset(Some(0)).unwrap();
    for mode in [RenderMode::Human, RenderMode::FlightGear] {
        let err = env.render(mode).unwrap_err();
        assert!(
            matches!(err, EnvError::UnsupportedRenderMode { .. }),
            "{}",
            err
        );
    }
}

#[test]
fn test_human_frames_follow_the_episode() {
    let config = c172_builder(C172_HEADING_EXTRA)
        .render_mode(RenderMode::Human)
        .build()
        .unwrap();
    let mut env = env_for(config);
    env.reset(Some(0)).unwrap();

    let first = env.render(RenderMode::Human).unwrap().unwrap();
    assert_eq!((first.width, first.height), (FIGURE_WIDTH, FIGURE_HEIGHT));
    assert_eq!(first.rgba.len(), (FIGURE_WIDTH * FIGURE_HEIGHT * 4) as usize);

    for _ in 0..5 {
        env.step(&[1.0, 0.0, 0.0]).unwrap();
    }
    let later = env.render(RenderMode::Human).unwrap().unwrap();
    assert_ne!(first.rgba, later.rgba);

    assert!(matches!(
        env.render(RenderMode::FlightGear),
        Err(EnvError::UnsupportedRenderMode { .. })
    ));
}

#[test]
fn test_flightgear_mode_streams_pose_packets() {
    let listener = UdpSocket::bind("127.0.0.1:0").unwrap();
    listener
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let flightgear = FlightGearConfig {
        address: listener.local_addr().unwrap().to_string(),
        time_factor: 0.0,
        ..FlightGearConfig::default()
    };
    let config = c172_builder("C172-HeadingControlTask-Shaping.EXTRA-FG-v0")
        .flightgear(flightgear)
        .build()
        .unwrap();
    let mut env = env_for(config);
    env.reset(Some(0)).unwrap();
    env.step(&[0.0, 0.0, 0.0]).unwrap();

    assert!(env.render(RenderMode::FlightGear).unwrap().is_none());
    let mut buf = [0u8; 256];
    let n = listener.recv(&mut buf).unwrap();
    let packet = std::str::from_utf8(&buf[..n]).unwrap();
    let fields: Vec<f64> = packet
        .trim_end()
        .split(',')
        .map(|v| v.parse().unwrap())
        .collect();
    assert_eq!(fields.len(), 6);
    assert!((fields[2] - 5000.0).abs() < 50.0, "altitude {}", fields[2]);
    assert!((fields[5] - 270.0).abs() < 5.0, "heading {}", fields[5]);

    // the figure is available alongside FlightGear
    assert!(env.render(RenderMode::Human).unwrap().is_some());
    env.close();
    env.close();
}

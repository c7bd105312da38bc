use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use flyer_gym::physics::linear_engine_factory;
use flyer_gym::server::serve;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::bundled_assets;

struct Client {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl Client {
    fn connect() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || serve(listener, linear_engine_factory));
        let stream = TcpStream::connect(addr).unwrap();
        Self {
            reader: BufReader::new(stream.try_clone().unwrap()),
            writer: stream,
        }
    }

    fn send(&mut self, request: &str) -> Value {
        self.writer.write_all(request.as_bytes()).unwrap();
        self.writer.write_all(b"\n").unwrap();
        let mut line = String::new();
        self.reader.read_line(&mut line).unwrap();
        serde_json::from_str(&line).unwrap()
    }
}

#[test]
fn test_episode_over_tcp() {
    let mut client = Client::connect();
    let init = json!({
        "Initialize": {
            "config": {
                "env_id": "C172-TurnHeadingControlTask-Shaping.EXTRA-NoFG-v0",
                "asset_dir": bundled_assets(),
                "agent_hz": 3,
                "episode_time_s": 1.0,
            }
        }
    });
    let ready = client.send(&init.to_string());
    assert_eq!(ready["status"], "ready");
    assert_eq!(ready["observation_space"]["names"][10], "track_error");
    assert_eq!(ready["action_space"]["low"], json!([-1.0, -1.0, -1.0]));

    let reset = client.send(r#"{"Reset":{"seed":4}}"#);
    assert_eq!(reset["info"]["seed"], 4);
    assert_eq!(reset["info"]["steps_left"], 3);

    let mut flags = Vec::new();
    for _ in 0..3 {
        let step = client.send(r#"{"Step":{"action":[0.0,0.0,0.0]}}"#);
        assert!(step["reward"].is_f64());
        flags.push((step["terminated"].clone(), step["truncated"].clone()));
    }
    assert_eq!(
        flags,
        vec![
            (json!(false), json!(false)),
            (json!(false), json!(false)),
            (json!(false), json!(true)),
        ]
    );

    let bad = client.send(r#"{"Step":{"action":[2.0,0.0,0.0]}}"#);
    assert!(bad["error"].as_str().unwrap().contains("aileron_cmd"));

    let unsupported = client.send(r#"{"Render":{"mode":"human"}}"#);
    assert!(unsupported["error"].as_str().unwrap().contains("not supported"));

    let unknown = client.send(r#"{"Fly":{}}"#);
    assert!(unknown["error"].is_string());

    let closed = client.send(r#""Close""#);
    assert_eq!(closed["status"], "closed");
}

#[test]
fn test_bad_initialize_keeps_connection_usable() {
    let mut client = Client::connect();
    let reply = client.send(r#"{"Initialize":{"config":{"env_id":"C172-Nope-v0"}}}"#);
    assert!(reply["error"].as_str().unwrap().contains("Unknown environment id"));

    let reply = client.send(r#"{"Initialize":{"config":{"agent_hz":7}}}"#);
    assert!(reply["error"].as_str().unwrap().contains("agent_hz"));

    let init = json!({
        "Initialize": { "config": { "asset_dir": bundled_assets() } }
    });
    assert_eq!(client.send(&init.to_string())["status"], "ready");
}

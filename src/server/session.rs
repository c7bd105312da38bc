use base64::Engine;
use serde::Serialize;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use tracing::{error, info, warn};

use super::structures::{Command, ErrorResponse, FrameResponse, ReadyResponse, Response};
use crate::environment::{EnvConfigBuilder, Environment};
use crate::physics::EngineFactory;
use crate::render::RenderMode;
use crate::utils::{EnvError, EnvResult};

/// Builds the engine for each environment the session creates.
pub type FactoryFn = fn() -> EngineFactory;

/// One client's view of the server: at most one environment.
pub struct Session {
    env: Option<Environment>,
    factory: FactoryFn,
    closed: bool,
}

impl Session {
    pub fn new(factory: FactoryFn) -> Self {
        Self {
            env: None,
            factory,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn environment(&self) -> Option<&Environment> {
        self.env.as_ref()
    }

    /// Parse and execute one request line; errors become `{"error": ...}`.
    pub fn handle_line(&mut self, line: &str) -> Value {
        let command = match serde_json::from_str::<Command>(line) {
            Ok(command) => command,
            Err(e) => {
                warn!("Failed to parse command: {}", e);
                return error_value(format!("Invalid command format: {}", e));
            }
        };
        match self.handle(command) {
            Ok(value) => value,
            Err(e) => {
                error!("Command failed: {}", e);
                error_value(e.to_string())
            }
        }
    }

    pub fn handle(&mut self, command: Command) -> EnvResult<Value> {
        match command {
            Command::Initialize { config } => {
                if self.env.is_some() {
                    return Err(EnvError::Config("Server already initialized".into()));
                }
                let config = EnvConfigBuilder::from_json(&config)?.build()?;
                let env = Environment::with_engine(config, (self.factory)())?;
                let ready = ReadyResponse {
                    status: "ready".to_string(),
                    env_id: env.config().env_id().to_string(),
                    observation_space: env.observation_space().clone(),
                    action_space: env.action_space().clone(),
                };
                info!("Initialized {}", ready.env_id);
                self.env = Some(env);
                to_value(&ready)
            }
            Command::Reset { seed } => {
                let env = self.env_mut()?;
                let (obs, info) = env.reset(seed)?;
                to_value(&Response {
                    obs,
                    reward: 0.0,
                    terminated: false,
                    truncated: false,
                    info: Value::Object(info),
                })
            }
            Command::Step { action } => {
                let step = self.env_mut()?.step(&action)?;
                to_value(&Response::from(step))
            }
            Command::Render { mode } => {
                let mode = mode.parse::<RenderMode>()?;
                let frame = self.env_mut()?.render(mode)?;
                let response = match frame {
                    Some(frame) => FrameResponse {
                        frame: Some(base64::prelude::BASE64_STANDARD.encode(&frame.rgba)),
                        width: frame.width,
                        height: frame.height,
                    },
                    None => FrameResponse {
                        frame: None,
                        width: 0,
                        height: 0,
                    },
                };
                to_value(&response)
            }
            Command::Close => {
                if let Some(env) = self.env.as_mut() {
                    env.close();
                }
                self.closed = true;
                Ok(json!({ "status": "closed" }))
            }
        }
    }

    fn env_mut(&mut self) -> EnvResult<&mut Environment> {
        self.env
            .as_mut()
            .ok_or_else(|| EnvError::Config("Server not initialized; send Initialize first".into()))
    }
}

fn to_value<T: Serialize>(value: &T) -> EnvResult<Value> {
    Ok(serde_json::to_value(value)?)
}

fn error_value(error: String) -> Value {
    serde_json::to_value(ErrorResponse { error }).unwrap_or(Value::Null)
}

/// Serve one client until it sends `Close` or disconnects.
pub fn serve_connection(stream: TcpStream, factory: FactoryFn) -> std::io::Result<()> {
    let peer = stream.peer_addr()?;
    info!("Client connected from {}", peer);
    let mut writer = stream.try_clone()?;
    let reader = BufReader::new(stream);
    let mut session = Session::new(factory);

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let reply = session.handle_line(&line);
        let mut text = serde_json::to_string(&reply)?;
        text.push('\n');
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        if session.is_closed() {
            break;
        }
    }
    info!("Client {} disconnected", peer);
    Ok(())
}

use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{RenderError, RenderState};
use crate::aircraft::AircraftSpec;

pub const DEFAULT_FLIGHTGEAR_ADDR: &str = "127.0.0.1:5550";

/// Settings for the FlightGear visualisation link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlightGearConfig {
    /// Where FlightGear listens for the generic protocol.
    pub address: String,
    /// Start `fgfs` alongside the environment.
    pub launch: bool,
    pub executable: String,
    /// Name of the generic-protocol file installed in `$FG_ROOT/Protocol`.
    pub protocol: String,
    /// Wall-clock seconds per simulated second when pacing; 0 disables pacing.
    pub time_factor: f64,
}

impl Default for FlightGearConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_FLIGHTGEAR_ADDR.to_string(),
            launch: false,
            executable: "fgfs".to_string(),
            protocol: "flyer-gym".to_string(),
            time_factor: 1.0,
        }
    }
}

impl FlightGearConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, RenderError> {
        self.address
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| RenderError::ConnectionLost(self.address.clone()))
    }
}

/// One-way UDP feed of the aircraft pose into FlightGear.
///
/// There is no reconnection: the first failed send marks the link dead and
/// every later send reports [`RenderError::ConnectionLost`].
pub struct FlightGearLink {
    socket: UdpSocket,
    target: SocketAddr,
    alive: bool,
    packets_sent: u64,
    process: Option<Child>,
}

impl FlightGearLink {
    pub fn connect(config: &FlightGearConfig) -> Result<Self, RenderError> {
        let target = config.socket_addr()?;
        let local: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        info!("FlightGear link sending to {}", target);
        Ok(Self {
            socket,
            target,
            alive: true,
            packets_sent: 0,
            process: None,
        })
    }

    /// Tie a launched FlightGear process to this link; it is killed on close.
    pub fn attach_process(&mut self, child: Child) {
        self.process = Some(child);
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub fn packets_sent(&self) -> u64 {
        self.packets_sent
    }

    pub fn send(&mut self, state: &RenderState) -> Result<(), RenderError> {
        if !self.alive {
            return Err(RenderError::ConnectionLost(self.target.to_string()));
        }
        let packet = format_packet(state);
        match self.socket.send_to(packet.as_bytes(), self.target) {
            Ok(_) => {
                self.packets_sent += 1;
                Ok(())
            }
            Err(e) => {
                warn!("FlightGear link to {} lost: {}", self.target, e);
                self.alive = false;
                Err(RenderError::ConnectionLost(self.target.to_string()))
            }
        }
    }

    /// Stop sending and kill any launched FlightGear process. Idempotent.
    pub fn close(&mut self) {
        self.alive = false;
        if let Some(mut child) = self.process.take() {
            if let Err(e) = child.kill() {
                debug!("FlightGear process already exited: {}", e);
            }
            let _ = child.wait();
        }
    }
}

impl Drop for FlightGearLink {
    fn drop(&mut self) {
        self.close();
    }
}

/// One generic-protocol line: `lat,lon,alt_ft,roll_deg,pitch_deg,heading_deg`.
pub fn format_packet(state: &RenderState) -> String {
    format!(
        "{:.7},{:.7},{:.2},{:.3},{:.3},{:.3}\n",
        state.latitude_deg,
        state.longitude_deg,
        state.altitude_ft,
        state.roll_deg,
        state.pitch_deg,
        state.heading_deg
    )
}

/// Command-line arguments for `fgfs` reading this link's feed.
pub fn flightgear_args(
    config: &FlightGearConfig,
    aircraft: &AircraftSpec,
    update_hz: u32,
) -> Result<Vec<String>, RenderError> {
    let target = config.socket_addr()?;
    Ok(vec![
        format!("--aircraft={}", aircraft.flightgear_model),
        "--fdm=null".to_string(),
        format!(
            "--generic=socket,in,{},{},{},udp,{}",
            update_hz,
            target.ip(),
            target.port(),
            config.protocol
        ),
        "--timeofday=noon".to_string(),
        "--disable-ai-traffic".to_string(),
        "--disable-real-weather-fetch".to_string(),
    ])
}

/// Start FlightGear for `aircraft`. The process inherits the caller's
/// environment, so `FG_ROOT` and friends pass through untouched.
pub fn launch_flightgear(
    config: &FlightGearConfig,
    aircraft: &AircraftSpec,
    update_hz: u32,
) -> Result<Child, RenderError> {
    let args = flightgear_args(config, aircraft, update_hz)?;
    info!("Launching {} {}", config.executable, args.join(" "));
    let child = Command::new(&config.executable)
        .args(&args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(child)
}

/// Sleeps so that simulated time does not run ahead of wall-clock time.
#[derive(Debug, Clone)]
pub struct RealTimePacer {
    wall_start: Instant,
    sim_start: f64,
    time_factor: f64,
}

impl RealTimePacer {
    pub fn new(time_factor: f64) -> Self {
        Self {
            wall_start: Instant::now(),
            sim_start: 0.0,
            time_factor,
        }
    }

    /// Re-anchor at the start of an episode.
    pub fn reset(&mut self, sim_time: f64) {
        self.wall_start = Instant::now();
        self.sim_start = sim_time;
    }

    /// Block until wall-clock time catches up with `sim_time`. Returns the time slept.
    pub fn pace(&self, sim_time: f64) -> Duration {
        if self.time_factor <= 0.0 {
            return Duration::ZERO;
        }
        let due =
            Duration::from_secs_f64(((sim_time - self.sim_start) * self.time_factor).max(0.0));
        let elapsed = self.wall_start.elapsed();
        match due.checked_sub(elapsed) {
            Some(wait) if !wait.is_zero() => {
                std::thread::sleep(wait);
                wait
            }
            _ => Duration::ZERO,
        }
    }
}

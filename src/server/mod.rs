//! Line-delimited JSON over TCP.
//!
//! Each client gets its own thread and its own environment; nothing is shared
//! between connections.

mod session;
mod structures;

pub use session::{serve_connection, FactoryFn, Session};
pub use structures::{Command, ErrorResponse, FrameResponse, ReadyResponse, Response};

use std::net::TcpListener;
use std::thread;
use tracing::{error, info};

/// Accept clients forever, one thread per connection.
pub fn serve(listener: TcpListener, factory: FactoryFn) -> std::io::Result<()> {
    info!("Listening on {}", listener.local_addr()?);
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                continue;
            }
        };
        thread::spawn(move || {
            if let Err(e) = serve_connection(stream, factory) {
                error!("Connection ended with error: {}", e);
            }
        });
    }
    Ok(())
}

use clap::Parser;
use std::net::TcpListener;
use tracing_subscriber::EnvFilter;

use flyer_gym::{physics::linear_engine_factory, server::serve};

/// Serve flyer-gym environments over TCP, one JSON command per line.
#[derive(Parser, Debug)]
#[command(name = "flyer_serve", version, about)]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind; 0 picks a free port.
    #[arg(long, default_value_t = 0)]
    port: u16,

    /// Log filter, used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_filter: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let listener = TcpListener::bind((args.host.as_str(), args.port))?;
    // Clients read the port from the first stdout line.
    println!("PORT={}", listener.local_addr()?.port());

    serve(listener, linear_engine_factory)?;
    Ok(())
}

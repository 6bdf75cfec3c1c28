//! Chat server for direct messages and rooms.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server -- --port 8080 --staff 1
//! ```

use std::net::{IpAddr, SocketAddr};

use clap::Parser;
use hiroba_server::{ServerConfig, domain::UserId, run_server};
use hiroba_shared::logger::setup_logger;

#[derive(Debug, Parser)]
#[command(version, about = "Hiroba chat server")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Frames a connection may have queued before it is dropped as too slow
    #[arg(long, default_value_t = hiroba_server::config::DEFAULT_DELIVERY_BUFFER)]
    delivery_buffer: usize,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// User ids granted the staff privilege (repeatable or comma separated)
    #[arg(long, value_delimiter = ',')]
    staff: Vec<i64>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let staff = match args
        .staff
        .iter()
        .map(|&id| UserId::new(id))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(staff) => staff,
        Err(e) => {
            tracing::error!("Invalid --staff value: {}", e);
            std::process::exit(2);
        }
    };

    let config = ServerConfig {
        addr: SocketAddr::new(args.host, args.port),
        delivery_buffer: args.delivery_buffer,
        staff,
        ..ServerConfig::default()
    };

    // Run the server
    if let Err(e) = run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

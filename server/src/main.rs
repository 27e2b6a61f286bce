mod broadcaster;
mod connection_tracker;
mod lobby_manager;
mod server_config;
mod web_server;
mod ws_handler;

use std::path::PathBuf;

use clap::Parser;
use lobby_common::{log, logger};

use server_config::{get_config_manager, CONFIG_FILE};
use web_server::{run_web_server, WebServerState};

#[derive(Parser)]
#[command(name = "lobby_server")]
struct Args {
    #[arg(long, default_value = CONFIG_FILE)]
    config: String,

    /// Overrides the configured port.
    #[arg(long)]
    port: Option<u16>,

    #[arg(long)]
    use_log_prefix: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Server".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    let config = get_config_manager(&args.config).get_config()?;
    let port = args.port.unwrap_or(config.port);
    let state = WebServerState::new(config.max_connections);

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        log!("Shutdown signal received");
    };

    run_web_server(state, PathBuf::from(&config.static_dir), port, shutdown_signal).await?;

    log!("Server shut down gracefully");
    Ok(())
}

//! CLI for Brolly
//!
//! Subcommands:
//! - `server`: run the hub, the liveness sweeper and the WebSocket server
//! - `listen`: print messages published to a key
//! - `broadcast`: publish one message to a key (a WebSocket frame on
//!   `/broadcast/<key>`, not an HTTP POST)

use brolly::client;
use brolly::config::{Settings, load_config, load_config_from};
use brolly::hub::{Hub, run_sweeper};
use brolly::transport::start_websocket_server;
use brolly::utils::logging;
use clap::Parser;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "brolly")]
enum Command {
    /// Start the hub and the WebSocket server
    Server {
        /// Configuration file to load instead of config/default
        #[arg(long)]
        config: Option<String>,
    },
    /// Print every message published to a key
    Listen {
        #[arg(long, default_value = "ws://127.0.0.1:14902")]
        url: String,
        #[arg(long, default_value = "test")]
        key: String,
        /// Exit after this many messages
        #[arg(long)]
        count: Option<usize>,
    },
    /// Publish one message to a key
    ///
    /// Sends a text frame over a WebSocket opened on /broadcast/<key>. The
    /// server does not accept HTTP POST publishes.
    Broadcast {
        #[arg(long, default_value = "ws://127.0.0.1:14902")]
        url: String,
        #[arg(long, default_value = "test")]
        key: String,
        message: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cmd = Command::parse();

    let result = match cmd {
        Command::Server { config } => {
            let settings = match config {
                Some(path) => load_config_from(&path),
                None => load_config(),
            };
            let settings = match settings {
                Ok(settings) => settings,
                Err(e) => {
                    // logging is configured from these settings, so it is not up yet
                    eprintln!("ERROR: failed to load configuration: {e}");
                    std::process::exit(1);
                }
            };
            logging::init(&settings.log.level);
            run_server(settings).await
        }
        Command::Listen { url, key, count } => {
            logging::init("info");
            client::listen(&url, &key, count, &mut std::io::stdout())
                .await
                .map_err(Into::into)
        }
        Command::Broadcast { url, key, message } => {
            logging::init("info");
            client::broadcast(&url, &key, &message)
                .await
                .map_err(Into::into)
        }
    };

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run_server(config: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let (hub, _hub_task) = Hub::spawn(&config.hub);

    tokio::spawn(run_sweeper(hub.clone(), config.hub.sweep_interval()));

    tokio::select! {
        result = start_websocket_server(&addr, hub) => {
            result?;
            error!("WebSocket server exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting.");
        }
    }

    Ok(())
}

//! Pyramid game server using the async actor model.
//!
//! Each hosted game runs as a `SessionActor` owned by the `SessionManager`;
//! players talk to it over a single WebSocket endpoint.

use std::net::SocketAddr;

use anyhow::{Context, Error};
use log::info;
use pico_args::Arguments;
use pyramid_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging, metrics,
};

const HELP: &str = "\
Run the Pyramid game server

USAGE:
  pyramid_server [OPTIONS]

OPTIONS:
  --bind          IP:PORT  Server socket bind address  [default: env SERVER_BIND, PORT, or 127.0.0.1:3000]
  --metrics-bind  IP:PORT  Prometheus exporter address  [default: env METRICS_BIND, disabled if unset]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  PORT                     Port to listen on at 0.0.0.0 when SERVER_BIND is unset
  MEMORIZE_SECS            Length of the memorize phase  [default: 30]
  MIN_PLAYERS              Players needed to start  [default: 3]
  MAX_PLAYERS              Seats per game  [default: 7]
  RUST_LOG                 Log filter (e.g., pyramid=debug)
  (See .env.example for all configuration options)
";

struct Args {
    bind: Option<SocketAddr>,
    metrics_bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs
            .opt_value_from_str("--bind")
            .context("Invalid --bind address")?,
        metrics_bind: pargs
            .opt_value_from_str("--metrics-bind")
            .context("Invalid --metrics-bind address")?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.metrics_bind)?;
    config.validate()?;

    if let Some(metrics_addr) = config.metrics_bind {
        metrics::init_metrics(metrics_addr)
            .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;
        info!("Prometheus metrics available at http://{}/metrics", metrics_addr);
    }

    info!(
        "Sessions: {}-{} players, memorize {}s",
        config.session.game.min_players,
        config.session.game.max_players,
        config.session.memorize_duration.as_secs()
    );

    let bind = config.bind;
    let state = AppState::new(config);
    let sessions = state.sessions.clone();
    let app = api::create_router(state);

    info!("Starting HTTP/WebSocket server on {}", bind);
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", bind, e))?;

    info!("Server is running at http://{}. Press Ctrl+C to stop.", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    sessions.close_all().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}

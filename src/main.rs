//! Demo host application with the actuator attached.
//!
//! ```text
//!   Client ──▶ /                        ──┐
//!          ──▶ /logfile_test_repeater   ──┼─▶ host routes
//!          ──▶ /httptrace_test_url      ──┘
//!          ──▶ /pyctuator/...           ───▶ actuator endpoints
//!
//!   tracing events ──▶ stdout
//!                  └─▶ LogBuffer ──▶ /pyctuator/logfile
//!
//!   heartbeat ──▶ POST registry_url (when registration.enabled)
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Query,
    http::{HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::get,
    Router,
};
use clap::Parser;
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use actuator::config::{load_config, ActuatorConfig};
use actuator::logfile::{LogBuffer, LogBufferWriter};
use actuator::{Actuator, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "actuator")]
#[command(about = "Demo server with actuator endpoints and registry heartbeat", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[derive(Deserialize)]
struct RepeatParams {
    repeated_string: String,
}

#[derive(Deserialize)]
struct SleepParams {
    sleep_sec: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ActuatorConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }

    // Subscriber first, so whatever the actuator logs while starting up is captured.
    let logs = Arc::new(LogBuffer::new(config.logfile.max_bytes));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.observability.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(LogBufferWriter::new(logs.clone())),
        )
        .init();

    let actuator = Actuator::with_log_buffer(config.clone(), logs)?;

    tracing::info!(
        app = %config.app.name,
        bind_address = %config.server.bind_address,
        management_url = %config.management_url(),
        registration = config.registration.enabled,
        "Configuration loaded"
    );

    let host = Router::new()
        .route("/", get(|| async { "Hello from the demo application" }))
        .route("/logfile_test_repeater", get(logfile_test_repeater))
        .route("/httptrace_test_url", get(httptrace_test_url));

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = HttpServer::with_actuator(config, actuator, host);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            return;
        }
        tracing::info!("Shutdown signal received");
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Logs the given string at error level and echoes it.
async fn logfile_test_repeater(Query(params): Query<RepeatParams>) -> String {
    tracing::error!("{}", params.repeated_string);
    params.repeated_string
}

/// Optionally sleeps, then echoes the `User-Data` request header as `resp-data`.
async fn httptrace_test_url(Query(params): Query<SleepParams>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(secs) = params.sleep_sec.filter(|s| *s > 0) {
        tracing::info!(sleep_sec = secs, "Sleeping before replying");
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    let user_data = headers
        .get("user-data")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("None");
    let echoed = HeaderValue::from_str(user_data).unwrap_or_else(|_| HeaderValue::from_static("None"));

    ([("resp-data", echoed)], "my content")
}

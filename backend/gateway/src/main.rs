mod config;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use rollmark_lms::CanvasClient;
use rollmark_pipeline::AttendancePipeline;
use rollmark_recognition::RecognitionClient;

use config::Config;
use routes::{build_router, AppState};

#[derive(Parser)]
#[command(name = "rollmark")]
#[command(about = "Rollmark — attendance sheet OCR to LMS grade submission")]
#[command(version)]
struct Cli {
    /// Port to bind the HTTP server to (overrides ROLLMARK_PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(port) = cli.port {
        config.port = port;
    }

    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    let lms = CanvasClient::new(&config.lms_base_url, config.remote_timeout())
        .context("Failed to build LMS client")?;
    let recognizer = RecognitionClient::new(&config.recognition_url, config.remote_timeout())
        .context("Failed to build recognition client")?;
    let pipeline = AttendancePipeline::new(Arc::new(lms), Arc::new(recognizer));

    let state = Arc::new(AppState { pipeline });
    // The capture client runs in a browser on another origin.
    let app = build_router(state).layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .context("Invalid bind address")?;
    info!(
        "[Gateway] Rollmark listening on {} (LMS: {}, recognition: {})",
        addr, config.lms_base_url, config.recognition_url
    );

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

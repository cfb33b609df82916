use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use ocr_api::api::{create_router, AppState};
use ocr_api::config::Config;
use ocr_api::extraction::ExtractionProvider;
use ocr_api::logging;
use ocr_api::speech::GoogleTtsClient;

#[derive(Parser)]
#[command(name = "ocr-api")]
#[command(about = "Extract text from images with Gemini and read it aloud")]
struct Args {
    /// Refuse to start when the configuration is invalid
    #[arg(long)]
    strict_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    // Logging settings come from the environment too, so read it once for the
    // subscriber and again afterwards so parse warnings are actually emitted.
    let bootstrap = Config::from_env();
    let _log_guard = logging::init(&bootstrap.logging, bootstrap.app.debug)?;
    let config = Config::from_env();

    config.startup_check(args.strict_config)?;

    tracing::info!("Initializing Gemini client: {}...", config.gemini.model);
    let extractor = ExtractionProvider::new(&config.gemini);
    if !extractor.is_available() {
        tracing::warn!("Gemini unavailable - OCR endpoints will return errors");
    }

    let synthesizer =
        GoogleTtsClient::new(&config.speech).context("building text-to-speech client")?;

    config.log_summary();

    let addr = config.bind_address();
    let state = AppState::new(config, Arc::new(extractor), Arc::new(synthesizer));
    let app = create_router(state);

    tracing::info!("OCR API starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/health", addr);
    tracing::info!("  API docs:     http://{}/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/openapi.json", addr);

    let cancel_token = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel_token.clone()));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(cancel_token.cancelled_owned())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests...");
    cancel_token.cancel();
}

mod backend;
mod catalog;
mod config;
mod protocol;
mod server;
mod tracing_init;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use backend::{Gemini, GeminiConfig, GenerativeBackend, Ollama, OllamaConfig, RetryPolicy};
use catalog::ModelCatalog;
use config::{normalize_addr, Config};
use server::handlers::AppState;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    tracing_init::init_tracing("plower_relay=info", config.log_format);

    // HTTP client shared by both upstreams
    let http_client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(10)
        .build()
        .expect("failed to build HTTP client");

    // Gemini backend and model catalog
    let (gemini, catalog) = match &config.gemini_api_key {
        Some(key) => {
            if std::env::var("GEMINI_API_KEY").is_err() {
                warn!("Gemini API key provided via command-line flag - use GEMINI_API_KEY env var in production");
            }
            let gemini = Arc::new(Gemini::new(
                GeminiConfig {
                    base_url: Some(config.gemini_base_url.clone()),
                    api_key: key.clone(),
                },
                http_client.clone(),
            ));
            info!(
                backend = gemini.name(),
                base_url = gemini.base_url(),
                "using backend"
            );
            let catalog = ModelCatalog::load(gemini.as_ref()).await;
            (Some(gemini as Arc<dyn GenerativeBackend>), catalog)
        }
        None => {
            warn!("GEMINI_API_KEY not set - /api/gemini_proxy will answer 503");
            (None, ModelCatalog::default())
        }
    };

    let ollama = Ollama::new(
        OllamaConfig {
            chat_url: Some(config.ollama_url.clone()),
        },
        http_client,
    );
    info!(url = ollama.chat_url(), "using local chat server");

    let retry = RetryPolicy {
        max_retries: config.gemini_max_retries,
        base_delay: Duration::from_secs(config.gemini_retry_base_secs),
    };

    let app = server::build_router(AppState {
        catalog: Arc::new(catalog),
        gemini,
        ollama,
        retry,
    });

    let addr = normalize_addr(&config.addr);
    let listener = TcpListener::bind(&addr).await.unwrap_or_else(|e| {
        error!(addr = addr, error = %e, "failed to bind");
        std::process::exit(1);
    });

    info!(addr = addr, "server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "server error");
            std::process::exit(1);
        });

    info!("server stopped");
}

/// Resolves on SIGINT or SIGTERM, whichever arrives first.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    };
    info!(signal = received, "shutting down");
}

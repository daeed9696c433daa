//! Notes lookup service.
//!
//! Serves tiered subject search over a catalogue of branch/semester notes.
//! It exposes a JSON HTTP API for chat front-ends and a Prometheus endpoint.
//!
//! # Environment Variables
//! - `NOTES_FILE_PATH` - Path to notes JSON (required unless MOCK_NOTES=true)
//! - `HTTP_PORT` - Search API port (default: 8080)
//! - `METRICS_PORT` - Prometheus metrics port (default: 9090)
//! - `MOCK_NOTES` - Serve built-in sample notes (default: false)
//! - `REWRITE_API_KEY` - Enables the query rewriter
//! - `RUST_LOG` - Log level (default: info)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use http_body_util::Empty;
use hyper::body::Bytes;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use notes_lookup::config::Config;
use notes_lookup::http::{router, AppState};
use notes_lookup::metrics;
use notes_lookup::notes::{MemoryStore, MockStore, RecordStore};
use notes_lookup::rewrite::{ChatCompletionRewriter, QueryRewriter, RewritingSearch};
use notes_lookup::search::SearchEngine;

/// Run healthcheck mode: GET /health on the local service.
async fn run_healthcheck() -> anyhow::Result<()> {
    let port = std::env::var("HTTP_PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(notes_lookup::config::DEFAULT_HTTP_PORT);
    let urls = [
        format!("http://127.0.0.1:{}/health", port),
        format!("http://[::1]:{}/health", port),
    ];

    for url in &urls {
        match tokio::time::timeout(Duration::from_secs(5), check_health(url)).await {
            Ok(Ok(())) => {
                eprintln!("healthcheck: service is healthy (via {})", url);
                std::process::exit(0);
            }
            Ok(Err(e)) => eprintln!("healthcheck: {} failed: {}", url, e),
            Err(_) => eprintln!("healthcheck: timeout connecting to {}", url),
        }
    }

    eprintln!("healthcheck: failed to connect via IPv4 or IPv6");
    std::process::exit(1);
}

async fn check_health(url: &str) -> anyhow::Result<()> {
    let client: hyper_util::client::legacy::Client<_, Empty<Bytes>> =
        hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
            .build_http();

    let response = client.get(url.parse()?).await?;
    if response.status().is_success() {
        Ok(())
    } else {
        anyhow::bail!("service returned {}", response.status())
    }
}

async fn resolve_bind_addr(bind_address: &str, port: u16) -> anyhow::Result<SocketAddr> {
    if bind_address == "auto" {
        let dual_stack: SocketAddr = ([0u16; 8], port).into();
        return Ok(match tokio::net::TcpListener::bind(dual_stack).await {
            Ok(_) => {
                info!("Auto-detected dual-stack support, using [::]");
                dual_stack
            }
            Err(_) => {
                info!("IPv6 not available, falling back to IPv4 (0.0.0.0)");
                ([0u8; 4], port).into()
            }
        });
    }

    let bind_str = if bind_address.contains(':') && !bind_address.starts_with('[') {
        format!("[{}]:{}", bind_address, port)
    } else {
        format!("{}:{}", bind_address, port)
    };
    bind_str
        .parse()
        .with_context(|| format!("invalid bind address {}", bind_str))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (use RUST_LOG env var to control log level)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let program_name = std::env::args()
        .next()
        .and_then(|path| {
            std::path::Path::new(&path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
        })
        .unwrap_or_default();

    if program_name == "healthcheck" {
        return run_healthcheck().await;
    }

    info!("Starting notes lookup service");

    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    info!(
        http_port = config.http_port,
        metrics_port = config.metrics_port,
        mock_notes = config.mock_notes,
        search_limit = config.search_limit,
        rewrite_enabled = config.rewrite.is_some(),
        "Configuration loaded"
    );

    let metrics_handle = metrics::init_metrics().context("failed to install metrics recorder")?;

    // No silent fallback: a broken notes file stops startup
    let store: Arc<dyn RecordStore> = if config.mock_notes {
        info!("MOCK_NOTES=true: Using sample notes");
        Arc::new(MockStore::new())
    } else {
        match MemoryStore::open(&config.notes_file_path).await {
            Ok(store) => {
                info!(count = store.count(), "Notes loaded successfully");
                Arc::new(store)
            }
            Err(e) => {
                error!(
                    error = %e,
                    notes_file = %config.notes_file_path,
                    "FATAL: Failed to load notes file. Set MOCK_NOTES=true for testing."
                );
                return Err(e.into());
            }
        }
    };

    let rewriter: Option<Arc<dyn QueryRewriter>> = match config.rewrite.clone() {
        Some(rewrite_config) => {
            info!(model = %rewrite_config.model, "Query rewriter enabled");
            let rewriter: Arc<dyn QueryRewriter> =
                Arc::new(ChatCompletionRewriter::new(rewrite_config)?);
            Some(rewriter)
        }
        None => None,
    };

    let search = Arc::new(RewritingSearch::new(SearchEngine::new(store), rewriter));
    let app = router(AppState::new(search, config.base_url.clone(), config.search_limit));

    let metrics_port = config.metrics_port;
    tokio::spawn(async move {
        if let Err(e) = metrics::start_metrics_server(metrics_port, metrics_handle).await {
            error!(error = %e, "Metrics server failed");
        }
    });

    let addr = resolve_bind_addr(&config.bind_address, config.http_port).await?;
    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! Core library for the restoration-company website: page shells and
//! the form-submission pipeline (validation, anti-abuse gating, and
//! notification delivery).

pub mod config;
pub mod delivery;
pub mod error;
pub mod forms;
pub mod limiter;
pub mod logging;
pub mod pages;
pub mod verify;

pub use config::AppConfig;
pub use delivery::{InflightGate, Mailer};
pub use error::{AppError, Result};
pub use limiter::RateLimiter;
pub use verify::BotVerifier;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tracing::info;

/// One independent inflight counter per form handler.
#[derive(Clone)]
pub struct FormGates {
    pub quote: InflightGate,
    pub assessment: InflightGate,
    pub callback: InflightGate,
}

impl FormGates {
    pub fn new(ceiling: usize) -> Self {
        Self {
            quote: InflightGate::new(ceiling),
            assessment: InflightGate::new(ceiling),
            callback: InflightGate::new(ceiling),
        }
    }
}

/// Shared per-process services, owned here and injected into handlers
/// rather than living as module globals.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub limiter: RateLimiter,
    pub gates: FormGates,
    pub mailer: Mailer,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let limiter = RateLimiter::new(config.rate_limit.clone());
        let gates = FormGates::new(config.delivery.max_inflight);
        let mailer = Mailer::new(&config.delivery);

        Self {
            config,
            limiter,
            gates,
            mailer,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

pub fn create_app(state: AppState) -> Router {
    // Headroom above the combined-attachment budget so the limit the
    // user sees is the validator's, not the transport's.
    let quote_body_limit = (state.config.uploads.max_total_bytes as usize) + 1024 * 1024;

    Router::new()
        .route("/", get(pages::home))
        .route("/contact", get(pages::contact))
        .route("/emergency", get(pages::emergency))
        .route("/health", get(pages::health))
        .route(
            "/forms/quote",
            post(forms::quote::handle_quote).layer(DefaultBodyLimit::max(quote_body_limit)),
        )
        .route("/forms/assessment", post(forms::assessment::handle_assessment))
        .route("/forms/callback", post(forms::callback::handle_callback))
        .layer(CorsLayer::permissive())
        .layer(logging::logging_layer())
        .with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}

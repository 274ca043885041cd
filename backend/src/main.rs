use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

mod config;
mod error;
mod handlers;
mod models;
mod sheets;
mod updater;

use crate::config::Config;
use crate::sheets::SheetsClient;
use crate::updater::SheetLayout;

pub const STOCK_ENDPOINT: &str = "/api/admin/atualizar-estoque";
/// Older storefront builds post here.
pub const LEGACY_STOCK_ENDPOINT: &str = "/admin/api/atualizar-estoque";

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// `None` when no update script is configured.
    pub sheets: Option<SheetsClient>,
    pub layout: Arc<SheetLayout>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let sheets = config
            .script_url
            .as_deref()
            .map(|url| SheetsClient::new(url, config.request_timeout))
            .transpose()?;
        let layout = SheetLayout {
            sheet_name: config.sheet_name.clone(),
            column: config.availability_column.clone(),
        };

        Ok(Self {
            config: Arc::new(config),
            sheets,
            layout: Arc::new(layout),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,stock_sync_service=debug")
            }),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    let first_cell = models::cell_range(
        &config.sheet_name,
        &config.availability_column,
        models::FIRST_DATA_ROW,
    );
    info!(
        spreadsheet_id = %config.default_spreadsheet_id,
        range = %first_cell,
        timeout_secs = config.request_timeout.as_secs(),
        "Stock sync service starting"
    );
    if !config.script_configured() {
        warn!("SHEETS_SCRIPT_URL is not set; batch updates will be refused");
    }

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config)?;
    let app = build_router(state);

    info!("Listening on http://{}", addr);
    info!("Health: GET http://{}{}", addr, STOCK_ENDPOINT);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn build_router(state: AppState) -> Router {
    Router::new()
        // ── Health ──────────────────────────────────────────────────────────
        .route("/health", get(handlers::health))

        // ── Stock availability ──────────────────────────────────────────────
        .route(
            STOCK_ENDPOINT,
            get(handlers::stock::stock_health).post(handlers::stock::update_stock),
        )
        .route(
            LEGACY_STOCK_ENDPOINT,
            get(handlers::stock::stock_health).post(handlers::stock::update_stock),
        )

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

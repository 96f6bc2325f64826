use anyhow::Result;
use axum::{routing::get, Json, Router};
use risk_radar::{loader, CityRecord, DEFAULT_DATA_PATH};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod routes;

/// Read-only city table shared by every request
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<Vec<CityRecord>>,
}

impl AppState {
    pub fn new(records: Vec<CityRecord>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }
}

/// Build the full router for the given state
pub fn app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/cities", get(routes::list_cities))
        .route("/weights", get(routes::get_weights))
        .route("/scores", get(routes::get_scores))
        .route("/dashboard", get(routes::get_dashboard))
        .route("/map", get(routes::get_map))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "risk_gateway=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_path =
        std::env::var("RISK_RADAR_DATA").unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());
    let records = loader::load_records(&data_path)?;
    tracing::info!("   Loaded {} cities from {}", records.len(), data_path);

    if std::env::var("RISK_RADAR_STRICT").is_ok_and(|v| v == "1") {
        risk_scorer::validate_records(&records)?;
        tracing::info!("   Strict validation passed");
    }

    let app = app(AppState::new(records));

    let port = std::env::var("RISK_GATEWAY_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "18700".to_string());
    let addr = format!("0.0.0.0:{}", port);

    tracing::info!("Risk Gateway starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "risk-gateway",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
    Json,
    http::Method,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use crate::{AppState, error::AppError};
use tower_http::cors::{CorsLayer, Any};

static CATALOG_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_\-]+$").expect("catalog name pattern is valid")
});

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/formas_pago", get(formas_pago))
        .route("/catalogos/:name", get(catalog))
        .layer(cors)
}

async fn formas_pago(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    load_catalog(&state, "c_FormaPago").await
}

async fn catalog(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, AppError> {
    let name = name.strip_suffix(".json").unwrap_or(&name);
    if !CATALOG_NAME.is_match(name) {
        return Err(AppError::InvalidInput(format!("Invalid catalog name: {}", name)));
    }
    load_catalog(&state, name).await
}

async fn load_catalog(state: &Arc<AppState>, name: &str) -> Result<Json<Value>, AppError> {
    let store = state.store.clone();
    let file_name = format!("{}.json", name);

    let data = tokio::task::spawn_blocking(move || store.latest_catalog(&file_name))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| {
            tracing::warn!("Error serving {}: {}", name, e);
            e
        })?;

    Ok(Json(data))
}

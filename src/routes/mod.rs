use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod catalogs;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .merge(catalogs::routes())
        .layer(TraceLayer::new_for_http())
}

async fn index() -> Json<Value> {
    Json(json!({
        "name": "sat-catalogos-api",
        "message": "Hola, parece que el api se esta ejecutando correctamente."
    }))
}

async fn health_check() -> &'static str {
    "OK"
}

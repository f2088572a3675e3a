//! Converts the SAT CFDI catalog workbook into one JSON document per sheet
//! and serves the latest release over HTTP.

use std::sync::Arc;

use axum::Router;

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;

use services::catalog_store::CatalogStore;

// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub store: CatalogStore,
}

impl AppState {
    pub fn new(config: Arc<config::Config>) -> Self {
        let store = CatalogStore::new(config.output_dir.clone());
        Self { config, store }
    }
}

/// The HTTP application with all routes mounted.
pub fn app(state: Arc<AppState>) -> Router {
    routes::routes().with_state(state)
}

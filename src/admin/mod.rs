//! Administrative API.
//!
//! Served on its own listener and guarded by a bearer token. Every
//! mutating route returns a structured outcome (success body, or an
//! error code + message) for the caller to render.

pub mod auth;
pub mod error;
pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::import::CsvImporter;
use crate::redirects::RedirectStore;

pub use error::AdminError;

/// Shared state for admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub store: Arc<dyn RedirectStore>,
    pub importer: CsvImporter,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(store: Arc<dyn RedirectStore>, api_key: &str) -> Self {
        Self {
            importer: CsvImporter::new(store.clone()),
            store,
            api_key: Arc::from(api_key),
        }
    }
}

pub fn setup_admin_router(state: AdminState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/redirects", get(list_redirects).post(create_redirect))
        .route(
            "/admin/redirects/{id}",
            get(get_redirect).put(update_redirect).delete(delete_redirect),
        )
        .route("/admin/redirects/{id}/toggle", post(toggle_redirect))
        .route("/admin/import", post(import_csv))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

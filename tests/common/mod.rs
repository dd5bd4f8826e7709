//! Shared helpers for integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::Response;
use serde_json::Value;
use std::sync::Arc;

use redirect_gateway::redirects::{RedirectStore, SqliteRedirectStore};

pub const API_KEY: &str = "test-admin-key";

/// Fresh, migrated in-memory store.
pub async fn store() -> Arc<SqliteRedirectStore> {
    Arc::new(
        SqliteRedirectStore::in_memory()
            .await
            .expect("in-memory store"),
    )
}

pub fn dyn_store(store: &Arc<SqliteRedirectStore>) -> Arc<dyn RedirectStore> {
    store.clone()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}

/// Build a `multipart/form-data` body with a CSV file and text fields.
pub fn multipart_body(boundary: &str, file_name: &str, csv: &str, fields: &[(&str, &str)]) -> String {
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: text/csv\r\n\r\n{csv}\r\n"
    );
    for (name, value) in fields {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));
    body
}

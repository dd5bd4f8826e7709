//! Admin API error rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::redirects::StoreError;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Missing or unreadable upload.
    #[error("file upload failed")]
    Upload,

    /// The upload could not be written to temporary storage.
    #[error("could not spool upload: {0}")]
    Spool(#[from] std::io::Error),

    /// Upload is not a `.csv` file.
    #[error("only .csv files can be imported")]
    FileType,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: &'static str,
}

impl AdminError {
    /// Stable code, HTTP status and user-facing message.
    fn parts(&self) -> (&'static str, StatusCode, &'static str) {
        match self {
            Self::Store(StoreError::EmptyPath) => (
                "empty",
                StatusCode::UNPROCESSABLE_ENTITY,
                "Both old path and new path are required.",
            ),
            Self::Store(StoreError::SamePath) => (
                "same",
                StatusCode::UNPROCESSABLE_ENTITY,
                "Old path and new path cannot be the same.",
            ),
            Self::Store(StoreError::DuplicatePath(_)) => (
                "duplicate",
                StatusCode::CONFLICT,
                "A redirect for this old path already exists.",
            ),
            Self::Store(StoreError::NotFound(_)) => {
                ("not_found", StatusCode::NOT_FOUND, "Redirect not found.")
            }
            Self::Store(StoreError::Storage(_) | StoreError::Migration(_)) => (
                "database",
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error occurred.",
            ),
            Self::Spool(_) => (
                "upload",
                StatusCode::INTERNAL_SERVER_ERROR,
                "File upload failed.",
            ),
            Self::Upload => ("upload", StatusCode::BAD_REQUEST, "File upload failed."),
            Self::FileType => (
                "filetype",
                StatusCode::BAD_REQUEST,
                "Only .csv files can be imported.",
            ),
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (error, status, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(error = %self, "Admin operation failed");
        }
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

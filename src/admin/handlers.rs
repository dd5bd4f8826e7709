use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

use crate::admin::error::AdminError;
use crate::admin::AdminState;
use crate::import::{ImportOptions, ImportReport};
use crate::observability::metrics;
use crate::redirects::{RedirectRule, RuleId, RuleStats, StoreError};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub redirects: RuleStats,
}

/// Body of add and update requests. Missing fields count as blank paths.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RulePaths {
    pub old_path: String,
    pub new_path: String,
}

#[derive(Serialize)]
pub struct RuleCreated {
    pub id: RuleId,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct RuleUpdated {
    pub rule: RedirectRule,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct RuleToggled {
    pub id: RuleId,
    pub active: bool,
    pub message: &'static str,
}

/// Count a mutation outcome before handing the result on.
fn track<T>(op: &'static str, result: Result<T, StoreError>) -> Result<T, StoreError> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) if e.is_duplicate() => "duplicate",
        Err(_) => "error",
    };
    metrics::record_mutation(op, outcome);
    result
}

pub async fn get_status(State(state): State<AdminState>) -> Result<Json<SystemStatus>, AdminError> {
    let redirects = state.store.stats().await?;
    Ok(Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        redirects,
    }))
}

pub async fn list_redirects(
    State(state): State<AdminState>,
) -> Result<Json<Vec<RedirectRule>>, AdminError> {
    Ok(Json(state.store.list().await?))
}

pub async fn get_redirect(
    State(state): State<AdminState>,
    Path(id): Path<i64>,
) -> Result<Json<RedirectRule>, AdminError> {
    Ok(Json(state.store.get(RuleId(id)).await?))
}

pub async fn create_redirect(
    State(state): State<AdminState>,
    Json(paths): Json<RulePaths>,
) -> Result<(StatusCode, Json<RuleCreated>), AdminError> {
    let id = track("create", state.store.create(&paths.old_path, &paths.new_path).await)?;
    tracing::info!(%id, old_path = %paths.old_path, new_path = %paths.new_path, "Redirect added");
    Ok((
        StatusCode::CREATED,
        Json(RuleCreated {
            id,
            message: "Redirect added successfully!",
        }),
    ))
}

pub async fn update_redirect(
    State(state): State<AdminState>,
    Path(id): Path<i64>,
    Json(paths): Json<RulePaths>,
) -> Result<Json<RuleUpdated>, AdminError> {
    let id = RuleId(id);
    track(
        "update",
        state.store.update(id, &paths.old_path, &paths.new_path).await,
    )?;
    tracing::info!(%id, old_path = %paths.old_path, new_path = %paths.new_path, "Redirect updated");
    let rule = state.store.get(id).await?;
    Ok(Json(RuleUpdated {
        rule,
        message: "Redirect updated successfully.",
    }))
}

pub async fn toggle_redirect(
    State(state): State<AdminState>,
    Path(id): Path<i64>,
) -> Result<Json<RuleToggled>, AdminError> {
    let id = RuleId(id);
    let active = track("toggle", state.store.toggle_active(id).await)?;
    tracing::info!(%id, active, "Redirect toggled");
    Ok(Json(RuleToggled {
        id,
        active,
        message: "Redirect status updated!",
    }))
}

pub async fn delete_redirect(
    State(state): State<AdminState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AdminError> {
    let id = RuleId(id);
    track("delete", state.store.delete(id).await)?;
    tracing::info!(%id, "Redirect deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Checkbox semantics: present means on, unless explicitly switched off.
fn flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "off" | "no"
    )
}

fn has_csv_extension(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Copy an upload into an anonymous temp file, one chunk at a time.
async fn spool(mut field: Field<'_>) -> Result<(std::fs::File, u64), AdminError> {
    let file = tokio::task::spawn_blocking(tempfile::tempfile)
        .await
        .map_err(|e| AdminError::Spool(std::io::Error::other(e)))??;
    let mut file = tokio::fs::File::from_std(file);
    let mut bytes = 0u64;
    while let Some(chunk) = field.chunk().await.map_err(|_| AdminError::Upload)? {
        file.write_all(&chunk).await?;
        bytes += chunk.len() as u64;
    }
    file.flush().await?;
    file.rewind().await?;
    Ok((file.into_std().await, bytes))
}

/// Multipart upload: `file`, plus optional `clear_existing` and `skip_duplicates`.
///
/// The file is spooled to disk rather than held in memory, so the form
/// fields may arrive in any order.
pub async fn import_csv(
    State(state): State<AdminState>,
    mut multipart: Multipart,
) -> Result<Json<ImportReport>, AdminError> {
    let mut upload = None;
    let mut options = ImportOptions::default();

    while let Some(field) = multipart.next_field().await.map_err(|_| AdminError::Upload)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                if let Some(file_name) = field.file_name() {
                    if !has_csv_extension(file_name) {
                        return Err(AdminError::FileType);
                    }
                }
                upload = Some(spool(field).await?);
            }
            Some("clear_existing") => {
                options.clear_existing = flag(&field.text().await.map_err(|_| AdminError::Upload)?);
            }
            Some("skip_duplicates") => {
                options.skip_duplicates = flag(&field.text().await.map_err(|_| AdminError::Upload)?);
            }
            _ => {}
        }
    }

    let (file, bytes) = upload.ok_or(AdminError::Upload)?;
    tracing::info!(
        bytes,
        clear_existing = options.clear_existing,
        skip_duplicates = options.skip_duplicates,
        "CSV import requested"
    );
    let report = state.importer.import(file, options).await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_values() {
        assert!(flag("1"));
        assert!(flag("on"));
        assert!(flag(""));
        assert!(!flag("0"));
        assert!(!flag("False"));
        assert!(!flag(" off "));
    }

    #[test]
    fn test_csv_extension() {
        assert!(has_csv_extension("redirects.csv"));
        assert!(has_csv_extension("EXPORT.CSV"));
        assert!(!has_csv_extension("redirects.txt"));
        assert!(!has_csv_extension("csv"));
    }
}

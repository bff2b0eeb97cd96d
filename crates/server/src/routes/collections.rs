//! Direct client writes.
//!
//! Clients may only create documents, and only in collections listed in
//! [`CLIENT_WRITABLE`]. Each such collection is bound to the schema its
//! documents must satisfy, so a direct write stores exactly what the
//! matching submission would.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use ltdk_shared::{pipeline, CreatedResponse, NewDocument, ProblemDetails, SubmissionKind, DOCUMENTS};
use serde_json::Value;

use crate::error::Problem;
use crate::state::AppState;

pub const CLIENT_WRITABLE: &[(&str, SubmissionKind)] = &[(DOCUMENTS, SubmissionKind::Document)];

/// Create a document with a backend-assigned id
pub async fn create_document(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Json(document): Json<NewDocument>,
) -> Result<(StatusCode, Json<CreatedResponse>), Problem> {
    let kind = CLIENT_WRITABLE
        .iter()
        .find(|(name, _)| *name == collection)
        .map(|(_, kind)| *kind)
        .ok_or_else(|| {
            tracing::warn!(%collection, "client write refused");
            Problem(ProblemDetails::forbidden(format!(
                "Clients may not write to '{collection}'"
            )))
        })?;

    let id = pipeline::submit_checked(state.store(), kind, &Value::Object(document.fields)).await?;
    tracing::info!(%collection, %id, "client document created");

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

//! Form submission actions.
//!
//! Every action answers `200` with a [`SubmitResponse`]; rejected input and
//! backend failures are reported in the body, like a form action would.

use axum::{
    extract::{Path, State},
    Json,
};
use ltdk_shared::{pipeline, ProblemDetails, SubmissionKind, SubmitResponse};
use serde_json::Value;

use crate::error::Problem;
use crate::state::AppState;

/// Validate and store one submission
pub async fn submit_action(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(raw): Json<Value>,
) -> Result<Json<SubmitResponse>, Problem> {
    let kind = SubmissionKind::from_slug(&kind)
        .ok_or_else(|| Problem(ProblemDetails::not_found(format!("Unknown action '{kind}'"))))?;

    Ok(Json(pipeline::submit(&state.connection, kind, &raw).await))
}

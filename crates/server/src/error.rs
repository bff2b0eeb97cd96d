//! RFC7807 error responses.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use ltdk_shared::{BackendError, ProblemDetails, SubmitError, ValidationError};

/// A `ProblemDetails` body served as `application/problem+json`.
#[derive(Debug)]
pub struct Problem(pub ProblemDetails);

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            Json(self.0),
        )
            .into_response()
    }
}

impl From<BackendError> for Problem {
    fn from(err: BackendError) -> Self {
        let problem = match &err {
            BackendError::PermissionDenied(detail) => ProblemDetails::forbidden(detail.clone()),
            BackendError::NotFound(detail) => ProblemDetails::not_found(detail.clone()),
            BackendError::Unavailable(detail) => ProblemDetails::unavailable(detail.clone()),
            BackendError::Internal(detail) => {
                tracing::error!("backend failure: {}", detail);
                ProblemDetails::internal_error(ltdk_shared::FAILED)
            }
        };
        Problem(problem)
    }
}

impl From<ValidationError> for Problem {
    fn from(err: ValidationError) -> Self {
        let detail = err
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        let mut problem = ProblemDetails::unprocessable(ltdk_shared::INVALID_DATA);
        if !detail.is_empty() {
            problem.detail = Some(format!("{} {}", ltdk_shared::INVALID_DATA, detail));
        }
        Problem(problem)
    }
}

impl From<SubmitError> for Problem {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Invalid(e) => e.into(),
            SubmitError::Backend(e) => e.into(),
        }
    }
}

//! Error taxonomy shared by the backend and the client, plus RFC7807 Problem Details.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// RFC7807 Problem Details (application/problem+json)
///
/// Canonical error envelope for `/api/*` endpoints so the client can surface a
/// meaningful message instead of failing to decode a success response type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemDetails {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub type_url: String,
    /// A short, human-readable summary of the problem type.
    pub title: String,
    /// HTTP status code.
    pub status: u16,
    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// A URI reference that identifies the specific occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ProblemDetails {
    fn new(slug: &str, title: &str, status: u16, detail: impl Into<String>) -> Self {
        Self {
            type_url: format!("https://ltdk-maradi.ne/problems/{slug}"),
            title: title.to_string(),
            status,
            detail: Some(detail.into()),
            instance: None,
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new("bad-request", "Bad Request", 400, detail)
    }

    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::new("forbidden", "Forbidden", 403, detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new("not-found", "Not Found", 404, detail)
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new("invalid-data", "Unprocessable Entity", 422, detail)
    }

    pub fn internal_error(detail: impl Into<String>) -> Self {
        Self::new("internal-error", "Internal Server Error", 500, detail)
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::new("unavailable", "Service Unavailable", 503, detail)
    }
}

/// Attempt to parse an RFC7807 (or RFC7807-ish) JSON body into a user-facing message.
/// Prefers `detail`, falls back to `title`.
pub fn try_problem_detail(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ProblemDetails>(body).ok()?;
    if let Some(detail) = parsed.detail {
        if !detail.trim().is_empty() {
            return Some(detail);
        }
    }
    if !parsed.title.trim().is_empty() {
        return Some(parsed.title);
    }
    None
}

/// HTTP API error for client-side use
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

impl ApiError {
    /// Message suitable for display, using the problem `detail` when the body carries one.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http { body, .. } => try_problem_detail(body).unwrap_or_else(|| self.to_string()),
            _ => self.to_string(),
        }
    }
}

/// Fatal: the backend connection cannot be initialized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing API key. The configuration provided to initialize was missing an apiKey.")]
    MissingApiKey,
    #[error("Missing required configuration field `{0}`")]
    MissingField(&'static str),
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Offending field; empty when the payload itself has the wrong shape.
    pub path: String,
    pub message: String,
}

/// Every violation found while validating one payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid data ({} violation(s))", .errors.len())]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn has_error_for(&self, path: &str) -> bool {
        self.errors.iter().any(|e| e.path == path)
    }
}

/// A write or read the backend refused or could not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("backend failure: {0}")]
    Internal(String),
}

/// Failure of a live listener. Stored in the snapshot state, never thrown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "code", content = "message", rename_all = "kebab-case")]
pub enum SubscriptionError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("invalid query: {0}")]
    InvalidArgument(String),
    #[error("listener failed: {0}")]
    Internal(String),
}

/// The connection handle was requested where no provider supplies one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("the backend connection is not provided in this part of the tree")]
    NotProvided,
}

/// Why a submission did not produce a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

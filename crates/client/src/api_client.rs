//! HTTP API client for the LTDK backend.

use ltdk_shared::{ApiError, BackendError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Base URL used when nothing else is configured on desktop.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// HTTP client bound to one backend origin.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Client for the origin the app was served from (web) or `LTDK_API_URL` (desktop).
    pub fn for_current_origin() -> Self {
        Self::new(current_origin())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Websocket endpoint for live queries on the same origin.
    pub fn ws_url(&self) -> String {
        // "https://" becomes "wss://", "http://" becomes "ws://"
        format!("{}/api/ws", self.base_url.replacen("http", "ws", 1))
    }

    pub async fn get_json<TRes: DeserializeOwned>(&self, path: &str) -> Result<TRes, ApiError> {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::read_json(resp).await
    }

    pub async fn post_json<TReq: Serialize, TRes: DeserializeOwned>(
        &self,
        path: &str,
        body: &TReq,
    ) -> Result<TRes, ApiError> {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::read_json(resp).await
    }

    async fn read_json<TRes: DeserializeOwned>(resp: reqwest::Response) -> Result<TRes, ApiError> {
        let status = resp.status().as_u16();
        let is_success = resp.status().is_success();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("failed to read body: {e}")))?;

        if !is_success {
            return Err(ApiError::Http { status, body: text });
        }

        if text.is_empty() {
            serde_json::from_str("null").map_err(|e| ApiError::Deserialize(e.to_string()))
        } else {
            serde_json::from_str(&text).map_err(|e| ApiError::Deserialize(e.to_string()))
        }
    }
}

/// Translate an HTTP failure into the store's error taxonomy.
pub fn backend_error(err: ApiError) -> BackendError {
    let message = err.user_message();
    match err {
        ApiError::Network(_) => BackendError::Unavailable(message),
        ApiError::Http { status: 403, .. } | ApiError::Http { status: 401, .. } => BackendError::PermissionDenied(message),
        ApiError::Http { status: 404, .. } => BackendError::NotFound(message),
        ApiError::Http { status, .. } if status >= 500 => BackendError::Unavailable(message),
        _ => BackendError::Internal(message),
    }
}

#[cfg(target_arch = "wasm32")]
fn current_origin() -> String {
    web_sys::window()
        .and_then(|window| window.location().origin().ok())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

#[cfg(not(target_arch = "wasm32"))]
fn current_origin() -> String {
    std::env::var("LTDK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltdk_shared::ProblemDetails;

    #[test]
    fn urls_join_without_double_slashes() {
        let api = ApiClient::new("https://ltdk-maradi.ne/");
        assert_eq!(api.url("/api/actions/membership"), "https://ltdk-maradi.ne/api/actions/membership");
        assert_eq!(api.url("health"), "https://ltdk-maradi.ne/health");
        assert_eq!(api.ws_url(), "wss://ltdk-maradi.ne/api/ws");
        assert_eq!(ApiClient::new("http://localhost:8080").ws_url(), "ws://localhost:8080/api/ws");
    }

    #[test]
    fn http_failures_map_to_backend_errors() {
        let forbidden = ApiError::Http {
            status: 403,
            body: serde_json::to_string(&ProblemDetails::forbidden("Clients may not write to 'users'")).unwrap(),
        };
        assert_eq!(
            backend_error(forbidden),
            BackendError::PermissionDenied("Clients may not write to 'users'".into())
        );
        assert!(matches!(
            backend_error(ApiError::Network("connection refused".into())),
            BackendError::Unavailable(_)
        ));
        assert!(matches!(
            backend_error(ApiError::Http { status: 503, body: String::new() }),
            BackendError::Unavailable(_)
        ));
        assert!(matches!(
            backend_error(ApiError::Http { status: 422, body: String::new() }),
            BackendError::Internal(_)
        ));
    }
}

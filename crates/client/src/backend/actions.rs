//! Form submissions handled by the server.

use ltdk_shared::{SubmissionKind, SubmitResponse, FAILED};
use serde_json::Value;

use crate::api_client::ApiClient;

/// Send `payload` to the server action for `kind`.
///
/// The server validates and stores it. Transport failures come back as the
/// same generic rejection a storage failure would.
pub async fn submit_action(api: &ApiClient, kind: SubmissionKind, payload: &Value) -> SubmitResponse {
    let path = format!("/api/actions/{}", kind.slug());
    match api.post_json::<_, SubmitResponse>(&path, payload).await {
        Ok(response) => {
            if !response.success {
                crate::log_warn!("{} submission rejected: {}", kind.slug(), response.message);
            }
            response
        }
        Err(e) => {
            crate::log_error!("{} submission failed: {}", kind.slug(), e);
            SubmitResponse::rejected(FAILED)
        }
    }
}

//! Validate-then-append submission flow.

use serde_json::Value;

use crate::connection::Connection;
use crate::error::SubmitError;
use crate::store::DocumentStore;
use crate::submissions::{SubmissionKind, SubmitResponse, FAILED, INVALID_DATA};

/// Validate `raw` and append it to the kind's collection.
///
/// Nothing is written unless validation passes. Returns the new record's id.
pub async fn submit_checked(
    store: &dyn DocumentStore,
    kind: SubmissionKind,
    raw: &Value,
) -> Result<String, SubmitError> {
    let validated = kind.schema().validate(raw)?;
    let id = store.add(kind.collection(), kind.into_write(validated)).await?;
    Ok(id)
}

/// Run a submission through `connection` and report the outcome as a form response.
pub async fn submit(connection: &Connection, kind: SubmissionKind, raw: &Value) -> SubmitResponse {
    match submit_checked(connection.store(), kind, raw).await {
        Ok(id) => {
            tracing::info!(kind = kind.slug(), collection = kind.collection(), %id, "submission stored");
            SubmitResponse::accepted()
        }
        Err(SubmitError::Invalid(err)) => {
            tracing::debug!(kind = kind.slug(), fields = ?err.errors, "submission rejected");
            SubmitResponse::rejected(INVALID_DATA)
        }
        Err(SubmitError::Backend(err)) => {
            tracing::error!(kind = kind.slug(), error = %err, "submission failed");
            SubmitResponse::rejected(FAILED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::connection::AppRegistry;
    use crate::memory::MemoryStore;
    use crate::models::{DocumentRef, Timestamp};
    use crate::submissions::{CREATED_AT, MEMBERSHIP_APPLICATIONS, SUBMITTED};
    use serde_json::json;
    use std::sync::Arc;

    fn connect(store: &MemoryStore) -> Connection {
        AppRegistry::with_store(Arc::new(store.clone()))
            .initialize(&BackendConfig::local("ltdk"))
            .unwrap()
    }

    fn membership() -> Value {
        json!({
            "name": "Aïchatou",
            "promotion": "2005",
            "email": "a@x.ne",
            "phone": "+227 96 00 00 00"
        })
    }

    #[tokio::test]
    async fn valid_membership_is_stored_once_with_backend_timestamp() {
        let store = MemoryStore::new();
        let conn = connect(&store);

        let invoked_at = Timestamp::now();
        let response = submit(&conn, SubmissionKind::Membership, &membership()).await;
        assert_eq!(response, SubmitResponse::accepted());
        assert_eq!(response.message, SUBMITTED);
        assert_eq!(store.write_count(), 1);

        let stored = store.documents(MEMBERSHIP_APPLICATIONS);
        assert_eq!(stored.len(), 1);
        let record = &stored[0];
        assert!(record.timestamp_field(CREATED_AT).unwrap() > invoked_at);

        let mut without_stamp = record.fields.clone();
        without_stamp.remove(CREATED_AT);
        assert_eq!(Value::Object(without_stamp), membership());
    }

    #[tokio::test]
    async fn invalid_email_is_rejected_without_writing() {
        let store = MemoryStore::new();
        let conn = connect(&store);
        let mut payload = membership();
        payload["email"] = json!("not-an-email");

        let response = submit(&conn, SubmissionKind::Membership, &payload).await;
        assert_eq!(response, SubmitResponse::rejected("Données invalides."));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn every_missing_required_field_prevents_the_write() {
        let store = MemoryStore::new();
        let conn = connect(&store);
        for field in ["name", "promotion", "email", "phone"] {
            let mut payload = membership();
            payload.as_object_mut().unwrap().remove(field);
            let response = submit(&conn, SubmissionKind::Membership, &payload).await;
            assert!(!response.success, "{field} should be required");
        }
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn backend_failure_reports_generic_message() {
        let store = MemoryStore::new();
        let conn = connect(&store);
        store.fail_writes(Some("unreachable"));

        let response = submit(&conn, SubmissionKind::Membership, &membership()).await;
        assert_eq!(response, SubmitResponse::rejected(FAILED));
        assert!(store.documents(MEMBERSHIP_APPLICATIONS).is_empty());

        store.fail_writes(None);
        let retry = submit(&conn, SubmissionKind::Membership, &membership()).await;
        assert!(retry.success);
    }

    #[tokio::test]
    async fn submissions_only_ever_create() {
        let store = MemoryStore::new();
        let first = submit_checked(&store, SubmissionKind::Membership, &membership()).await.unwrap();
        let second = submit_checked(&store, SubmissionKind::Membership, &membership()).await.unwrap();
        assert_ne!(first, second);

        let a = store.get(&DocumentRef::new(MEMBERSHIP_APPLICATIONS, first)).unwrap();
        let b = store.get(&DocumentRef::new(MEMBERSHIP_APPLICATIONS, second)).unwrap();
        assert!(b.timestamp_field(CREATED_AT) > a.timestamp_field(CREATED_AT));
    }

    #[tokio::test]
    async fn validation_error_lists_offending_fields() {
        let store = MemoryStore::new();
        let err = submit_checked(&store, SubmissionKind::Mentor, &json!({ "name": "Ibrahim" }))
            .await
            .unwrap_err();
        match err {
            SubmitError::Invalid(err) => {
                for field in ["contact", "promotion", "field", "motivation"] {
                    assert!(err.has_error_for(field));
                }
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

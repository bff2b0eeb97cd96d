//! Live-query websocket protocol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SubscriptionError;
use crate::models::{DocumentRef, QueryDescriptor, Record};

/// Frame wrapping every websocket message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsEnvelope<T> {
    pub id: String,
    #[serde(flatten)]
    pub payload: T,
    pub ts: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl<T> WsEnvelope<T> {
    pub fn new(payload: T) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            payload,
            ts: Utc::now(),
            correlation_id: None,
        }
    }

    /// Envelope answering the frame with id `request_id`.
    pub fn reply_to(request_id: &str, payload: T) -> Self {
        Self {
            correlation_id: Some(request_id.to_string()),
            ..Self::new(payload)
        }
    }
}

/// What a subscription observes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ListenTarget {
    Query(QueryDescriptor),
    Document(DocumentRef),
}

impl ListenTarget {
    pub fn collection(&self) -> &str {
        match self {
            ListenTarget::Query(q) => &q.collection,
            ListenTarget::Document(d) => &d.collection,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientCommand {
    Subscribe {
        subscription_id: String,
        target: ListenTarget,
    },
    Unsubscribe {
        subscription_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    QuerySnapshot {
        subscription_id: String,
        records: Vec<Record>,
    },
    DocumentSnapshot {
        subscription_id: String,
        record: Option<Record>,
    },
    /// The subscription is over; no further snapshots follow for it.
    SubscriptionError {
        subscription_id: String,
        error: SubscriptionError,
    },
    Error {
        code: String,
        message: String,
    },
}

impl ServerEvent {
    pub fn subscription_id(&self) -> Option<&str> {
        match self {
            ServerEvent::QuerySnapshot { subscription_id, .. }
            | ServerEvent::DocumentSnapshot { subscription_id, .. }
            | ServerEvent::SubscriptionError { subscription_id, .. } => Some(subscription_id),
            ServerEvent::Error { .. } => None,
        }
    }
}

/// Body of a successful `POST /api/collections/{collection}/documents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use serde_json::json;

    #[test]
    fn subscribe_command_wire_format() {
        let cmd = WsEnvelope {
            id: "f1".to_string(),
            payload: ClientCommand::Subscribe {
                subscription_id: "s1".into(),
                target: ListenTarget::Query(
                    QueryDescriptor::new("posts")
                        .where_eq("association", "")
                        .order_by("createdAt", Direction::Desc)
                        .limit(3),
                ),
            },
            ts: DateTime::from_timestamp(0, 0).unwrap(),
            correlation_id: None,
        };
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value["type"], "subscribe");
        assert_eq!(value["data"]["subscriptionId"], "s1");
        assert_eq!(value["data"]["target"]["kind"], "query");
        assert_eq!(value["data"]["target"]["orderBy"][0]["direction"], "desc");
        assert_eq!(value["data"]["target"]["filters"][0]["op"], "==");

        let back: WsEnvelope<ClientCommand> = serde_json::from_value(value).unwrap();
        assert_eq!(back.payload, cmd.payload);
    }

    #[test]
    fn document_snapshot_carries_merged_id() {
        let event = ServerEvent::DocumentSnapshot {
            subscription_id: "s2".into(),
            record: serde_json::from_value(json!({ "id": "main", "phone": "+227" })).unwrap(),
        };
        let value = serde_json::to_value(WsEnvelope::reply_to("f2", event)).unwrap();
        assert_eq!(value["type"], "documentSnapshot");
        assert_eq!(value["data"]["record"], json!({ "id": "main", "phone": "+227" }));
        assert_eq!(value["correlationId"], "f2");
    }

    #[test]
    fn subscription_error_names_its_subscription() {
        let event: ServerEvent = serde_json::from_value(json!({
            "type": "subscriptionError",
            "data": {
                "subscriptionId": "s3",
                "error": { "code": "permission-denied", "message": "nope" }
            }
        }))
        .unwrap();
        assert_eq!(event.subscription_id(), Some("s3"));
    }
}

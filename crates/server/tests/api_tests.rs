use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use ltdk_server::{build_router, db::PersistentStore, new_memory_store, state::AppState};
use ltdk_shared::{
    AppRegistry, BackendConfig, ClientCommand, CreatedResponse, DocumentRef, DocumentStore, Fields, ListenTarget, MemoryStore,
    NewDocument, ProblemDetails, QueryDescriptor, ServerEvent, SubmitResponse, WsEnvelope, DOCUMENTS,
    MEMBERSHIP_APPLICATIONS,
};
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;

struct TestServer {
    base: String,
    memory: MemoryStore,
}

/// Spin up the HTTP server on an OS-assigned port.
async fn spawn_test_server() -> TestServer {
    let memory = new_memory_store();
    let store = PersistentStore::in_memory(memory.clone());
    let connection = AppRegistry::with_store(Arc::new(store) as Arc<dyn DocumentStore>)
        .initialize(&BackendConfig::local("ltdk-test"))
        .unwrap();
    let app = build_router(AppState::new(connection, "http://127.0.0.1"));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base: format!("http://127.0.0.1:{}", port),
        memory,
    }
}

fn fields(value: serde_json::Value) -> Fields {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn health_reports_project() {
    let server = spawn_test_server().await;
    let body: serde_json::Value = reqwest::get(format!("{}/health", server.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["projectId"], "ltdk-test");
}

#[tokio::test]
async fn membership_action_stores_application() {
    let server = spawn_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/actions/membership", server.base))
        .json(&json!({
            "name": "Aïchatou",
            "promotion": "2005",
            "email": "a@x.ne",
            "phone": "+227 96 00 00 00"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: SubmitResponse = resp.json().await.unwrap();
    assert_eq!(body, SubmitResponse::accepted());
    assert_eq!(server.memory.documents(MEMBERSHIP_APPLICATIONS).len(), 1);
}

#[tokio::test]
async fn invalid_action_payload_is_rejected_without_write() {
    let server = spawn_test_server().await;
    let client = reqwest::Client::new();

    let body: SubmitResponse = client
        .post(format!("{}/api/actions/membership", server.base))
        .json(&json!({
            "name": "Aïchatou",
            "promotion": "2005",
            "email": "not-an-email",
            "phone": "+227 96 00 00 00"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, SubmitResponse::rejected("Données invalides."));
    assert_eq!(server.memory.write_count(), 0);
}

#[tokio::test]
async fn unknown_action_is_a_problem() {
    let server = spawn_test_server().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/api/actions/newsletter", server.base))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    assert!(resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("application/problem+json"));
    let problem: ProblemDetails = resp.json().await.unwrap();
    assert_eq!(problem.status, 404);
}

#[tokio::test]
async fn client_may_create_library_documents_only() {
    let server = spawn_test_server().await;
    let client = reqwest::Client::new();

    let document = NewDocument::new(fields(json!({
        "title": "Bac 2021 Maths",
        "subject": "Mathématiques",
        "category": "sujet_bac",
        "fileURL": "https://files.example/bac-2021.pdf",
        "year": 2021,
        "series": "F3"
    })))
    .with_server_timestamp("createdAt");

    let resp = client
        .post(format!("{}/api/collections/{}/documents", server.base, DOCUMENTS))
        .json(&document)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let created: CreatedResponse = resp.json().await.unwrap();
    let stored = server.memory.get(&DocumentRef::new(DOCUMENTS, created.id)).unwrap();
    assert_eq!(stored.str_field("series"), Some("F3"));
    assert!(stored.timestamp_field("createdAt").is_some());

    let resp = client
        .post(format!("{}/api/collections/{}/documents", server.base, MEMBERSHIP_APPLICATIONS))
        .json(&NewDocument::new(fields(json!({ "name": "x" }))))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn invalid_library_document_is_unprocessable() {
    let server = spawn_test_server().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/api/collections/{}/documents", server.base, DOCUMENTS))
        .json(&NewDocument::new(fields(json!({
            "title": "Cours",
            "subject": "Physique",
            "category": "autre_document",
            "fileURL": "https://files.example/cours.pdf"
        }))))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
    assert!(server.memory.documents(DOCUMENTS).is_empty());
}

// --- Live queries ---

type Socket = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn connect(server: &TestServer) -> Socket {
    let url = format!("{}/api/ws", server.base.replacen("http", "ws", 1));
    let (socket, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    socket
}

async fn send(socket: &mut Socket, command: ClientCommand) {
    let json = serde_json::to_string(&WsEnvelope::new(command)).unwrap();
    socket.send(Message::Text(json.into())).await.unwrap();
}

async fn next_event(socket: &mut Socket) -> ServerEvent {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timed out waiting for event")
            .unwrap()
            .unwrap();
        if let Message::Text(text) = msg {
            let envelope: WsEnvelope<ServerEvent> = serde_json::from_str(&text).unwrap();
            return envelope.payload;
        }
    }
}

#[tokio::test]
async fn query_subscription_streams_replacement_snapshots() {
    let server = spawn_test_server().await;
    server.memory.insert("posts", "old", fields(json!({
        "title": "Journée portes ouvertes",
        "association": "",
        "createdAt": { "seconds": 1_713_600_000, "nanoseconds": 0 }
    })));

    let mut socket = connect(&server).await;
    let query = QueryDescriptor::new("posts")
        .where_eq("association", "")
        .order_by("createdAt", ltdk_shared::Direction::Desc)
        .limit(3);
    send(
        &mut socket,
        ClientCommand::Subscribe {
            subscription_id: "home".into(),
            target: ListenTarget::Query(query),
        },
    )
    .await;

    match next_event(&mut socket).await {
        ServerEvent::QuerySnapshot { subscription_id, records } => {
            assert_eq!(subscription_id, "home");
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].id, "old");
        }
        other => panic!("unexpected {other:?}"),
    }

    server.memory.insert("posts", "new", fields(json!({
        "title": "Concours national d'innovation",
        "association": "",
        "createdAt": { "seconds": 1_715_760_000, "nanoseconds": 0 }
    })));

    match next_event(&mut socket).await {
        ServerEvent::QuerySnapshot { records, .. } => {
            let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
            assert_eq!(ids, vec!["new", "old"]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn document_subscription_follows_deletion() {
    let server = spawn_test_server().await;
    server
        .memory
        .insert("contactInfo", "main", fields(json!({ "phone": "+227 20 41 00 00" })));

    let mut socket = connect(&server).await;
    send(
        &mut socket,
        ClientCommand::Subscribe {
            subscription_id: "contact".into(),
            target: ListenTarget::Document(DocumentRef::new("contactInfo", "main")),
        },
    )
    .await;

    match next_event(&mut socket).await {
        ServerEvent::DocumentSnapshot { record, .. } => {
            assert_eq!(record.unwrap().str_field("phone"), Some("+227 20 41 00 00"));
        }
        other => panic!("unexpected {other:?}"),
    }

    server.memory.remove(&DocumentRef::new("contactInfo", "main"));
    match next_event(&mut socket).await {
        ServerEvent::DocumentSnapshot { record, .. } => assert!(record.is_none()),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn private_collection_subscription_is_denied() {
    let server = spawn_test_server().await;
    let mut socket = connect(&server).await;
    send(
        &mut socket,
        ClientCommand::Subscribe {
            subscription_id: "peek".into(),
            target: ListenTarget::Query(QueryDescriptor::new(MEMBERSHIP_APPLICATIONS)),
        },
    )
    .await;

    match next_event(&mut socket).await {
        ServerEvent::SubscriptionError { subscription_id, error } => {
            assert_eq!(subscription_id, "peek");
            assert!(matches!(error, ltdk_shared::SubscriptionError::PermissionDenied(_)));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn unsubscribe_detaches_the_listener() {
    let server = spawn_test_server().await;
    let mut socket = connect(&server).await;
    send(
        &mut socket,
        ClientCommand::Subscribe {
            subscription_id: "docs".into(),
            target: ListenTarget::Query(QueryDescriptor::new(DOCUMENTS)),
        },
    )
    .await;
    assert!(matches!(next_event(&mut socket).await, ServerEvent::QuerySnapshot { .. }));
    assert_eq!(server.memory.listener_count(), 1);

    send(
        &mut socket,
        ClientCommand::Unsubscribe {
            subscription_id: "docs".into(),
        },
    )
    .await;

    let mut detached = false;
    for _ in 0..50 {
        if server.memory.listener_count() == 0 {
            detached = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(detached);
}

#[tokio::test]
async fn malformed_command_gets_error_event() {
    let server = spawn_test_server().await;
    let mut socket = connect(&server).await;
    socket.send(Message::Text("{\"type\":\"nope\"}".into())).await.unwrap();
    match next_event(&mut socket).await {
        ServerEvent::Error { code, .. } => assert_eq!(code, "BAD_COMMAND"),
        other => panic!("unexpected {other:?}"),
    }
}

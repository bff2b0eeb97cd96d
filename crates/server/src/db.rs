//! Durable document store: the live in-memory store mirrored into Aurora.
//!
//! Every document is one row of the `records` collection holding its
//! collection name, id and JSON body. Rows are loaded into memory at startup.
//! A write reaches memory, and therefore listeners, only after its row has
//! been written.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use aurora_db::{Aurora, FieldType};
use ltdk_shared::{
    BackendError, DocumentListener, DocumentRef, DocumentStore, Fields, ListenerRegistration, MemoryStore,
    NewDocument, QueryDescriptor, QueryListener,
};
use tokio::sync::Mutex;
use uuid::Uuid;

const RECORDS: &str = "records";
/// Constant column every row carries so the whole table can be selected.
const STORE_TAG: &str = "ltdk";

/// Open the Aurora database and make sure the `records` collection exists.
pub fn open_database(path: &Path) -> anyhow::Result<Arc<Aurora>> {
    let db_path = path.to_string_lossy().to_string();
    let db = Aurora::open(&db_path).map_err(|e| anyhow::anyhow!("failed to open database {db_path}: {e}"))?;

    let _ = db.new_collection(
        RECORDS,
        vec![
            ("key", FieldType::String, true),
            ("store", FieldType::String, false),
            ("collection", FieldType::String, false),
            ("doc_id", FieldType::String, false),
            ("body", FieldType::String, false), // JSON serialized
        ],
    );

    Ok(Arc::new(db))
}

fn row_key(doc: &DocumentRef) -> String {
    format!("{}/{}", doc.collection, doc.id)
}

fn db_error(e: impl std::fmt::Display) -> BackendError {
    BackendError::Internal(format!("Database error: {e}"))
}

#[derive(Clone)]
pub struct PersistentStore {
    memory: MemoryStore,
    db: Option<Arc<Aurora>>,
    /// Held from staging a write until it is applied to memory.
    write_lock: Arc<Mutex<()>>,
}

impl PersistentStore {
    /// A store that forgets everything on restart.
    pub fn in_memory(memory: MemoryStore) -> Self {
        Self::with_db(memory, None)
    }

    fn with_db(memory: MemoryStore, db: Option<Arc<Aurora>>) -> Self {
        Self {
            memory,
            db,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Load every stored row into `memory` and mirror later writes to `db`.
    pub async fn load(memory: MemoryStore, db: Arc<Aurora>) -> Result<Self, BackendError> {
        let rows = db
            .query(RECORDS)
            .filter(|f| f.eq("store", STORE_TAG.to_string()))
            .collect()
            .await
            .map_err(db_error)?;

        let mut loaded = 0usize;
        for row in rows {
            let text = |field: &str| row.data.get(field).and_then(|v| v.as_str()).map(str::to_string);
            let (Some(collection), Some(doc_id), Some(body)) = (text("collection"), text("doc_id"), text("body")) else {
                tracing::warn!(row = %row.id, "skipping malformed record row");
                continue;
            };
            match serde_json::from_str::<Fields>(&body) {
                Ok(fields) => {
                    memory.insert(&collection, &doc_id, fields);
                    loaded += 1;
                }
                Err(e) => tracing::warn!(%collection, %doc_id, "skipping unreadable record body: {}", e),
            }
        }
        tracing::info!(loaded, "documents loaded from database");

        Ok(Self::with_db(memory, Some(db)))
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Write `fields` to the row of `doc`, or delete the row on `None`.
    async fn persist(&self, doc: &DocumentRef, fields: Option<&Fields>) -> Result<(), BackendError> {
        let Some(db) = &self.db else {
            return Ok(());
        };
        let key = row_key(doc);
        let existing = db
            .query(RECORDS)
            .filter(|f| f.eq("key", key.clone()))
            .collect()
            .await
            .map_err(db_error)?
            .into_iter()
            .next();

        match (fields, existing) {
            (Some(fields), Some(row)) => {
                let body = serde_json::to_string(fields).map_err(db_error)?;
                db.update_document(RECORDS, &row.id, vec![("body", body.into())])
                    .await
                    .map_err(db_error)?;
            }
            (Some(fields), None) => {
                let body = serde_json::to_string(fields).map_err(db_error)?;
                db.insert_into(
                    RECORDS,
                    vec![
                        ("key", key.into()),
                        ("store", STORE_TAG.into()),
                        ("collection", doc.collection.clone().into()),
                        ("doc_id", doc.id.clone().into()),
                        ("body", body.into()),
                    ],
                )
                .await
                .map_err(db_error)?;
            }
            (None, Some(row)) => {
                db.delete(&format!("{RECORDS}:{}", row.id)).await.map_err(db_error)?;
            }
            (None, None) => {}
        }
        Ok(())
    }

    /// Persist `fields` for `doc`, then apply them in memory.
    async fn write(&self, doc: &DocumentRef, fields: Option<Fields>) -> Result<(), BackendError> {
        if let Err(e) = self.persist(doc, fields.as_ref()).await {
            tracing::error!(doc = %doc.path(), error = %e, "failed to persist write");
            return Err(e);
        }
        self.memory.commit(doc, fields);
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PersistentStore {
    fn listen_query(&self, query: &QueryDescriptor, listener: QueryListener) -> ListenerRegistration {
        self.memory.listen_query(query, listener)
    }

    fn listen_document(&self, doc: &DocumentRef, listener: DocumentListener) -> ListenerRegistration {
        self.memory.listen_document(doc, listener)
    }

    async fn add(&self, collection: &str, document: NewDocument) -> Result<String, BackendError> {
        let doc = DocumentRef::new(collection, Uuid::new_v4().simple().to_string());
        let _guard = self.write_lock.lock().await;
        let fields = self.memory.prepare_set(&doc, document, false)?;
        self.write(&doc, Some(fields)).await?;
        Ok(doc.id)
    }

    async fn set(&self, doc: &DocumentRef, document: NewDocument, merge: bool) -> Result<(), BackendError> {
        let _guard = self.write_lock.lock().await;
        let fields = self.memory.prepare_set(doc, document, merge)?;
        self.write(doc, Some(fields)).await
    }

    async fn delete(&self, doc: &DocumentRef) -> Result<(), BackendError> {
        let _guard = self.write_lock.lock().await;
        self.memory.prepare_delete()?;
        self.write(doc, None).await
    }
}

/// Write the documents of a `{collection: {id: fields}}` JSON file, replacing
/// any existing document with the same id.
pub async fn seed_from_file(store: &dyn DocumentStore, path: &Path) -> anyhow::Result<usize> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read seed file {}: {e}", path.display()))?;
    let seed: std::collections::BTreeMap<String, std::collections::BTreeMap<String, Fields>> =
        serde_json::from_str(&text)?;

    let mut written = 0;
    for (collection, documents) in seed {
        for (id, fields) in documents {
            store
                .set(&DocumentRef::new(collection.clone(), id), NewDocument::new(fields), false)
                .await?;
            written += 1;
        }
    }
    tracing::info!(written, path = %path.display(), "seed documents written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn writes_survive_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_database(&dir.path().join("db")).unwrap();

        let first = PersistentStore::load(MemoryStore::new(), db.clone()).await.unwrap();
        let id = first
            .add("documents", NewDocument::new(fields(json!({ "title": "Bac 2019" }))))
            .await
            .unwrap();
        let contact = DocumentRef::new("contactInfo", "main");
        first
            .set(&contact, NewDocument::new(fields(json!({ "phone": "+227" }))), false)
            .await
            .unwrap();
        first
            .set(&contact, NewDocument::new(fields(json!({ "email": "ltdk@x.ne" }))), true)
            .await
            .unwrap();
        drop(first);

        let second = PersistentStore::load(MemoryStore::new(), db.clone()).await.unwrap();
        let doc = second.memory().get(&DocumentRef::new("documents", id)).unwrap();
        assert_eq!(doc.str_field("title"), Some("Bac 2019"));
        let contact_doc = second.memory().get(&contact).unwrap();
        assert_eq!(contact_doc.str_field("phone"), Some("+227"));
        assert_eq!(contact_doc.str_field("email"), Some("ltdk@x.ne"));

        second.delete(&contact).await.unwrap();
        drop(second);

        let third = PersistentStore::load(MemoryStore::new(), db).await.unwrap();
        assert!(third.memory().get(&contact).is_none());
        assert_eq!(third.memory().documents("documents").len(), 1);
    }

    #[tokio::test]
    async fn failed_database_write_never_reaches_listeners() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");
        // No `records` collection, so every row write fails.
        let db = Aurora::open(&path.to_string_lossy().to_string()).unwrap();
        let memory = MemoryStore::new();
        memory.insert("contactInfo", "main", fields(json!({ "phone": "+227 20 41 00 00" })));
        let store = PersistentStore::with_db(memory.clone(), Some(Arc::new(db)));

        let snapshots: Arc<std::sync::Mutex<Vec<usize>>> = Arc::default();
        let sink = snapshots.clone();
        let _registration = store.listen_query(
            &QueryDescriptor::new("documents"),
            Arc::new(move |result| sink.lock().unwrap().push(result.map(|r| r.len()).unwrap_or(0))),
        );

        let result = store
            .add("documents", NewDocument::new(fields(json!({ "title": "Bac 2020" }))).with_server_timestamp("createdAt"))
            .await;
        assert!(matches!(result, Err(BackendError::Internal(_))), "{result:?}");

        let contact = DocumentRef::new("contactInfo", "main");
        assert!(store
            .set(&contact, NewDocument::new(fields(json!({ "email": "ltdk@x.ne" }))), true)
            .await
            .is_err());
        assert!(store.delete(&contact).await.is_err());

        assert_eq!(*snapshots.lock().unwrap(), vec![0]);
        assert_eq!(memory.write_count(), 0);
        assert!(memory.documents("documents").is_empty());
        let kept = memory.get(&contact).unwrap();
        assert_eq!(kept.str_field("phone"), Some("+227 20 41 00 00"));
        assert_eq!(kept.str_field("email"), None);
    }

    #[tokio::test]
    async fn seed_file_replaces_documents() {
        let dir = tempfile::tempdir().unwrap();
        let seed = dir.path().join("seed.json");
        std::fs::write(
            &seed,
            json!({
                "schoolOfficials": { "headmaster": { "name": "M. Noungo Oumarou", "role": "Proviseur du LTDK" } },
                "contactInfo": { "main": { "phone": "+227 20 41 00 00" } }
            })
            .to_string(),
        )
        .unwrap();

        let store = PersistentStore::in_memory(MemoryStore::new());
        assert_eq!(seed_from_file(&store, &seed).await.unwrap(), 2);
        let headmaster = store
            .memory()
            .get(&DocumentRef::new("schoolOfficials", "headmaster"))
            .unwrap();
        assert_eq!(headmaster.str_field("role"), Some("Proviseur du LTDK"));
    }
}

//! In-process document store.
//!
//! The server uses it as its authoritative live state; tests use it as a
//! fake backend with write-count and read-rule probes.
//!
//! Listener callbacks never run under the state lock. Changes are queued in
//! write order and drained by whichever caller is not already draining, so a
//! listener may itself write to the store.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{BackendError, SubscriptionError};
use crate::models::{DocumentRef, Fields, QueryDescriptor, Record, Timestamp};
use crate::store::{DocumentListener, DocumentStore, ListenerRegistration, NewDocument, QueryListener};

struct Slot<L> {
    active: AtomicBool,
    sink: L,
}

impl<L> Slot<L> {
    fn new(sink: L) -> Arc<Self> {
        Arc::new(Self {
            active: AtomicBool::new(true),
            sink,
        })
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

enum Watch {
    Query {
        query: QueryDescriptor,
        slot: Arc<Slot<QueryListener>>,
        last: Option<Vec<Record>>,
    },
    Document {
        doc: DocumentRef,
        slot: Arc<Slot<DocumentListener>>,
        last: Option<Option<Record>>,
    },
}

impl Watch {
    fn collection(&self) -> &str {
        match self {
            Watch::Query { query, .. } => &query.collection,
            Watch::Document { doc, .. } => &doc.collection,
        }
    }
}

enum Delivery {
    Query(Arc<Slot<QueryListener>>, Result<Vec<Record>, SubscriptionError>),
    Document(Arc<Slot<DocumentListener>>, Result<Option<Record>, SubscriptionError>),
}

impl Delivery {
    fn run(self) {
        match self {
            Delivery::Query(slot, result) => {
                if slot.is_active() {
                    (slot.sink)(result);
                }
            }
            Delivery::Document(slot, result) => {
                if slot.is_active() {
                    (slot.sink)(result);
                }
            }
        }
    }
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, BTreeMap<String, Fields>>,
    watches: BTreeMap<u64, Watch>,
    next_watch: u64,
    private: HashSet<String>,
    revoked: HashSet<String>,
    clock: Option<Timestamp>,
    writes: usize,
    failing: Option<String>,
    pending: VecDeque<Delivery>,
    draining: bool,
}

impl Inner {
    fn readable(&self, collection: &str) -> Result<(), SubscriptionError> {
        if self.private.contains(collection) || self.revoked.contains(collection) {
            return Err(SubscriptionError::PermissionDenied(format!(
                "missing or insufficient permissions to read `{collection}`"
            )));
        }
        Ok(())
    }

    /// Strictly increasing backend clock, always after the wall clock
    /// reading taken on entry.
    fn tick(&mut self) -> Timestamp {
        let now = Timestamp::now();
        let floor = match self.clock {
            Some(last) if last > now => last,
            _ => now,
        };
        let next = floor.next_after();
        self.clock = Some(next);
        next
    }

    fn check_writable(&self) -> Result<(), BackendError> {
        match &self.failing {
            Some(reason) => Err(BackendError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    /// Fields a `set` of `document` on `doc` would store.
    fn stage(&mut self, doc: &DocumentRef, document: NewDocument, merge: bool) -> Result<Fields, BackendError> {
        self.check_writable()?;
        let fields = document.resolve(self.tick());
        let existing = self.collections.get(&doc.collection).and_then(|docs| docs.get(&doc.id));
        Ok(match existing {
            Some(existing) if merge => {
                let mut merged = existing.clone();
                merged.extend(fields);
                merged
            }
            _ => fields,
        })
    }

    /// Store `fields` at `doc`, or delete it on `None`, and queue snapshots.
    fn apply(&mut self, doc: &DocumentRef, fields: Option<Fields>) {
        match fields {
            Some(fields) => {
                self.collections
                    .entry(doc.collection.clone())
                    .or_default()
                    .insert(doc.id.clone(), fields);
            }
            None => {
                if let Some(docs) = self.collections.get_mut(&doc.collection) {
                    docs.remove(&doc.id);
                }
            }
        }
        self.writes += 1;
        self.collect_changes(&doc.collection);
    }

    fn lookup(&self, doc: &DocumentRef) -> Option<Record> {
        self.collections
            .get(&doc.collection)
            .and_then(|docs| docs.get(&doc.id))
            .map(|fields| Record::new(doc.id.clone(), fields.clone()))
    }

    fn run_query(&self, query: &QueryDescriptor) -> Vec<Record> {
        match self.collections.get(&query.collection) {
            Some(docs) => query.evaluate(docs.iter()),
            None => Vec::new(),
        }
    }

    /// Queue a snapshot for every watch on `collection` whose view changed.
    fn collect_changes(&mut self, collection: &str) {
        let mut changed = Vec::new();
        for watch in self.watches.values() {
            if watch.collection() != collection {
                continue;
            }
            match watch {
                Watch::Query { query, slot, last } => {
                    let records = self.run_query(query);
                    if last.as_ref() != Some(&records) {
                        changed.push(Delivery::Query(slot.clone(), Ok(records)));
                    }
                }
                Watch::Document { doc, slot, last } => {
                    let record = self.lookup(doc);
                    if last.as_ref() != Some(&record) {
                        changed.push(Delivery::Document(slot.clone(), Ok(record)));
                    }
                }
            }
        }

        for delivery in &changed {
            self.remember(delivery);
        }
        self.pending.extend(changed);
    }

    fn remember(&mut self, delivery: &Delivery) {
        for watch in self.watches.values_mut() {
            match (watch, delivery) {
                (Watch::Query { slot, last, .. }, Delivery::Query(target, Ok(records)))
                    if Arc::ptr_eq(slot, target) =>
                {
                    *last = Some(records.clone());
                }
                (Watch::Document { slot, last, .. }, Delivery::Document(target, Ok(record)))
                    if Arc::ptr_eq(slot, target) =>
                {
                    *last = Some(record.clone());
                }
                _ => {}
            }
        }
    }

    /// Fail and drop every watch on `collection`.
    fn fail_watches(&mut self, collection: &str, error: &SubscriptionError) {
        let ids: Vec<u64> = self
            .watches
            .iter()
            .filter(|(_, w)| w.collection() == collection)
            .map(|(id, _)| *id)
            .collect();
        for id in ids {
            match self.watches.remove(&id) {
                Some(Watch::Query { slot, .. }) => self.pending.push_back(Delivery::Query(slot, Err(error.clone()))),
                Some(Watch::Document { slot, .. }) => {
                    self.pending.push_back(Delivery::Document(slot, Err(error.clone())))
                }
                None => {}
            }
        }
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Shared, cloneable in-memory store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collections nobody may listen on. Writes are still accepted.
    pub fn with_private_collections<I, S>(self, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.inner)
            .private
            .extend(collections.into_iter().map(Into::into));
        self
    }

    pub fn is_readable(&self, collection: &str) -> bool {
        lock(&self.inner).readable(collection).is_ok()
    }

    /// Withdraw read access on `collection`, failing its live listeners.
    pub fn revoke_reads(&self, collection: &str) {
        {
            let mut inner = lock(&self.inner);
            inner.revoked.insert(collection.to_string());
            let error = SubscriptionError::PermissionDenied(format!("read access to `{collection}` was revoked"));
            inner.fail_watches(collection, &error);
        }
        tracing::debug!(collection, "read access revoked");
        self.drain();
    }

    pub fn grant_reads(&self, collection: &str) {
        lock(&self.inner).revoked.remove(collection);
    }

    /// Make every write fail with `BackendError::Unavailable` until cleared.
    pub fn fail_writes(&self, reason: Option<&str>) {
        lock(&self.inner).failing = reason.map(str::to_string);
    }

    /// Number of accepted `add`, `set` and `delete` calls.
    pub fn write_count(&self) -> usize {
        lock(&self.inner).writes
    }

    /// Number of attached listeners.
    pub fn listener_count(&self) -> usize {
        lock(&self.inner).watches.len()
    }

    /// Store a document as-is, without counting it as a client write.
    pub fn insert(&self, collection: &str, id: &str, fields: Fields) {
        {
            let mut inner = lock(&self.inner);
            inner
                .collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), fields);
            inner.collect_changes(collection);
        }
        self.drain();
    }

    /// Drop a document without counting it as a client write.
    pub fn remove(&self, doc: &DocumentRef) {
        {
            let mut inner = lock(&self.inner);
            if let Some(docs) = inner.collections.get_mut(&doc.collection) {
                docs.remove(&doc.id);
            }
            inner.collect_changes(&doc.collection);
        }
        self.drain();
    }

    pub fn get(&self, doc: &DocumentRef) -> Option<Record> {
        lock(&self.inner).lookup(doc)
    }

    /// Every document of `collection`, ordered by id.
    pub fn documents(&self, collection: &str) -> Vec<Record> {
        lock(&self.inner).run_query(&QueryDescriptor::new(collection))
    }

    pub fn collection_names(&self) -> Vec<String> {
        lock(&self.inner).collections.keys().cloned().collect()
    }

    /// Resolve the fields a write to `doc` would store without storing them.
    ///
    /// Server timestamps are taken from the store clock here, so a later
    /// [`commit`](Self::commit) keeps them ordered with other writes.
    pub fn prepare_set(&self, doc: &DocumentRef, document: NewDocument, merge: bool) -> Result<Fields, BackendError> {
        lock(&self.inner).stage(doc, document, merge)
    }

    pub fn prepare_delete(&self) -> Result<(), BackendError> {
        lock(&self.inner).check_writable()
    }

    /// Apply a prepared write: `Some` stores the fields, `None` deletes.
    /// Counts as a write and notifies listeners.
    pub fn commit(&self, doc: &DocumentRef, fields: Option<Fields>) {
        lock(&self.inner).apply(doc, fields);
        self.drain();
    }

    fn detach(weak: &Weak<Mutex<Inner>>, id: u64) {
        if let Some(inner) = weak.upgrade() {
            lock(&inner).watches.remove(&id);
        }
    }

    fn drain(&self) {
        {
            let mut inner = lock(&self.inner);
            if inner.draining {
                return;
            }
            inner.draining = true;
        }
        loop {
            let next = {
                let mut inner = lock(&self.inner);
                let next = inner.pending.pop_front();
                if next.is_none() {
                    inner.draining = false;
                }
                next
            };
            match next {
                Some(delivery) => delivery.run(),
                None => break,
            }
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl DocumentStore for MemoryStore {
    fn listen_query(&self, query: &QueryDescriptor, listener: QueryListener) -> ListenerRegistration {
        let slot = Slot::new(listener);
        let id = {
            let mut inner = lock(&self.inner);
            if let Err(error) = inner.readable(&query.collection) {
                tracing::debug!(collection = %query.collection, "query listener refused");
                inner.pending.push_back(Delivery::Query(slot, Err(error)));
                drop(inner);
                self.drain();
                return ListenerRegistration::noop();
            }

            let records = inner.run_query(query);
            let id = inner.next_watch;
            inner.next_watch += 1;
            inner.watches.insert(
                id,
                Watch::Query {
                    query: query.clone(),
                    slot: slot.clone(),
                    last: Some(records.clone()),
                },
            );
            inner.pending.push_back(Delivery::Query(slot.clone(), Ok(records)));
            id
        };
        self.drain();

        let weak = Arc::downgrade(&self.inner);
        ListenerRegistration::new(move || {
            slot.deactivate();
            MemoryStore::detach(&weak, id);
        })
    }

    fn listen_document(&self, doc: &DocumentRef, listener: DocumentListener) -> ListenerRegistration {
        let slot = Slot::new(listener);
        let id = {
            let mut inner = lock(&self.inner);
            if let Err(error) = inner.readable(&doc.collection) {
                tracing::debug!(doc = %doc.path(), "document listener refused");
                inner.pending.push_back(Delivery::Document(slot, Err(error)));
                drop(inner);
                self.drain();
                return ListenerRegistration::noop();
            }

            let record = inner.lookup(doc);
            let id = inner.next_watch;
            inner.next_watch += 1;
            inner.watches.insert(
                id,
                Watch::Document {
                    doc: doc.clone(),
                    slot: slot.clone(),
                    last: Some(record.clone()),
                },
            );
            inner.pending.push_back(Delivery::Document(slot.clone(), Ok(record)));
            id
        };
        self.drain();

        let weak = Arc::downgrade(&self.inner);
        ListenerRegistration::new(move || {
            slot.deactivate();
            MemoryStore::detach(&weak, id);
        })
    }

    async fn add(&self, collection: &str, document: NewDocument) -> Result<String, BackendError> {
        let doc = DocumentRef::new(collection, Uuid::new_v4().simple().to_string());
        {
            let mut inner = lock(&self.inner);
            let fields = inner.stage(&doc, document, false)?;
            inner.apply(&doc, Some(fields));
        }
        tracing::debug!(collection, id = %doc.id, "document added");
        self.drain();
        Ok(doc.id)
    }

    async fn set(&self, doc: &DocumentRef, document: NewDocument, merge: bool) -> Result<(), BackendError> {
        {
            let mut inner = lock(&self.inner);
            let fields = inner.stage(doc, document, merge)?;
            inner.apply(doc, Some(fields));
        }
        tracing::debug!(doc = %doc.path(), merge, "document set");
        self.drain();
        Ok(())
    }

    async fn delete(&self, doc: &DocumentRef) -> Result<(), BackendError> {
        {
            let mut inner = lock(&self.inner);
            inner.check_writable()?;
            inner.apply(doc, None);
        }
        tracing::debug!(doc = %doc.path(), "document deleted");
        self.drain();
        Ok(())
    }
}

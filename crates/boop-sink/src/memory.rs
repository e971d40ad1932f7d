use boop_core::EventRecord;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use crate::handle::{new_document_id, EventHandle};
use crate::sink::{EventSink, StoredEvent};

/// Keeps every record in process memory. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<StoredEvent>>>,
}

impl MemorySink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored events in write order.
    pub fn records(&self) -> Vec<StoredEvent> {
        self.events.lock().clone()
    }

    /// Stored records for one namespace, in write order.
    pub fn records_in(&self, namespace: &str) -> Vec<EventRecord> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.namespace == namespace)
            .map(|e| e.record.clone())
            .collect()
    }

    /// Names of the stored events, in write order.
    pub fn event_names(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.record.event.clone()).collect()
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Drops every stored event.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for MemorySink {
    fn write(&self, namespace: &str, record: EventRecord) -> Option<EventHandle> {
        let document_id = new_document_id();
        debug!(
            namespace = %namespace,
            document_id = %document_id,
            event = %record.event,
            "Stored event in memory"
        );
        self.events.lock().push(StoredEvent {
            namespace: namespace.to_string(),
            document_id: document_id.clone(),
            record,
        });
        Some(EventHandle::ready(namespace, document_id))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

use async_trait::async_trait;
use boop_core::{BoopError, BoopResult, EventRecord};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::handle::{new_document_id, Completion, EventHandle};
use crate::sink::check_namespace;

/// Backend that persists one document at a time.
#[async_trait]
pub(crate) trait DocumentWriter: Send + Sync {
    async fn store(
        &self,
        namespace: &str,
        document_id: &str,
        record: &EventRecord,
    ) -> BoopResult<()>;
}

struct PendingWrite {
    namespace: String,
    document_id: String,
    record: EventRecord,
    completion: Completion,
}

/// Queue drained by a single background task, so writes land in submit order.
pub(crate) struct WriteQueue {
    sink: &'static str,
    tx: mpsc::UnboundedSender<PendingWrite>,
}

impl WriteQueue {
    /// Spawns the worker on the current tokio runtime.
    pub(crate) fn spawn(sink: &'static str, writer: Arc<dyn DocumentWriter>) -> BoopResult<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| BoopError::Sink(format!("the {sink} sink requires a tokio runtime")))?;
        let (tx, mut rx) = mpsc::unbounded_channel::<PendingWrite>();

        runtime.spawn(async move {
            while let Some(write) = rx.recv().await {
                let outcome = writer
                    .store(&write.namespace, &write.document_id, &write.record)
                    .await;
                match &outcome {
                    Ok(()) => debug!(
                        sink,
                        namespace = %write.namespace,
                        document_id = %write.document_id,
                        event = %write.record.event,
                        "Tracked event"
                    ),
                    Err(e) => error!(
                        sink,
                        namespace = %write.namespace,
                        document_id = %write.document_id,
                        error = %e,
                        "Error adding document"
                    ),
                }
                write.completion.complete(outcome);
            }
            debug!(sink, "Write queue closed");
        });

        Ok(Self { sink, tx })
    }

    pub(crate) fn submit(&self, namespace: &str, record: EventRecord) -> Option<EventHandle> {
        if let Err(e) = check_namespace(namespace) {
            error!(sink = self.sink, error = %e, "Rejected event");
            return None;
        }
        let document_id = new_document_id();
        let (handle, completion) = EventHandle::pending(namespace, document_id.clone());
        let write = PendingWrite {
            namespace: namespace.to_string(),
            document_id,
            record,
            completion,
        };
        if self.tx.send(write).is_err() {
            error!(
                sink = self.sink,
                namespace = %namespace,
                "Write queue is closed, event dropped"
            );
            return None;
        }
        Some(handle)
    }
}

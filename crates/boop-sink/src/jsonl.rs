use async_trait::async_trait;
use boop_core::{BoopError, BoopResult, EventRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use crate::handle::EventHandle;
use crate::sink::{check_namespace, EventSink, StoredEvent};
use crate::worker::{DocumentWriter, WriteQueue};

const DOCUMENT_ID_FIELD: &str = "documentId";

/// Appends events to `<dir>/<namespace>.jsonl`, one JSON object per line.
pub struct JsonlSink {
    dir: PathBuf,
    queue: WriteQueue,
}

impl JsonlSink {
    /// Creates the sink. The directory is created on first write.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(dir: impl Into<PathBuf>) -> BoopResult<Self> {
        let dir = dir.into();
        let writer = Arc::new(JsonlWriter { dir: dir.clone() });
        Ok(Self {
            queue: WriteQueue::spawn("jsonl", writer)?,
            dir,
        })
    }

    /// Directory the sink writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reads back every event stored under `namespace` in `dir`, in write order.
    pub async fn read(dir: &Path, namespace: &str) -> BoopResult<Vec<StoredEvent>> {
        check_namespace(namespace)?;
        let path = collection_path(dir, namespace);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = tokio::fs::read_to_string(&path).await?;
        data.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|line| -> BoopResult<StoredEvent> {
                let mut value: serde_json::Value = serde_json::from_str(line)?;
                let document_id = value
                    .as_object_mut()
                    .and_then(|obj| obj.remove(DOCUMENT_ID_FIELD))
                    .and_then(|id| id.as_str().map(str::to_string))
                    .ok_or_else(|| {
                        BoopError::Sink(format!(
                            "{} has a line without {DOCUMENT_ID_FIELD}",
                            path.display()
                        ))
                    })?;
                Ok(StoredEvent {
                    namespace: namespace.to_string(),
                    document_id,
                    record: serde_json::from_value(value)?,
                })
            })
            .collect()
    }
}

impl EventSink for JsonlSink {
    fn write(&self, namespace: &str, record: EventRecord) -> Option<EventHandle> {
        self.queue.submit(namespace, record)
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}

fn collection_path(dir: &Path, namespace: &str) -> PathBuf {
    dir.join(format!("{namespace}.jsonl"))
}

struct JsonlWriter {
    dir: PathBuf,
}

#[async_trait]
impl DocumentWriter for JsonlWriter {
    async fn store(
        &self,
        namespace: &str,
        document_id: &str,
        record: &EventRecord,
    ) -> BoopResult<()> {
        let mut value = serde_json::to_value(record)?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert(DOCUMENT_ID_FIELD.to_string(), document_id.into());
        }
        let mut line = serde_json::to_string(&value)?;
        line.push('\n');

        tokio::fs::create_dir_all(&self.dir).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(collection_path(&self.dir, namespace))
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

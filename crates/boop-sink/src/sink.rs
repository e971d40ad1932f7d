use boop_core::{BoopError, BoopResult, EventRecord};
use serde::{Deserialize, Serialize};

use crate::handle::EventHandle;

/// Destination for tracked events.
///
/// `write` must not block: it hands the record off and returns a handle
/// right away. Failures are logged by the sink itself. `None` means the
/// record could not even be submitted.
pub trait EventSink: Send + Sync {
    /// Submits `record` for persistence under `namespace`.
    fn write(&self, namespace: &str, record: EventRecord) -> Option<EventHandle>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// A record together with where it was stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Namespace (collection) the record was written to.
    pub namespace: String,
    /// Document id assigned on submit.
    pub document_id: String,
    /// The persisted record.
    pub record: EventRecord,
}

/// Namespaces become file names and URL segments; keep them to one plain segment.
pub(crate) fn check_namespace(namespace: &str) -> BoopResult<()> {
    if namespace.is_empty()
        || namespace == "."
        || namespace == ".."
        || namespace.contains(['/', '\\'])
    {
        return Err(BoopError::Sink(format!("invalid namespace '{namespace}'")));
    }
    Ok(())
}

use boop_core::{BoopError, BoopResult};
use tokio::sync::oneshot;
use uuid::Uuid;

const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const ID_LEN: usize = 20;

/// Generates a 20-character alphanumeric document id.
pub fn new_document_id() -> String {
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    first
        .as_bytes()
        .iter()
        .chain(second.as_bytes())
        .take(ID_LEN)
        .map(|b| ID_ALPHABET[(*b as usize) % ID_ALPHABET.len()] as char)
        .collect()
}

/// Reference to a submitted write.
///
/// Dropping the handle does not cancel the write.
#[derive(Debug)]
pub struct EventHandle {
    document_id: String,
    namespace: String,
    completion: oneshot::Receiver<BoopResult<()>>,
}

/// Sender half of an [`EventHandle`], resolved by the sink once the write settles.
#[derive(Debug)]
pub struct Completion(oneshot::Sender<BoopResult<()>>);

impl Completion {
    /// Reports the outcome. A handle that was already dropped is ignored.
    pub fn complete(self, outcome: BoopResult<()>) {
        let _ = self.0.send(outcome);
    }
}

impl EventHandle {
    /// A handle whose outcome is reported later through the returned [`Completion`].
    pub fn pending(
        namespace: impl Into<String>,
        document_id: impl Into<String>,
    ) -> (Self, Completion) {
        let (tx, rx) = oneshot::channel();
        let handle = Self {
            document_id: document_id.into(),
            namespace: namespace.into(),
            completion: rx,
        };
        (handle, Completion(tx))
    }

    /// A handle for a write that has already succeeded.
    pub fn ready(namespace: impl Into<String>, document_id: impl Into<String>) -> Self {
        let (handle, completion) = Self::pending(namespace, document_id);
        completion.complete(Ok(()));
        handle
    }

    /// Id of the document the record is stored under.
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Namespace (collection) the record is written to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `namespace/document_id`.
    pub fn path(&self) -> String {
        format!("{}/{}", self.namespace, self.document_id)
    }

    /// Waits for the sink to persist the record.
    pub async fn wait(self) -> BoopResult<()> {
        self.completion.await.map_err(|_| {
            BoopError::Sink(format!(
                "write of {}/{} was dropped before completing",
                self.namespace, self.document_id
            ))
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_ids_are_alphanumeric_and_unique() {
        let a = new_document_id();
        let b = new_document_id();
        assert_eq!(a.len(), 20);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn ready_handle_resolves_ok() {
        let handle = EventHandle::ready("app-dev", "abc");
        assert_eq!(handle.path(), "app-dev/abc");
        handle.wait().await.unwrap();
    }

    #[tokio::test]
    async fn failed_completion_surfaces_error() {
        let (handle, completion) = EventHandle::pending("app", "id");
        completion.complete(Err(BoopError::Http("boom".into())));
        assert!(matches!(handle.wait().await, Err(BoopError::Http(_))));
    }

    #[tokio::test]
    async fn dropped_completion_is_a_sink_error() {
        let (handle, completion) = EventHandle::pending("app", "id");
        drop(completion);
        assert!(matches!(handle.wait().await, Err(BoopError::Sink(_))));
    }
}

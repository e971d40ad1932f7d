//! Event sinks for Boop.
//!
//! A sink takes fully built [`EventRecord`](boop_core::EventRecord)s and
//! persists them without blocking the caller. Outcomes are logged by the
//! sink and can optionally be awaited through the returned [`EventHandle`].
//!
//! - [`MemorySink`] — in-process storage, used by tests and embedders.
//! - [`JsonlSink`] — one JSONL file per namespace.
//! - [`HttpDocumentSink`] — remote document store over HTTP.

/// Sink construction from [`SinkConfig`](boop_core::SinkConfig).
pub mod factory;
/// Write handles and document ids.
pub mod handle;
/// Remote document store sink.
pub mod http;
/// JSONL file sink.
pub mod jsonl;
/// In-memory sink.
pub mod memory;
/// The [`EventSink`] trait.
pub mod sink;
mod worker;

pub use factory::build_sink;
pub use handle::{new_document_id, Completion, EventHandle};
pub use http::{HttpDocumentSink, HttpSinkOptions};
pub use jsonl::JsonlSink;
pub use memory::MemorySink;
pub use sink::{EventSink, StoredEvent};

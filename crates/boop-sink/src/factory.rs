use boop_core::{BoopResult, SinkConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::http::{HttpDocumentSink, HttpSinkOptions};
use crate::jsonl::JsonlSink;
use crate::memory::MemorySink;
use crate::sink::EventSink;

/// Builds the sink described by `config`.
///
/// `jsonl` and `http` sinks spawn a background writer and therefore need a
/// tokio runtime.
pub fn build_sink(config: &SinkConfig) -> BoopResult<Arc<dyn EventSink>> {
    let sink: Arc<dyn EventSink> = match config {
        SinkConfig::Memory => Arc::new(MemorySink::new()),
        SinkConfig::Jsonl { dir } => {
            info!(dir = %dir.display(), "Writing events to JSONL files");
            Arc::new(JsonlSink::new(dir.clone())?)
        }
        SinkConfig::Http {
            base_url,
            api_key,
            timeout_secs,
        } => {
            let mut options = HttpSinkOptions::new(base_url.clone())
                .with_timeout(Duration::from_secs(*timeout_secs));
            if let Some(key) = api_key {
                options = options.with_api_key(key.clone());
            }
            info!(base_url = %base_url, "Writing events to remote document store");
            Arc::new(HttpDocumentSink::new(options)?)
        }
    };
    Ok(sink)
}

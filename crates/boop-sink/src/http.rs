use async_trait::async_trait;
use boop_core::{BoopError, BoopResult, EventRecord};
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;

use crate::handle::EventHandle;
use crate::sink::EventSink;
use crate::worker::{DocumentWriter, WriteQueue};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`HttpDocumentSink`].
#[derive(Debug, Clone)]
pub struct HttpSinkOptions {
    /// Root URL of the document store API.
    pub base_url: String,
    /// Sent as `Authorization: Bearer <key>` when present.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpSinkOptions {
    /// Options with no API key and the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Writes each event as a JSON document to a remote document store.
///
/// Every record becomes
/// `POST {base_url}/collections/{namespace}/documents?documentId={id}`.
/// Writes are not retried.
pub struct HttpDocumentSink {
    base_url: Url,
    queue: WriteQueue,
}

impl HttpDocumentSink {
    /// Validates the options and starts the background writer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(options: HttpSinkOptions) -> BoopResult<Self> {
        let base_url = parse_base_url(&options.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| BoopError::Http(format!("Failed to create HTTP client: {e}")))?;
        let writer = Arc::new(HttpWriter {
            client,
            base_url: base_url.clone(),
            api_key: options.api_key,
        });
        Ok(Self {
            queue: WriteQueue::spawn("http", writer)?,
            base_url,
        })
    }

    /// The validated root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl EventSink for HttpDocumentSink {
    fn write(&self, namespace: &str, record: EventRecord) -> Option<EventHandle> {
        self.queue.submit(namespace, record)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Accepts only absolute `http`/`https` URLs that can carry path segments.
pub fn parse_base_url(raw: &str) -> BoopResult<Url> {
    let url = Url::parse(raw)
        .map_err(|e| BoopError::Config(format!("Invalid base_url '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(BoopError::Config(format!(
                "Unsupported scheme '{scheme}' in base_url. Only http/https allowed."
            )))
        }
    }
    if url.cannot_be_a_base() {
        return Err(BoopError::Config(format!("base_url '{raw}' cannot be a base URL")));
    }
    Ok(url)
}

/// `{base}/collections/{namespace}/documents?documentId={id}`
pub fn document_url(base: &Url, namespace: &str, document_id: &str) -> BoopResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| BoopError::Config(format!("base_url '{base}' cannot be a base URL")))?
        .pop_if_empty()
        .extend(["collections", namespace, "documents"]);
    url.query_pairs_mut().append_pair("documentId", document_id);
    Ok(url)
}

struct HttpWriter {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

#[async_trait]
impl DocumentWriter for HttpWriter {
    async fn store(
        &self,
        namespace: &str,
        document_id: &str,
        record: &EventRecord,
    ) -> BoopResult<()> {
        let url = document_url(&self.base_url, namespace, document_id)?;
        let mut request = self.client.post(url).json(record);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BoopError::Http(format!("request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BoopError::Http(format!("document store returned {status}: {body}")));
        }
        Ok(())
    }
}

//! Search engine access: the client seam, the projected search gateway and the bulk wire types.

mod elasticsearch;

use async_trait::async_trait;
pub use elasticsearch::ElasticsearchClient;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::EngineError;
use crate::json_ext::Value;
use crate::model::Person;
use crate::projection::FieldPath;

/// The search engine operations the router relies on.
///
/// Implementations perform exactly one engine round-trip per call: no caching, no retries.
#[async_trait]
pub trait SearchClient: Send + Sync + 'static {
    /// Delete `index`. Deleting an index that does not exist succeeds.
    async fn delete_index(&self, index: &str) -> Result<(), EngineError>;

    /// Create `index` empty, with default settings.
    async fn create_index(&self, index: &str) -> Result<(), EngineError>;

    /// Run a search restricted to the fields in `request.source`.
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, EngineError>;

    /// Submit all entries as a single bulk write.
    async fn bulk(&self, entries: &[BulkEntry]) -> Result<BulkResponse, EngineError>;
}

/// A search scoped to an index and document type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub index: String,
    pub document_type: String,
    /// The source filter: only these fields are returned.
    pub source: Vec<FieldPath>,
    /// Maximum number of hits, the engine's default when `None`.
    pub size: Option<u32>,
}

impl SearchRequest {
    pub(crate) fn body(&self) -> Value {
        // an empty includes list would return whole documents
        let mut body = if self.source.is_empty() {
            json!({ "_source": false })
        } else {
            json!({ "_source": self.source })
        };
        if let Some(size) = self.size {
            body["size"] = size.into();
        }
        body
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Hits,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    /// The (filtered) document.
    #[serde(rename = "_source", default)]
    pub source: Value,
}

/// Issues one projected search and returns the matching documents in engine order.
pub async fn fetch_documents<T>(
    client: &dyn SearchClient,
    request: SearchRequest,
) -> Result<Vec<T>, EngineError>
where
    T: DeserializeOwned,
{
    tracing::debug!(
        index = %request.index,
        document_type = %request.document_type,
        source = ?request.source,
        "searching"
    );
    let response = client.search(request).await?;
    tracing::debug!(hits = response.hits.hits.len(), "search returned");

    response
        .hits
        .hits
        .into_iter()
        .map(|hit| {
            serde_json::from_value(hit.source).map_err(|err| {
                EngineError::request_failed(
                    "search",
                    None,
                    format!("hit {} could not be decoded: {err}", hit.id.unwrap_or_default()),
                )
            })
        })
        .collect()
}

/// Where a bulk entry's document goes: `{"index": {"_index", "_type", "_id"}}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMetadata {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type")]
    pub document_type: String,
    /// Position of the document in its import run.
    #[serde(rename = "_id")]
    pub id: usize,
}

/// One document to index, paired with its action metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkEntry {
    pub action: ActionMetadata,
    pub document: Person,
}

/// The bulk request records: one action record followed by one document per entry.
pub fn bulk_body(entries: &[BulkEntry]) -> Result<Vec<Value>, EngineError> {
    let mut body = Vec::with_capacity(entries.len() * 2);
    for entry in entries {
        body.push(json!({ "index": entry.action }));
        body.push(serde_json::to_value(&entry.document).map_err(|err| {
            EngineError::request_failed(
                "bulk",
                None,
                format!("document {} could not be encoded: {err}", entry.action.id),
            )
        })?);
    }
    Ok(body)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkResponse {
    /// Whether at least one item failed.
    #[serde(default)]
    pub errors: bool,
    #[serde(default)]
    pub items: Vec<BulkItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkItem {
    pub index: BulkItemStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkItemStatus {
    #[serde(rename = "_id", default)]
    pub id: Option<Value>,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl BulkResponse {
    /// The number of documents written, or the first item failure.
    pub fn into_result(self) -> Result<usize, EngineError> {
        if !self.errors {
            return Ok(self.items.len());
        }
        let failures: Vec<_> = self
            .items
            .iter()
            .filter(|item| item.index.error.is_some())
            .collect();
        let reason = failures
            .first()
            .and_then(|item| item.index.error.as_ref())
            .map(|error| {
                error
                    .get("reason")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string())
            })
            .unwrap_or_else(|| "unknown error".to_string());

        Err(EngineError::request_failed(
            "bulk",
            None,
            format!("{} of {} items failed, first: {reason}", failures.len(), self.items.len()),
        ))
    }
}

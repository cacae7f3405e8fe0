//! Test utilities: an in-memory search engine.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::EngineError;
use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::projection::FieldPath;
use crate::search::BulkEntry;
use crate::search::BulkItem;
use crate::search::BulkItemStatus;
use crate::search::BulkResponse;
use crate::search::Hit;
use crate::search::Hits;
use crate::search::SearchClient;
use crate::search::SearchRequest;
use crate::search::SearchResponse;
use crate::search::bulk_body;

/// A call received by the [`MockSearchEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    DeleteIndex(String),
    CreateIndex(String),
    Search(SearchRequest),
    /// A bulk write with that many entries.
    Bulk(usize),
}

/// An in-memory [`SearchClient`].
///
/// Documents are kept in insertion order per index, searches return every document of the
/// index filtered by the requested source fields, the way the engine applies `_source`
/// includes. Every call is recorded.
#[derive(Debug, Default)]
pub struct MockSearchEngine {
    indices: Mutex<HashMap<String, Vec<(String, Value)>>>,
    calls: Mutex<Vec<EngineCall>>,
    failures: Mutex<Vec<EngineCall>>,
}

impl MockSearchEngine {
    /// Append documents to `index`, creating it if needed.
    pub fn insert(&self, index: &str, documents: impl IntoIterator<Item = Value>) {
        let mut indices = self.indices.lock().expect("lock poisoned");
        let stored = indices.entry(index.to_string()).or_default();
        for document in documents {
            let id = stored.len().to_string();
            stored.push((id, document));
        }
    }

    /// The documents currently stored in `index`.
    pub fn documents(&self, index: &str) -> Vec<Value> {
        self.indices
            .lock()
            .expect("lock poisoned")
            .get(index)
            .map(|documents| documents.iter().map(|(_, document)| document.clone()).collect())
            .unwrap_or_default()
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    /// Make `call` fail with `EngineRequestFailed`.
    pub fn fail_on(&self, call: EngineCall) {
        self.failures.lock().expect("lock poisoned").push(call);
    }

    fn record(&self, operation: &str, call: EngineCall) -> Result<(), EngineError> {
        let failing = self
            .failures
            .lock()
            .expect("lock poisoned")
            .contains(&call);
        self.calls.lock().expect("lock poisoned").push(call);
        if failing {
            Err(EngineError::request_failed(
                operation,
                Some(500),
                "injected failure",
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SearchClient for MockSearchEngine {
    async fn delete_index(&self, index: &str) -> Result<(), EngineError> {
        self.record("delete_index", EngineCall::DeleteIndex(index.to_string()))?;
        self.indices.lock().expect("lock poisoned").remove(index);
        Ok(())
    }

    async fn create_index(&self, index: &str) -> Result<(), EngineError> {
        self.record("create_index", EngineCall::CreateIndex(index.to_string()))?;
        let mut indices = self.indices.lock().expect("lock poisoned");
        if indices.contains_key(index) {
            return Err(EngineError::request_failed(
                "create_index",
                Some(400),
                format!("index [{index}] already exists"),
            ));
        }
        indices.insert(index.to_string(), Vec::new());
        Ok(())
    }

    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, EngineError> {
        self.record("search", EngineCall::Search(request.clone()))?;
        let indices = self.indices.lock().expect("lock poisoned");
        let documents = indices.get(&request.index).ok_or_else(|| {
            EngineError::request_failed(
                "search",
                Some(404),
                format!("no such index [{}]", request.index),
            )
        })?;
        let size = request.size.map(|size| size as usize).unwrap_or(10);

        let hits = documents
            .iter()
            .take(size)
            .map(|(id, document)| Hit {
                id: Some(id.clone()),
                source: filter_source(document, &request.source),
            })
            .collect();
        Ok(SearchResponse { hits: Hits { hits } })
    }

    async fn bulk(&self, entries: &[BulkEntry]) -> Result<BulkResponse, EngineError> {
        self.record("bulk", EngineCall::Bulk(entries.len()))?;
        if entries.is_empty() {
            return Err(EngineError::request_failed(
                "bulk",
                Some(400),
                "Validation Failed: 1: no requests added;",
            ));
        }
        let body = bulk_body(entries)?;
        let mut indices = self.indices.lock().expect("lock poisoned");

        let mut items = Vec::with_capacity(entries.len());
        for (entry, document) in entries.iter().zip(body.into_iter().skip(1).step_by(2)) {
            indices
                .entry(entry.action.index.clone())
                .or_default()
                .push((entry.action.id.to_string(), document));
            items.push(BulkItem {
                index: BulkItemStatus {
                    id: Some(Value::String(entry.action.id.to_string())),
                    status: 201,
                    error: None,
                },
            });
        }
        Ok(BulkResponse {
            errors: false,
            items,
        })
    }
}

/// Keep only the fields named by `paths`. Arrays are filtered element by element.
pub fn filter_source(document: &Value, paths: &[FieldPath]) -> Value {
    let mut filtered = Value::Object(Object::new());
    for path in paths {
        let segments: Vec<&str> = path.segments().collect();
        merge_path(document, &segments, &mut filtered);
    }
    filtered
}

fn merge_path(source: &Value, segments: &[&str], target: &mut Value) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    match source {
        Value::Object(source) => {
            let Some(value) = source.get(*first) else {
                return;
            };
            let Value::Object(target) = target else {
                return;
            };
            if rest.is_empty() {
                target.insert(first.to_string(), value.clone());
                return;
            }
            let entry = target.entry(first.to_string()).or_insert_with(|| match value {
                Value::Array(values) => {
                    Value::Array(vec![Value::Object(Object::new()); values.len()])
                }
                _ => Value::Object(Object::new()),
            });
            merge_path(value, rest, entry);
        }
        Value::Array(values) => {
            if let Value::Array(targets) = target {
                for (value, target) in values.iter().zip(targets.iter_mut()) {
                    merge_path(value, segments, target);
                }
            }
        }
        _ => {}
    }
}

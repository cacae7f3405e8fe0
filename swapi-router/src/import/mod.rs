//! Loads a raw dataset into the search index.
//!
//! The target index is dropped and recreated on every run: there is no incremental mode.

mod transform;

use std::sync::Arc;

pub use transform::transform;

use crate::error::ImportError;
use crate::model::RawPerson;
use crate::search::ActionMetadata;
use crate::search::BulkEntry;
use crate::search::SearchClient;

/// The outcome of a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub index: String,
    pub documents: usize,
}

/// Transforms every record and pairs it with its action metadata.
///
/// Identifiers are positions in `people`: dense and unique within one run, but they follow the
/// input order and are not stable across re-imports of a reordered dataset.
pub fn bulk_entries(
    index: &str,
    document_type: &str,
    people: Vec<RawPerson>,
) -> Result<Vec<BulkEntry>, ImportError> {
    people
        .into_iter()
        .enumerate()
        .map(|(position, raw)| {
            Ok(BulkEntry {
                action: ActionMetadata {
                    index: index.to_string(),
                    document_type: document_type.to_string(),
                    id: position,
                },
                document: transform(raw, position)?,
            })
        })
        .collect()
}

/// Resets an index and bulk-loads a dataset into it.
pub struct ImportPipeline {
    client: Arc<dyn SearchClient>,
    index: String,
    document_type: String,
}

impl ImportPipeline {
    pub fn new(
        client: Arc<dyn SearchClient>,
        index: impl Into<String>,
        document_type: impl Into<String>,
    ) -> Self {
        Self {
            client,
            index: index.into(),
            document_type: document_type.into(),
        }
    }

    /// Runs the import. Each step starts only once the previous one succeeded; a failure leaves
    /// the index as the completed steps left it.
    pub async fn run(&self, people: Vec<RawPerson>) -> Result<ImportSummary, ImportError> {
        let entries = bulk_entries(&self.index, &self.document_type, people)?;
        tracing::info!(index = %self.index, documents = entries.len(), "dataset transformed");

        self.client.delete_index(&self.index).await?;
        tracing::info!(index = %self.index, "index deleted");

        self.client.create_index(&self.index).await?;
        tracing::info!(index = %self.index, "index created");

        // the bulk endpoint rejects an empty body
        let documents = if entries.is_empty() {
            0
        } else {
            self.client.bulk(&entries).await?.into_result()?
        };
        tracing::info!(index = %self.index, documents, "documents written");

        Ok(ImportSummary {
            index: self.index.clone(),
            documents,
        })
    }
}

//! Resolution of the `allPeople` root field.

use crate::configuration::Search;
use crate::error::QueryError;
use crate::model::Person;
use crate::projection::field_paths;
use crate::search::SearchClient;
use crate::search::SearchRequest;
use crate::search::fetch_documents;
use crate::spec::SelectionNode;

/// The part of the operation a resolver needs: the field it resolves and the operation's
/// nodes for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveInfo {
    pub field_name: String,
    pub field_nodes: Vec<SelectionNode>,
}

/// Searches the index for people, fetching only the fields selected under `info.field_name`.
///
/// The records are returned in the order the engine returned them.
pub async fn resolve_all_people(
    client: &dyn SearchClient,
    search: &Search,
    info: &ResolveInfo,
) -> Result<Vec<Person>, QueryError> {
    let node = info
        .field_nodes
        .iter()
        .find(|node| node.name() == info.field_name)
        .ok_or_else(|| QueryError::ResolverFieldNotFound {
            field: info.field_name.clone(),
        })?;
    let selections = node
        .children()
        .ok_or_else(|| QueryError::MalformedSelection {
            reason: format!("'{}' has no selection set", info.field_name),
        })?;

    let source = field_paths(selections, None)?;
    let request = SearchRequest {
        index: search.index.clone(),
        document_type: search.document_type.clone(),
        source,
        size: Some(search.max_hits),
    };
    Ok(fetch_documents(client, request).await?)
}

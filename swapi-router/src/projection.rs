//! Compiles a selection tree into the source-field paths used to filter engine responses.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::error::QueryError;
use crate::spec::SelectionNode;

const PATH_SEPARATOR: char = '.';

/// A dotted location of a (possibly nested) field inside a source document, e.g.
/// `species.homeworld.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    fn child(parent: Option<&FieldPath>, name: &str) -> FieldPath {
        match parent {
            Some(FieldPath(parent)) => FieldPath(format!("{parent}{PATH_SEPARATOR}{name}")),
            None => FieldPath(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The field names along the path, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(PATH_SEPARATOR)
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        FieldPath(path.to_string())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Returns one path per leaf reachable from `selections`, depth first in declaration order.
///
/// Paths are neither deduplicated nor sorted. A branch without children contributes nothing.
pub fn field_paths(
    selections: &[SelectionNode],
    parent: Option<&FieldPath>,
) -> Result<Vec<FieldPath>, QueryError> {
    let mut paths = Vec::new();
    project(selections, parent, &mut paths)?;
    Ok(paths)
}

fn project(
    selections: &[SelectionNode],
    parent: Option<&FieldPath>,
    paths: &mut Vec<FieldPath>,
) -> Result<(), QueryError> {
    for selection in selections {
        let name = selection.name();
        if name.is_empty() {
            return Err(QueryError::MalformedSelection {
                reason: match parent {
                    Some(parent) => format!("unnamed field under '{parent}'"),
                    None => "unnamed root field".to_string(),
                },
            });
        }

        let path = FieldPath::child(parent, name);
        match selection {
            SelectionNode::Leaf { .. } => paths.push(path),
            SelectionNode::Branch { children, .. } => project(children, Some(&path), paths)?,
        }
    }
    Ok(())
}

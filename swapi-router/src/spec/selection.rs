use apollo_compiler::ExecutableDocument;
use apollo_compiler::ast;
use apollo_compiler::executable;
use apollo_compiler::executable::DirectiveList;
use serde::Deserialize;
use serde::Serialize;

use crate::json_ext::Object;

/// One field of a query's requested shape.
///
/// `name` is the underlying field name, which locates the data in the source document. An
/// alias only changes the key the value is returned under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionNode {
    /// A field without a sub-selection.
    Leaf { name: String, alias: Option<String> },
    /// A field with its own selection set, in declaration order.
    Branch {
        name: String,
        alias: Option<String>,
        children: Vec<SelectionNode>,
    },
}

impl SelectionNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        SelectionNode::Leaf {
            name: name.into(),
            alias: None,
        }
    }

    pub fn branch(
        name: impl Into<String>,
        children: impl IntoIterator<Item = SelectionNode>,
    ) -> Self {
        SelectionNode::Branch {
            name: name.into(),
            alias: None,
            children: children.into_iter().collect(),
        }
    }

    /// Returns the node with its value returned under `alias`.
    pub fn aliased(mut self, new_alias: impl Into<String>) -> Self {
        match &mut self {
            SelectionNode::Leaf { alias, .. } | SelectionNode::Branch { alias, .. } => {
                *alias = Some(new_alias.into())
            }
        }
        self
    }

    pub fn name(&self) -> &str {
        match self {
            SelectionNode::Leaf { name, .. } | SelectionNode::Branch { name, .. } => name,
        }
    }

    /// The key the field's value is returned under: the alias if there is one, else the name.
    pub fn response_key(&self) -> &str {
        match self {
            SelectionNode::Leaf { name, alias } | SelectionNode::Branch { name, alias, .. } => {
                alias.as_deref().unwrap_or(name)
            }
        }
    }

    /// The child selection set, `None` for a leaf.
    pub fn children(&self) -> Option<&[SelectionNode]> {
        match self {
            SelectionNode::Leaf { .. } => None,
            SelectionNode::Branch { children, .. } => Some(children),
        }
    }

    /// Lower an executable selection set into selection nodes.
    ///
    /// Fragment spreads and inline fragments are flattened into the enclosing selection, and
    /// fields statically excluded by `@skip`/`@include` are dropped.
    pub(crate) fn from_hir(
        selection_set: &executable::SelectionSet,
        document: &ExecutableDocument,
        variables: &Object,
    ) -> Vec<SelectionNode> {
        let mut nodes = Vec::new();
        flatten_fields(selection_set, document, variables, &mut |field: &executable::Field| {
            nodes.push(SelectionNode::from_field(field, document, variables))
        });
        nodes
    }

    /// Lower the root selection set of an operation.
    ///
    /// Root fields sharing a response key are resolved once, so their selection sets are
    /// combined into the first of them.
    pub(crate) fn root_fields(
        selection_set: &executable::SelectionSet,
        document: &ExecutableDocument,
        variables: &Object,
    ) -> Vec<SelectionNode> {
        let mut fields: Vec<SelectionNode> = Vec::new();
        for node in SelectionNode::from_hir(selection_set, document, variables) {
            match fields
                .iter_mut()
                .find(|field| field.response_key() == node.response_key())
            {
                Some(field) => field.append_children(node),
                None => fields.push(node),
            }
        }
        fields
    }

    // validation guarantees fields sharing a response key share a name and shape
    fn append_children(&mut self, other: SelectionNode) {
        if let (
            SelectionNode::Branch { children, .. },
            SelectionNode::Branch {
                children: other, ..
            },
        ) = (self, other)
        {
            children.extend(other);
        }
    }

    fn from_field(
        field: &executable::Field,
        document: &ExecutableDocument,
        variables: &Object,
    ) -> Self {
        let alias = field.alias.as_ref().map(|alias| alias.to_string());
        let name = field.name.to_string();
        if field.selection_set.selections.is_empty() {
            SelectionNode::Leaf { name, alias }
        } else {
            SelectionNode::Branch {
                name,
                alias,
                children: SelectionNode::from_hir(&field.selection_set, document, variables),
            }
        }
    }
}

fn flatten_fields<F>(
    selection_set: &executable::SelectionSet,
    document: &ExecutableDocument,
    variables: &Object,
    visit: &mut F,
) where
    F: FnMut(&executable::Field),
{
    for selection in &selection_set.selections {
        match selection {
            executable::Selection::Field(field) => {
                if !is_excluded(&field.directives, variables) {
                    visit(&**field);
                }
            }
            executable::Selection::InlineFragment(inline_fragment) => {
                if !is_excluded(&inline_fragment.directives, variables) {
                    flatten_fields(&inline_fragment.selection_set, document, variables, visit);
                }
            }
            executable::Selection::FragmentSpread(fragment_spread) => {
                if is_excluded(&fragment_spread.directives, variables) {
                    continue;
                }
                // validation guarantees the fragment exists and is acyclic
                if let Some(fragment) = document.fragments.get(&fragment_spread.fragment_name) {
                    flatten_fields(&fragment.selection_set, document, variables, visit);
                }
            }
        }
    }
}

fn is_excluded(directives: &DirectiveList, variables: &Object) -> bool {
    let condition = |directive: &str| {
        let argument = directives.get(directive)?.specified_argument_by_name("if")?;
        match &**argument {
            ast::Value::Boolean(value) => Some(*value),
            ast::Value::Variable(name) => variables.get(name.as_str())?.as_bool(),
            _ => None,
        }
    };
    condition("skip") == Some(true) || condition("include") == Some(false)
}

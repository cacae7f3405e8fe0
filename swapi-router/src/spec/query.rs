//! Query parsing and root field extraction.

use apollo_compiler::ExecutableDocument;
use apollo_compiler::ast;
use apollo_compiler::executable::Operation;

use crate::graphql::Request;
use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::spec::Schema;
use crate::spec::SelectionNode;
use crate::spec::SpecError;

/// A parsed and validated operation, reduced to its root fields.
#[derive(Debug, Clone)]
pub(crate) struct Query {
    pub(crate) operation_name: Option<String>,
    /// One node per response key.
    pub(crate) root_fields: Vec<SelectionNode>,
}

impl Query {
    pub(crate) fn parse(request: &Request, schema: &Schema) -> Result<Self, SpecError> {
        let source = request.query.as_deref().ok_or(SpecError::MissingQuery)?;

        let document = ExecutableDocument::parse(&schema.definitions, source, "query.graphql")
            .map_err(|invalid| SpecError::ParsingError(invalid.errors.to_string()))?
            .validate(&schema.definitions)
            .map_err(|invalid| SpecError::ValidationError(invalid.errors.to_string()))?;

        let operation = document
            .operations
            .get(request.operation_name.as_deref())
            .map_err(|_| {
                SpecError::UnknownOperation(request.operation_name.clone().unwrap_or_default())
            })?;

        let variables = with_default_values(operation, &request.variables);
        let root_fields =
            SelectionNode::root_fields(&operation.selection_set, &document, &variables);
        tracing::trace!(?root_fields, "parsed operation");

        Ok(Query {
            operation_name: operation.name.as_ref().map(|name| name.to_string()),
            root_fields,
        })
    }
}

/// The request variables, completed with the default value of every declared variable the
/// request does not provide.
fn with_default_values(operation: &Operation, variables: &Object) -> Object {
    let mut variables = variables.clone();
    for definition in &operation.variables {
        if variables.contains_key(definition.name.as_str()) {
            continue;
        }
        if let Some(value) = definition.default_value.as_deref().and_then(parse_value) {
            variables.insert(definition.name.to_string(), value);
        }
    }
    variables
}

fn parse_value(value: &ast::Value) -> Option<Value> {
    match value {
        ast::Value::Variable(_) => None,
        ast::Value::Null => Some(Value::Null),
        ast::Value::Boolean(b) => Some(Value::Bool(*b)),
        ast::Value::String(s) => Some(s.as_str().into()),
        ast::Value::Enum(e) => Some(e.as_str().into()),
        ast::Value::Int(i) => {
            let s = i.as_str();
            s.parse::<i64>()
                .ok()
                .map(Into::into)
                .or_else(|| s.parse::<u64>().ok().map(Into::into))
        }
        ast::Value::Float(f) => f.try_to_f64().ok().map(Into::into),
        ast::Value::List(l) => l
            .iter()
            .map(|v| parse_value(v))
            .collect::<Option<_>>()
            .map(Value::Array),
        ast::Value::Object(o) => o
            .iter()
            .map(|(name, v)| parse_value(v).map(|v| (name.to_string(), v)))
            .collect::<Option<_>>()
            .map(Value::Object),
    }
}

//! Executes GraphQL requests against the search index.

use apollo_compiler::ast;

use crate::configuration::Search;
use crate::error::ErrorExtension;
use crate::error::QueryError;
use crate::graphql;
use crate::graphql::Request;
use crate::graphql::Response;
use crate::json_ext::Object;
use crate::json_ext::Path;
use crate::json_ext::PathElement;
use crate::json_ext::Value;
use crate::resolver::ResolveInfo;
use crate::resolver::resolve_all_people;
use crate::search::SearchClient;
use crate::spec::Query;
use crate::spec::Schema;
use crate::spec::SelectionNode;
use crate::spec::TYPENAME;

const QUERY_TYPE: &str = "Query";
const ALL_PEOPLE: &str = "allPeople";

/// Parses, validates and executes `request`.
///
/// Requests that cannot be parsed or validated get a response without `data`. Root fields are
/// resolved one after the other; a failing root field is set to `null` and reported in
/// `errors` without affecting the others.
pub async fn execute(
    request: &Request,
    schema: &Schema,
    client: &dyn SearchClient,
    search: &Search,
) -> Response {
    let query = match Query::parse(request, schema) {
        Ok(query) => query,
        Err(err) => {
            tracing::debug!(error = %err, "invalid request");
            return Response::from_errors(vec![err.to_graphql_error(None)]);
        }
    };
    tracing::debug!(operation_name = ?query.operation_name, "executing operation");

    let mut parameters = FormatParameters {
        schema,
        errors: Vec::new(),
    };
    let mut data = Object::new();
    let mut data_is_valid = true;
    let mut path = Path::default();
    for root in &query.root_fields {
        let value = match root.name() {
            TYPENAME => Ok(Value::String(QUERY_TYPE.to_string())),
            ALL_PEOPLE => {
                let info = ResolveInfo {
                    field_name: ALL_PEOPLE.to_string(),
                    field_nodes: vec![root.clone()],
                };
                resolve_all_people(client, search, &info)
                    .await
                    .and_then(|people| {
                        serde_json::to_value(people).map_err(|err| QueryError::MalformedSelection {
                            reason: err.to_string(),
                        })
                    })
            }
            name => Err(QueryError::ResolverFieldNotFound {
                field: name.to_string(),
            }),
        };

        path.0.push(PathElement::Key(root.response_key().to_string()));
        let value = match value {
            Ok(value) => parameters.format_field(value, root, QUERY_TYPE, &mut path),
            Err(err) => {
                tracing::warn!(%path, error = %err, "root field failed");
                parameters.errors.push(err.to_graphql_error(Some(path.clone())));
                let non_null = schema
                    .field_type(QUERY_TYPE, root.name())
                    .is_some_and(ast::Type::is_non_null);
                if non_null {
                    Err(InvalidValue)
                } else {
                    Ok(Value::Null)
                }
            }
        };
        path.0.pop();

        match value {
            Ok(value) => {
                data.insert(root.response_key().to_string(), value);
            }
            Err(InvalidValue) => data_is_valid = false,
        }
    }

    Response {
        data: Some(if data_is_valid {
            Value::Object(data)
        } else {
            Value::Null
        }),
        errors: parameters.errors,
    }
}

/// A `null` where the schema does not allow one: the nearest nullable parent becomes `null`.
struct InvalidValue;

/// Shapes source values as the selection asks for them: every selected field is present
/// under its response key, `null` when the source document does not have it, and
/// `__typename` is filled in.
struct FormatParameters<'a> {
    schema: &'a Schema,
    errors: Vec<graphql::Error>,
}

impl FormatParameters<'_> {
    fn format_field(
        &mut self,
        value: Value,
        node: &SelectionNode,
        parent_type: &str,
        path: &mut Path,
    ) -> Result<Value, InvalidValue> {
        let schema = self.schema;
        let Some(field_type) = schema.field_type(parent_type, node.name()) else {
            return Ok(value);
        };
        let output = self.format_value(field_type, value, node.children(), path);
        if output.is_null() && field_type.is_non_null() {
            self.cannot_return_null(
                format!(
                    "Cannot return null for non-nullable field {parent_type}.{}",
                    node.name()
                ),
                path,
            );
            return Err(InvalidValue);
        }
        Ok(output)
    }

    // `field_type` being non-null is checked by the caller
    fn format_value(
        &mut self,
        field_type: &ast::Type,
        input: Value,
        selections: Option<&[SelectionNode]>,
        path: &mut Path,
    ) -> Value {
        match (field_type, input) {
            (ast::Type::List(item_type) | ast::Type::NonNullList(item_type), Value::Array(input)) => {
                let mut output = Vec::with_capacity(input.len());
                for (index, element) in input.into_iter().enumerate() {
                    path.0.push(PathElement::Index(index));
                    let element = self.format_value(item_type, element, selections, path);
                    let invalid = element.is_null() && item_type.is_non_null();
                    if invalid {
                        self.cannot_return_null(
                            format!(
                                "Cannot return null for non-nullable array element of type {} at index {index}",
                                item_type.inner_named_type()
                            ),
                            path,
                        );
                    }
                    path.0.pop();
                    if invalid {
                        return Value::Null;
                    }
                    output.push(element);
                }
                Value::Array(output)
            }
            (ast::Type::List(_) | ast::Type::NonNullList(_), _) => Value::Null,
            (ast::Type::Named(type_name) | ast::Type::NonNullNamed(type_name), input) => {
                match (selections, input) {
                    (None, input) => input,
                    (Some(selections), Value::Object(source)) => {
                        match self.format_selection_set(selections, type_name, &source, path) {
                            Ok(output) => Value::Object(output),
                            Err(InvalidValue) => Value::Null,
                        }
                    }
                    (Some(_), _) => Value::Null,
                }
            }
        }
    }

    fn format_selection_set(
        &mut self,
        selections: &[SelectionNode],
        type_name: &str,
        source: &Object,
        path: &mut Path,
    ) -> Result<Object, InvalidValue> {
        let mut output = Object::new();
        for selection in selections {
            let response_key = selection.response_key();
            path.0.push(PathElement::Key(response_key.to_string()));
            let field = if selection.name() == TYPENAME {
                Ok(Value::String(type_name.to_string()))
            } else {
                let value = source.get(selection.name()).cloned().unwrap_or(Value::Null);
                self.format_field(value, selection, type_name, path)
            };
            path.0.pop();

            let field = field?;
            match output.get_mut(response_key) {
                Some(existing) => merge(existing, field),
                None => {
                    output.insert(response_key.to_string(), field);
                }
            }
        }
        Ok(output)
    }

    fn cannot_return_null(&mut self, message: String, path: &Path) {
        tracing::debug!(%path, "{message}");
        self.errors.push(
            graphql::Error::builder()
                .message(message)
                .path(path.clone())
                .build(),
        );
    }
}

/// Merges the shaped values of a field selected more than once.
fn merge(existing: &mut Value, other: Value) {
    match (existing, other) {
        (Value::Object(existing), Value::Object(other)) => {
            for (key, value) in other {
                match existing.get_mut(&key) {
                    Some(current) => merge(current, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(existing), Value::Array(other)) => {
            for (current, value) in existing.iter_mut().zip(other) {
                merge(current, value);
            }
        }
        _ => {}
    }
}

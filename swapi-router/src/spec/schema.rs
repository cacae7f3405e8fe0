//! GraphQL schema.

use std::sync::Arc;

use apollo_compiler::ast;
use apollo_compiler::validation::Valid;

use crate::spec::SpecError;

const SWAPI_SDL: &str = include_str!("swapi.graphql");

/// A GraphQL schema.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) definitions: Arc<Valid<apollo_compiler::Schema>>,
}

impl Schema {
    /// Parse and validate a schema from SDL.
    pub fn parse(raw_sdl: &str) -> Result<Self, SpecError> {
        let definitions = apollo_compiler::Schema::parse_and_validate(raw_sdl, "schema.graphql")
            .map_err(|invalid| SpecError::ValidationError(invalid.errors.to_string()))?;
        tracing::debug!(types = definitions.types.len(), "parsed schema");

        Ok(Schema {
            definitions: Arc::new(definitions),
        })
    }

    /// The schema served by the router: `Query.allPeople` and the types it reaches.
    pub fn swapi() -> Result<Self, SpecError> {
        Self::parse(SWAPI_SDL)
    }

    /// The declared type of `parent_type.field_name`, with its list and non-null wrappers.
    pub(crate) fn field_type(&self, parent_type: &str, field_name: &str) -> Option<&ast::Type> {
        self.definitions
            .type_field(parent_type, field_name)
            .ok()
            .map(|field| &field.ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swapi_schema_is_valid() {
        let schema = Schema::swapi().unwrap();
        let person = schema.definitions.get_object("Person").unwrap();
        for field in [
            "id",
            "created",
            "name",
            "birthYear",
            "eyeColor",
            "hairColor",
            "height",
            "mass",
            "homeworld",
            "species",
            "films",
            "vehicles",
        ] {
            assert!(person.fields.contains_key(field), "missing Person.{field}");
        }
        let query = schema.definitions.get_object("Query").unwrap();
        assert!(query.fields.contains_key("allPeople"));
    }

    #[test]
    fn field_types() {
        let schema = Schema::swapi().unwrap();
        let field_type = |parent_type, field_name| {
            schema
                .field_type(parent_type, field_name)
                .map(ToString::to_string)
        };
        assert_eq!(field_type("Query", "allPeople").as_deref(), Some("[Person]"));
        assert_eq!(field_type("Person", "films").as_deref(), Some("[Film]"));
        assert_eq!(field_type("Species", "homeworld").as_deref(), Some("Planet"));
        assert_eq!(field_type("Planet", "name").as_deref(), Some("String!"));
        assert_eq!(field_type("Person", "starships"), None);
    }

    #[test]
    fn invalid_sdl_is_rejected() {
        let error = Schema::parse("type Query { allPeople: [Unknown] }").unwrap_err();
        assert!(matches!(error, SpecError::ValidationError(_)));
    }
}

//! Star Wars records as stored in the index, and as found in the raw dataset.
//!
//! Every field is optional: a search hit only carries the fields that were projected, and it
//! deserializes into the same types as a fully populated document. Fields the schema does not
//! name are kept verbatim in `extra`.

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Number;

use crate::error::ImportError;
use crate::json_ext::Object;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planet {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Object,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub release_date: Option<String>,
    #[serde(flatten)]
    pub extra: Object,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Species {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub designation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub classification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub average_height: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub average_lifespan: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub homeworld: Option<Planet>,
    #[serde(flatten)]
    pub extra: Object,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub consumables: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub crew: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub manufacturers: Option<Vec<Option<String>>>,
    #[serde(flatten)]
    pub extra: Object,
}

/// A person as stored in (and returned from) the index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub birth_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub eye_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hair_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub height: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mass: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub homeworld: Option<Planet>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub species: Option<Species>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub films: Option<Vec<Film>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub vehicles: Option<Vec<Vehicle>>,
    #[serde(flatten)]
    pub extra: Object,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilmConnection {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub films: Option<Vec<Film>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleConnection {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub vehicles: Option<Vec<Vehicle>>,
}

/// A person as found in the raw dataset: films and vehicles sit inside connection wrappers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPerson {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub birth_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub eye_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hair_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub height: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mass: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub homeworld: Option<Planet>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub species: Option<Species>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub film_connection: Option<FilmConnection>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub vehicle_connection: Option<VehicleConnection>,
    #[serde(flatten)]
    pub extra: Object,
}

/// The raw dataset file: `{ "data": { "allPeople": { "people": [...] } } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    data: DatasetData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetData {
    all_people: PeopleConnection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct PeopleConnection {
    people: Vec<RawPerson>,
}

impl Dataset {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ImportError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn people(&self) -> &[RawPerson] {
        &self.data.all_people.people
    }

    pub fn into_people(self) -> Vec<RawPerson> {
        self.data.all_people.people
    }
}

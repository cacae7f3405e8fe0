use crate::error::ImportError;
use crate::model::Person;
use crate::model::RawPerson;

const FILM_CONNECTION: &str = "filmConnection";
const VEHICLE_CONNECTION: &str = "vehicleConnection";
const FILMS: &str = "films";
const VEHICLES: &str = "vehicles";

/// Unwraps the film and vehicle connections of the record found at `position` in the dataset.
///
/// Every other field, nested planets and species included, is carried over as is. Top-level
/// `films` and `vehicles` keys of the raw record are replaced by the unwrapped lists.
pub fn transform(raw: RawPerson, position: usize) -> Result<Person, ImportError> {
    let RawPerson {
        id,
        created,
        name,
        birth_year,
        eye_color,
        hair_color,
        height,
        mass,
        homeworld,
        species,
        film_connection,
        vehicle_connection,
        mut extra,
    } = raw;
    extra.remove(FILMS);
    extra.remove(VEHICLES);

    let films = film_connection
        .and_then(|connection| connection.films)
        .ok_or(ImportError::MissingConnectionField {
            field: FILM_CONNECTION,
            position,
        })?;
    let vehicles = vehicle_connection
        .and_then(|connection| connection.vehicles)
        .ok_or(ImportError::MissingConnectionField {
            field: VEHICLE_CONNECTION,
            position,
        })?;

    Ok(Person {
        id,
        created,
        name,
        birth_year,
        eye_color,
        hair_color,
        height,
        mass,
        homeworld,
        species,
        films: Some(films),
        vehicles: Some(vehicles),
        extra,
    })
}

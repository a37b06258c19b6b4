//! Field rules for reference data (airports, routes, crews, airplanes).

use crate::models::{NewAirplane, NewAirplaneType, NewAirport, NewCrew, NewRoute};
use crate::validation::{ValidationErrors, NON_FIELD_ERRORS};

const BLANK: &str = "This field may not be blank.";

pub fn require_text(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, BLANK);
    }
}

pub fn require_positive(errors: &mut ValidationErrors, field: &str, value: i32) {
    if value <= 0 {
        errors.add(field, "Ensure this value is greater than 0.");
    }
}

pub fn validate_airport(airport: &NewAirport) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    require_text(&mut errors, "name", &airport.name);
    require_text(&mut errors, "closest_big_city", &airport.closest_big_city);
    errors.into_result()
}

pub fn validate_route(route: &NewRoute) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if route.source == route.destination {
        errors.add(NON_FIELD_ERRORS, "Source and destination airports must be different.");
    }
    require_positive(&mut errors, "distance", route.distance);
    errors.into_result()
}

pub fn validate_crew(first_name: &str, last_name: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    require_text(&mut errors, "first_name", first_name);
    require_text(&mut errors, "last_name", last_name);
    errors.into_result()
}

pub fn validate_new_crew(crew: &NewCrew) -> Result<(), ValidationErrors> {
    validate_crew(&crew.first_name, &crew.last_name)
}

pub fn validate_airplane_type(airplane_type: &NewAirplaneType) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    require_text(&mut errors, "name", &airplane_type.name);
    errors.into_result()
}

pub fn validate_airplane(airplane: &NewAirplane) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    require_text(&mut errors, "name", &airplane.name);
    require_positive(&mut errors, "rows", airplane.rows);
    require_positive(&mut errors, "seats_in_row", airplane.seats_in_row);
    errors.into_result()
}

use tracing::{info, warn};

use crate::models::{Flight, NewFlight, RouteFilter};
use crate::scheduling::{validate_schedule, PreviousLeg, ProposedLeg, ScheduleRules};
use crate::validation::{invalid_pk, ValidationErrors};
use crate::{CoreError, CoreResult, Repository};

/// Loads the airplane's latest-arriving flight together with the routes that
/// leave its destination (used in the continuity error message).
async fn previous_leg(repo: &dyn Repository, airplane_id: i64) -> CoreResult<Option<PreviousLeg>> {
    let Some(previous) = repo.latest_flight_for_airplane(airplane_id).await? else {
        return Ok(None);
    };

    let destination_id = previous.route.destination.id;
    let onward_routes = repo
        .list_routes(&RouteFilter {
            source: vec![destination_id],
            destination: Vec::new(),
        })
        .await?
        .iter()
        .map(|route| route.full_route())
        .collect();

    Ok(Some(PreviousLeg {
        destination_airport_id: destination_id,
        arrival_time: previous.arrival_time,
        onward_routes,
    }))
}

/// Validates a new flight against the airplane's previous one and persists it.
pub async fn schedule_flight(
    repo: &dyn Repository,
    rules: &ScheduleRules,
    flight: &NewFlight,
) -> CoreResult<Flight> {
    let route = repo.get_route(flight.route).await?;
    let airplane = repo.get_airplane(flight.airplane).await?;

    let mut errors = ValidationErrors::new();
    if route.is_none() {
        errors.add("route", invalid_pk(flight.route));
    }
    if airplane.is_none() {
        errors.add("airplane", invalid_pk(flight.airplane));
    }
    for crew_id in &flight.crew {
        if repo.get_crew(*crew_id).await?.is_none() {
            errors.add("crew", invalid_pk(*crew_id));
        }
    }
    let (Some(route), Some(airplane)) = (route, airplane) else {
        return Err(CoreError::Validation(errors));
    };
    errors.into_result()?;

    let candidate = ProposedLeg {
        source_airport_id: route.source.id,
        departure_time: flight.departure_time,
        arrival_time: flight.arrival_time,
    };
    let previous = previous_leg(repo, airplane.id).await?;

    if let Err(violation) = validate_schedule(rules, &candidate, previous.as_ref()) {
        warn!(
            "Rejected flight {} for airplane {} departing {}: {}",
            route.full_route(),
            airplane.name,
            flight.departure_time,
            violation
        );
        return Err(CoreError::Validation(violation.into()));
    }

    let created = repo.create_flight(flight).await?;
    info!(
        "Flight {} scheduled: {} on {} departing {}",
        created.id,
        created.route.full_route(),
        created.airplane.name,
        created.departure_time
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewAirplane, NewAirplaneType, NewAirport, NewCrew, NewRoute};
    use crate::repository::{AirplaneRepository, AirportRepository, CrewRepository, RouteRepository};
    use crate::validation::NON_FIELD_ERRORS;
    use crate::MemoryStore;
    use chrono::{DateTime, Utc};

    struct Fixture {
        store: MemoryStore,
        krk_pmi: i64,
        pmi_krk: i64,
        airplane: i64,
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let krk = store
            .create_airport(&NewAirport { name: "KRK".into(), closest_big_city: "Krakow".into() })
            .await
            .unwrap();
        let pmi = store
            .create_airport(&NewAirport { name: "PMI".into(), closest_big_city: "Palma".into() })
            .await
            .unwrap();
        let krk_pmi = store
            .create_route(&NewRoute { source: krk.id, destination: pmi.id, distance: 1000 })
            .await
            .unwrap()
            .id;
        let pmi_krk = store
            .create_route(&NewRoute { source: pmi.id, destination: krk.id, distance: 1000 })
            .await
            .unwrap()
            .id;
        let boeing = store
            .create_airplane_type(&NewAirplaneType { name: "Boeing".into() })
            .await
            .unwrap();
        let airplane = store
            .create_airplane(&NewAirplane {
                name: "BO1234".into(),
                rows: 40,
                seats_in_row: 6,
                airplane_type: boeing.id,
            })
            .await
            .unwrap()
            .id;
        Fixture { store, krk_pmi, pmi_krk, airplane }
    }

    fn new_flight(route: i64, airplane: i64, departure: &str, arrival: &str) -> NewFlight {
        NewFlight {
            route,
            airplane,
            departure_time: at(departure),
            arrival_time: at(arrival),
            crew: Vec::new(),
        }
    }

    fn non_field_message(result: CoreResult<Flight>) -> String {
        match result {
            Err(CoreError::Validation(errors)) => errors.get(NON_FIELD_ERRORS).unwrap()[0].clone(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_second_flight_follows_rest_rules() {
        let f = fixture().await;
        let rules = ScheduleRules::default();

        schedule_flight(
            &f.store,
            &rules,
            &new_flight(f.krk_pmi, f.airplane, "2024-10-25T01:00:00Z", "2024-10-25T02:00:00Z"),
        )
        .await
        .unwrap();

        let too_soon = schedule_flight(
            &f.store,
            &rules,
            &new_flight(f.pmi_krk, f.airplane, "2024-10-25T04:59:59Z", "2024-10-25T07:00:00Z"),
        )
        .await;
        assert!(non_field_message(too_soon).contains("3-hour rest"));

        let too_late = schedule_flight(
            &f.store,
            &rules,
            &new_flight(f.pmi_krk, f.airplane, "2024-10-26T03:00:01Z", "2024-10-26T05:00:00Z"),
        )
        .await;
        assert!(non_field_message(too_late).contains("shouldn't exceed 24 hours"));

        let on_time = schedule_flight(
            &f.store,
            &rules,
            &new_flight(f.pmi_krk, f.airplane, "2024-10-25T05:00:00Z", "2024-10-25T07:00:00Z"),
        )
        .await
        .unwrap();
        assert_eq!(on_time.route.full_route(), "PMI - KRK");
    }

    #[tokio::test]
    async fn test_continuity_lists_onward_routes() {
        let f = fixture().await;
        let rules = ScheduleRules::default();
        schedule_flight(
            &f.store,
            &rules,
            &new_flight(f.krk_pmi, f.airplane, "2024-10-25T01:00:00Z", "2024-10-25T02:00:00Z"),
        )
        .await
        .unwrap();

        let same_route_again = schedule_flight(
            &f.store,
            &rules,
            &new_flight(f.krk_pmi, f.airplane, "2024-10-25T06:00:00Z", "2024-10-25T07:00:00Z"),
        )
        .await;
        assert!(non_field_message(same_route_again)
            .ends_with("Available routes with the correct departure location: PMI - KRK."));
    }

    #[tokio::test]
    async fn test_previous_is_latest_arrival_not_chronological_predecessor() {
        let f = fixture().await;
        let rules = ScheduleRules::default();
        schedule_flight(
            &f.store,
            &rules,
            &new_flight(f.krk_pmi, f.airplane, "2024-10-25T01:00:00Z", "2024-10-25T02:00:00Z"),
        )
        .await
        .unwrap();

        // A flight slotted before the existing one is still compared against it.
        let earlier = schedule_flight(
            &f.store,
            &rules,
            &new_flight(f.pmi_krk, f.airplane, "2024-10-24T20:00:00Z", "2024-10-24T22:00:00Z"),
        )
        .await;
        assert!(non_field_message(earlier).starts_with("Cannot schedule this flight before the previous flight arrives."));
    }

    #[tokio::test]
    async fn test_unknown_references_are_field_errors() {
        let f = fixture().await;
        let crew = f
            .store
            .create_crew(&NewCrew { first_name: "John".into(), last_name: "Doe".into() })
            .await
            .unwrap();

        let mut flight = new_flight(404, f.airplane, "2024-10-25T01:00:00Z", "2024-10-25T02:00:00Z");
        flight.crew = vec![crew.id, 77];

        match schedule_flight(&f.store, &ScheduleRules::default(), &flight).await {
            Err(CoreError::Validation(errors)) => {
                let fields: Vec<&str> = errors.fields().collect();
                assert_eq!(fields, vec!["crew", "route"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_repeated_departure_rejected_by_rules() {
        let f = fixture().await;
        let rules = ScheduleRules::from_hours(0, 24 * 365);
        let flight = new_flight(f.krk_pmi, f.airplane, "2024-10-25T01:00:00Z", "2024-10-25T02:00:00Z");
        schedule_flight(&f.store, &rules, &flight).await.unwrap();

        // Same departure as an existing flight always precedes the latest arrival.
        let clash = new_flight(f.pmi_krk, f.airplane, "2024-10-25T01:00:00Z", "2024-10-25T03:00:00Z");
        let result = schedule_flight(&f.store, &rules, &clash).await;
        assert!(non_field_message(result).starts_with("Cannot schedule this flight before"));
    }
}

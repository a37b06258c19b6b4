use tracing::info;

use crate::models::{
    Airplane, AirplaneType, Airport, Crew, CrewChanges, NewAirplane, NewAirplaneType, NewAirport,
    NewCrew, NewRoute, Route,
};
use crate::reference::{
    require_text, validate_airplane, validate_airplane_type, validate_airport, validate_new_crew,
    validate_route,
};
use crate::validation::{invalid_pk, ValidationErrors};
use crate::{CoreError, CoreResult, Repository};

pub async fn create_airport(repo: &dyn Repository, airport: &NewAirport) -> CoreResult<Airport> {
    validate_airport(airport)?;
    let created = repo.create_airport(airport).await?;
    info!("Airport created: {} ({})", created.name, created.id);
    Ok(created)
}

pub async fn create_route(repo: &dyn Repository, route: &NewRoute) -> CoreResult<Route> {
    let mut errors = ValidationErrors::new();
    if repo.get_airport(route.source).await?.is_none() {
        errors.add("source", invalid_pk(route.source));
    }
    if repo.get_airport(route.destination).await?.is_none() {
        errors.add("destination", invalid_pk(route.destination));
    }
    errors.into_result()?;
    validate_route(route)?;

    let created = repo.create_route(route).await?;
    info!("Route created: {} ({})", created.full_route(), created.id);
    Ok(created)
}

pub async fn create_crew(repo: &dyn Repository, crew: &NewCrew) -> CoreResult<Crew> {
    validate_new_crew(crew)?;
    repo.create_crew(crew).await
}

/// Applies a full or partial update; unset fields keep their value.
pub async fn update_crew(repo: &dyn Repository, id: i64, changes: &CrewChanges) -> CoreResult<Crew> {
    let mut errors = ValidationErrors::new();
    if let Some(first_name) = &changes.first_name {
        require_text(&mut errors, "first_name", first_name);
    }
    if let Some(last_name) = &changes.last_name {
        require_text(&mut errors, "last_name", last_name);
    }
    errors.into_result()?;

    repo.update_crew(id, changes)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("crew {}", id)))
}

pub async fn delete_crew(repo: &dyn Repository, id: i64) -> CoreResult<()> {
    if !repo.delete_crew(id).await? {
        return Err(CoreError::NotFound(format!("crew {}", id)));
    }
    info!("Crew member {} deleted", id);
    Ok(())
}

pub async fn create_airplane_type(
    repo: &dyn Repository,
    airplane_type: &NewAirplaneType,
) -> CoreResult<AirplaneType> {
    validate_airplane_type(airplane_type)?;
    repo.create_airplane_type(airplane_type).await
}

pub async fn create_airplane(repo: &dyn Repository, airplane: &NewAirplane) -> CoreResult<Airplane> {
    if repo.get_airplane_type(airplane.airplane_type).await?.is_none() {
        return Err(CoreError::invalid("airplane_type", invalid_pk(airplane.airplane_type)));
    }
    validate_airplane(airplane)?;

    let created = repo.create_airplane(airplane).await?;
    info!(
        "Airplane created: {} ({}), capacity {}",
        created.name,
        created.id,
        created.capacity()
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[tokio::test]
    async fn test_route_requires_existing_distinct_airports() {
        let store = MemoryStore::new();
        let krk = create_airport(&store, &NewAirport { name: "KRK".into(), closest_big_city: "Krakow".into() })
            .await
            .unwrap();

        let dangling = create_route(&store, &NewRoute { source: krk.id, destination: 99, distance: 10 }).await;
        match dangling {
            Err(CoreError::Validation(errors)) => {
                assert_eq!(
                    errors.get("destination").unwrap()[0],
                    "Invalid pk \"99\" - object does not exist."
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let looped = create_route(&store, &NewRoute { source: krk.id, destination: krk.id, distance: 10 }).await;
        assert!(matches!(looped, Err(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_crew_update_and_delete() {
        let store = MemoryStore::new();
        let crew = create_crew(&store, &NewCrew { first_name: "John".into(), last_name: "Doe".into() })
            .await
            .unwrap();

        let renamed = update_crew(
            &store,
            crew.id,
            &CrewChanges { first_name: None, last_name: Some("Smith".into()) },
        )
        .await
        .unwrap();
        assert_eq!(renamed.full_name(), "John Smith");

        let blank = update_crew(&store, crew.id, &CrewChanges { first_name: Some(" ".into()), last_name: None }).await;
        assert!(matches!(blank, Err(CoreError::Validation(_))));

        delete_crew(&store, crew.id).await.unwrap();
        assert!(matches!(delete_crew(&store, crew.id).await, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_airplane_capacity() {
        let store = MemoryStore::new();
        let boeing = create_airplane_type(&store, &NewAirplaneType { name: "Boeing".into() })
            .await
            .unwrap();
        let airplane = create_airplane(
            &store,
            &NewAirplane { name: "BO1234".into(), rows: 40, seats_in_row: 6, airplane_type: boeing.id },
        )
        .await
        .unwrap();
        assert_eq!(airplane.capacity(), 240);
        assert_eq!(airplane.airplane_type.name, "Boeing");
    }
}

use aeroline_core::models::{
    Airplane, AirplaneType, Airport, Crew, CrewChanges, NewAirplane, NewAirplaneType, NewAirport,
    NewCrew, NewRoute, Route, RouteFilter,
};
use aeroline_core::repository::{AirplaneRepository, AirportRepository, CrewRepository, RouteRepository};
use aeroline_core::CoreResult;
use async_trait::async_trait;

use crate::{db_error, PgStore};

// Internal structs for type-safe querying

#[derive(sqlx::FromRow)]
struct AirportRow {
    id: i64,
    name: String,
    closest_big_city: String,
}

impl From<AirportRow> for Airport {
    fn from(row: AirportRow) -> Self {
        Airport {
            id: row.id,
            name: row.name,
            closest_big_city: row.closest_big_city,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct RouteRow {
    pub route_id: i64,
    pub distance: i32,
    pub source_id: i64,
    pub source_name: String,
    pub source_city: String,
    pub destination_id: i64,
    pub destination_name: String,
    pub destination_city: String,
}

impl From<RouteRow> for Route {
    fn from(row: RouteRow) -> Self {
        Route {
            id: row.route_id,
            source: Airport {
                id: row.source_id,
                name: row.source_name,
                closest_big_city: row.source_city,
            },
            destination: Airport {
                id: row.destination_id,
                name: row.destination_name,
                closest_big_city: row.destination_city,
            },
            distance: row.distance,
        }
    }
}

pub(crate) const ROUTE_SELECT: &str = r#"
    SELECT r.id AS route_id, r.distance,
           sa.id AS source_id, sa.name AS source_name, sa.closest_big_city AS source_city,
           da.id AS destination_id, da.name AS destination_name, da.closest_big_city AS destination_city
    FROM routes r
    JOIN airports sa ON sa.id = r.source_id
    JOIN airports da ON da.id = r.destination_id
"#;

#[derive(sqlx::FromRow)]
struct CrewRow {
    id: i64,
    first_name: String,
    last_name: String,
}

impl From<CrewRow> for Crew {
    fn from(row: CrewRow) -> Self {
        Crew {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AirplaneTypeRow {
    id: i64,
    name: String,
}

impl From<AirplaneTypeRow> for AirplaneType {
    fn from(row: AirplaneTypeRow) -> Self {
        AirplaneType { id: row.id, name: row.name }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct AirplaneRow {
    pub airplane_id: i64,
    pub airplane_name: String,
    pub seat_rows: i32,
    pub seats_in_row: i32,
    pub airplane_type_id: i64,
    pub airplane_type_name: String,
}

impl From<AirplaneRow> for Airplane {
    fn from(row: AirplaneRow) -> Self {
        Airplane {
            id: row.airplane_id,
            name: row.airplane_name,
            rows: row.seat_rows,
            seats_in_row: row.seats_in_row,
            airplane_type: AirplaneType {
                id: row.airplane_type_id,
                name: row.airplane_type_name,
            },
        }
    }
}

const AIRPLANE_SELECT: &str = r#"
    SELECT a.id AS airplane_id, a.name AS airplane_name, a.seat_rows, a.seats_in_row,
           t.id AS airplane_type_id, t.name AS airplane_type_name
    FROM airplanes a
    JOIN airplane_types t ON t.id = a.airplane_type_id
"#;

#[async_trait]
impl AirportRepository for PgStore {
    async fn create_airport(&self, airport: &NewAirport) -> CoreResult<Airport> {
        let row = sqlx::query_as::<_, AirportRow>(
            r#"
            INSERT INTO airports (name, closest_big_city)
            VALUES ($1, $2)
            RETURNING id, name, closest_big_city
            "#,
        )
        .bind(&airport.name)
        .bind(&airport.closest_big_city)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn get_airport(&self, id: i64) -> CoreResult<Option<Airport>> {
        let row = sqlx::query_as::<_, AirportRow>(
            "SELECT id, name, closest_big_city FROM airports WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Airport::from))
    }

    async fn list_airports(&self) -> CoreResult<Vec<Airport>> {
        let rows = sqlx::query_as::<_, AirportRow>(
            "SELECT id, name, closest_big_city FROM airports ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Airport::from).collect())
    }
}

#[async_trait]
impl RouteRepository for PgStore {
    async fn create_route(&self, route: &NewRoute) -> CoreResult<Route> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO routes (source_id, destination_id, distance)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(route.source)
        .bind(route.destination)
        .bind(route.distance)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        let sql = format!("{} WHERE r.id = $1", ROUTE_SELECT);
        let row = sqlx::query_as::<_, RouteRow>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.into())
    }

    async fn get_route(&self, id: i64) -> CoreResult<Option<Route>> {
        let sql = format!("{} WHERE r.id = $1", ROUTE_SELECT);
        let row = sqlx::query_as::<_, RouteRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.map(Route::from))
    }

    async fn list_routes(&self, filter: &RouteFilter) -> CoreResult<Vec<Route>> {
        let sql = format!(
            r#"{}
            WHERE (cardinality($1::BIGINT[]) = 0 OR r.source_id = ANY($1))
              AND (cardinality($2::BIGINT[]) = 0 OR r.destination_id = ANY($2))
            ORDER BY r.id
            "#,
            ROUTE_SELECT
        );
        let rows = sqlx::query_as::<_, RouteRow>(&sql)
            .bind(&filter.source)
            .bind(&filter.destination)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(Route::from).collect())
    }
}

#[async_trait]
impl CrewRepository for PgStore {
    async fn create_crew(&self, crew: &NewCrew) -> CoreResult<Crew> {
        let row = sqlx::query_as::<_, CrewRow>(
            r#"
            INSERT INTO crew (first_name, last_name)
            VALUES ($1, $2)
            RETURNING id, first_name, last_name
            "#,
        )
        .bind(&crew.first_name)
        .bind(&crew.last_name)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn get_crew(&self, id: i64) -> CoreResult<Option<Crew>> {
        let row = sqlx::query_as::<_, CrewRow>("SELECT id, first_name, last_name FROM crew WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.map(Crew::from))
    }

    async fn list_crew(&self) -> CoreResult<Vec<Crew>> {
        let rows = sqlx::query_as::<_, CrewRow>(
            "SELECT id, first_name, last_name FROM crew ORDER BY last_name, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Crew::from).collect())
    }

    async fn update_crew(&self, id: i64, changes: &CrewChanges) -> CoreResult<Option<Crew>> {
        let row = sqlx::query_as::<_, CrewRow>(
            r#"
            UPDATE crew
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name)
            WHERE id = $1
            RETURNING id, first_name, last_name
            "#,
        )
        .bind(id)
        .bind(changes.first_name.as_deref())
        .bind(changes.last_name.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Crew::from))
    }

    async fn delete_crew(&self, id: i64) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM crew WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AirplaneRepository for PgStore {
    async fn create_airplane_type(&self, airplane_type: &NewAirplaneType) -> CoreResult<AirplaneType> {
        let row = sqlx::query_as::<_, AirplaneTypeRow>(
            "INSERT INTO airplane_types (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&airplane_type.name)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn get_airplane_type(&self, id: i64) -> CoreResult<Option<AirplaneType>> {
        let row = sqlx::query_as::<_, AirplaneTypeRow>("SELECT id, name FROM airplane_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.map(AirplaneType::from))
    }

    async fn list_airplane_types(&self) -> CoreResult<Vec<AirplaneType>> {
        let rows = sqlx::query_as::<_, AirplaneTypeRow>("SELECT id, name FROM airplane_types ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(AirplaneType::from).collect())
    }

    async fn create_airplane(&self, airplane: &NewAirplane) -> CoreResult<Airplane> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO airplanes (name, seat_rows, seats_in_row, airplane_type_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&airplane.name)
        .bind(airplane.rows)
        .bind(airplane.seats_in_row)
        .bind(airplane.airplane_type)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        let sql = format!("{} WHERE a.id = $1", AIRPLANE_SELECT);
        let row = sqlx::query_as::<_, AirplaneRow>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.into())
    }

    async fn get_airplane(&self, id: i64) -> CoreResult<Option<Airplane>> {
        let sql = format!("{} WHERE a.id = $1", AIRPLANE_SELECT);
        let row = sqlx::query_as::<_, AirplaneRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.map(Airplane::from))
    }

    async fn list_airplanes(&self) -> CoreResult<Vec<Airplane>> {
        let sql = format!("{} ORDER BY a.name", AIRPLANE_SELECT);
        let rows = sqlx::query_as::<_, AirplaneRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(Airplane::from).collect())
    }
}

use std::collections::HashMap;

use aeroline_core::models::{Crew, Flight, FlightFilter, NewFlight, Seat};
use aeroline_core::repository::FlightRepository;
use aeroline_core::{CoreError, CoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::catalog_repo::{AirplaneRow, RouteRow};
use crate::{db_error, PgStore};

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: i64,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
    tickets_sold: i64,
    #[sqlx(flatten)]
    route: RouteRow,
    #[sqlx(flatten)]
    airplane: AirplaneRow,
}

#[derive(sqlx::FromRow)]
struct FlightCrewRow {
    flight_id: i64,
    id: i64,
    first_name: String,
    last_name: String,
}

#[derive(sqlx::FromRow)]
struct SeatRow {
    seat_row: i32,
    seat: i32,
}

const FLIGHT_SELECT: &str = r#"
    SELECT f.id, f.departure_time, f.arrival_time,
           (SELECT COUNT(*) FROM tickets tk WHERE tk.flight_id = f.id) AS tickets_sold,
           r.id AS route_id, r.distance,
           sa.id AS source_id, sa.name AS source_name, sa.closest_big_city AS source_city,
           da.id AS destination_id, da.name AS destination_name, da.closest_big_city AS destination_city,
           a.id AS airplane_id, a.name AS airplane_name, a.seat_rows, a.seats_in_row,
           t.id AS airplane_type_id, t.name AS airplane_type_name
    FROM flights f
    JOIN routes r ON r.id = f.route_id
    JOIN airports sa ON sa.id = r.source_id
    JOIN airports da ON da.id = r.destination_id
    JOIN airplanes a ON a.id = f.airplane_id
    JOIN airplane_types t ON t.id = a.airplane_type_id
"#;

impl PgStore {
    /// Attaches crew (ordered by last name) to flight rows.
    async fn assemble_flights(&self, rows: Vec<FlightRow>) -> CoreResult<Vec<Flight>> {
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let crew_rows = sqlx::query_as::<_, FlightCrewRow>(
            r#"
            SELECT fc.flight_id, c.id, c.first_name, c.last_name
            FROM flight_crew fc
            JOIN crew c ON c.id = fc.crew_id
            WHERE fc.flight_id = ANY($1)
            ORDER BY c.last_name, c.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut crew_by_flight: HashMap<i64, Vec<Crew>> = HashMap::new();
        for row in crew_rows {
            crew_by_flight.entry(row.flight_id).or_default().push(Crew {
                id: row.id,
                first_name: row.first_name,
                last_name: row.last_name,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| Flight {
                id: row.id,
                crew: crew_by_flight.remove(&row.id).unwrap_or_default(),
                route: row.route.into(),
                airplane: row.airplane.into(),
                departure_time: row.departure_time,
                arrival_time: row.arrival_time,
                tickets_sold: row.tickets_sold,
            })
            .collect())
    }

    /// Loads flights by id, keyed by id.
    pub(crate) async fn flights_by_id(&self, ids: &[i64]) -> CoreResult<HashMap<i64, Flight>> {
        let sql = format!("{} WHERE f.id = ANY($1)", FLIGHT_SELECT);
        let rows = sqlx::query_as::<_, FlightRow>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(self
            .assemble_flights(rows)
            .await?
            .into_iter()
            .map(|flight| (flight.id, flight))
            .collect())
    }
}

#[async_trait]
impl FlightRepository for PgStore {
    async fn create_flight(&self, flight: &NewFlight) -> CoreResult<Flight> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO flights (route_id, airplane_id, departure_time, arrival_time)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(flight.route)
        .bind(flight.airplane)
        .bind(flight.departure_time)
        .bind(flight.arrival_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        if !flight.crew.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO flight_crew (flight_id, crew_id)
                SELECT $1, UNNEST($2::BIGINT[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id)
            .bind(&flight.crew)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;

        self.get_flight(id)
            .await?
            .ok_or_else(|| CoreError::Internal(format!("flight {} vanished after insert", id)))
    }

    async fn get_flight(&self, id: i64) -> CoreResult<Option<Flight>> {
        Ok(self.flights_by_id(&[id]).await?.remove(&id))
    }

    async fn list_flights(&self, filter: &FlightFilter) -> CoreResult<Vec<Flight>> {
        let sql = format!(
            r#"{}
            WHERE ($1::DATE IS NULL OR (f.departure_time AT TIME ZONE 'UTC')::date = $1)
              AND (cardinality($2::BIGINT[]) = 0 OR r.source_id = ANY($2))
              AND (cardinality($3::BIGINT[]) = 0 OR r.destination_id = ANY($3))
            ORDER BY f.departure_time, f.arrival_time, f.id
            "#,
            FLIGHT_SELECT
        );
        let rows = sqlx::query_as::<_, FlightRow>(&sql)
            .bind(filter.date)
            .bind(&filter.source)
            .bind(&filter.destination)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        self.assemble_flights(rows).await
    }

    async fn latest_flight_for_airplane(&self, airplane_id: i64) -> CoreResult<Option<Flight>> {
        let sql = format!(
            "{} WHERE f.airplane_id = $1 ORDER BY f.arrival_time DESC, f.id DESC LIMIT 1",
            FLIGHT_SELECT
        );
        let rows = sqlx::query_as::<_, FlightRow>(&sql)
            .bind(airplane_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(self.assemble_flights(rows).await?.into_iter().next())
    }

    async fn taken_seats(&self, flight_id: i64) -> CoreResult<Vec<Seat>> {
        let rows = sqlx::query_as::<_, SeatRow>(
            "SELECT seat_row, seat FROM tickets WHERE flight_id = $1 ORDER BY seat_row, seat",
        )
        .bind(flight_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| Seat { row: row.seat_row, seat: row.seat })
            .collect())
    }
}

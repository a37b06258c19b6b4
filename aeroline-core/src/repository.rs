use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    Airplane, AirplaneType, Airport, Crew, CrewChanges, Flight, FlightFilter, NewAirplane,
    NewAirplaneType, NewAirport, NewCrew, NewFlight, NewRoute, NewTicket, NewUser, Order, Route,
    RouteFilter, Seat, User, UserChanges,
};
use crate::CoreResult;

/// Repository trait for airport data access
#[async_trait]
pub trait AirportRepository: Send + Sync {
    async fn create_airport(&self, airport: &NewAirport) -> CoreResult<Airport>;

    async fn get_airport(&self, id: i64) -> CoreResult<Option<Airport>>;

    async fn list_airports(&self) -> CoreResult<Vec<Airport>>;
}

/// Repository trait for route data access
#[async_trait]
pub trait RouteRepository: Send + Sync {
    async fn create_route(&self, route: &NewRoute) -> CoreResult<Route>;

    async fn get_route(&self, id: i64) -> CoreResult<Option<Route>>;

    async fn list_routes(&self, filter: &RouteFilter) -> CoreResult<Vec<Route>>;
}

/// Repository trait for crew data access
#[async_trait]
pub trait CrewRepository: Send + Sync {
    async fn create_crew(&self, crew: &NewCrew) -> CoreResult<Crew>;

    async fn get_crew(&self, id: i64) -> CoreResult<Option<Crew>>;

    async fn list_crew(&self) -> CoreResult<Vec<Crew>>;

    /// Applies the set fields; `None` when the crew member does not exist.
    async fn update_crew(&self, id: i64, changes: &CrewChanges) -> CoreResult<Option<Crew>>;

    /// `false` when there was nothing to delete.
    async fn delete_crew(&self, id: i64) -> CoreResult<bool>;
}

/// Repository trait for airplanes and their types
#[async_trait]
pub trait AirplaneRepository: Send + Sync {
    async fn create_airplane_type(&self, airplane_type: &NewAirplaneType) -> CoreResult<AirplaneType>;

    async fn get_airplane_type(&self, id: i64) -> CoreResult<Option<AirplaneType>>;

    async fn list_airplane_types(&self) -> CoreResult<Vec<AirplaneType>>;

    async fn create_airplane(&self, airplane: &NewAirplane) -> CoreResult<Airplane>;

    async fn get_airplane(&self, id: i64) -> CoreResult<Option<Airplane>>;

    async fn list_airplanes(&self) -> CoreResult<Vec<Airplane>>;
}

/// Repository trait for flight data access
#[async_trait]
pub trait FlightRepository: Send + Sync {
    /// Inserts the flight and its crew assignments.
    /// (airplane, departure_time) is unique and surfaces as `CoreError::Conflict`.
    async fn create_flight(&self, flight: &NewFlight) -> CoreResult<Flight>;

    async fn get_flight(&self, id: i64) -> CoreResult<Option<Flight>>;

    async fn list_flights(&self, filter: &FlightFilter) -> CoreResult<Vec<Flight>>;

    /// The airplane's flight with the latest arrival time, across all of its flights.
    async fn latest_flight_for_airplane(&self, airplane_id: i64) -> CoreResult<Option<Flight>>;

    async fn taken_seats(&self, flight_id: i64) -> CoreResult<Vec<Seat>>;
}

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists the order and every ticket in one transaction.
    /// A taken (flight, row, seat) aborts the whole order with `CoreError::Conflict`.
    async fn create_order(
        &self,
        user_id: i64,
        created_at: DateTime<Utc>,
        tickets: &[NewTicket],
    ) -> CoreResult<Order>;

    /// Only returns orders owned by `user_id`.
    async fn get_order(&self, user_id: i64, id: i64) -> CoreResult<Option<Order>>;

    async fn list_orders(&self, user_id: i64) -> CoreResult<Vec<Order>>;
}

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &NewUser) -> CoreResult<User>;

    async fn get_user(&self, id: i64) -> CoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>>;

    async fn update_user(&self, id: i64, changes: &UserChanges) -> CoreResult<Option<User>>;
}

/// Everything the services need from a store.
pub trait Repository:
    AirportRepository
    + RouteRepository
    + CrewRepository
    + AirplaneRepository
    + FlightRepository
    + OrderRepository
    + UserRepository
{
}

impl<T> Repository for T where
    T: AirportRepository
        + RouteRepository
        + CrewRepository
        + AirplaneRepository
        + FlightRepository
        + OrderRepository
        + UserRepository
{
}

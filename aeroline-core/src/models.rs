use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    pub id: i64,
    pub name: String,
    pub closest_big_city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: i64,
    pub source: Airport,
    pub destination: Airport,
    pub distance: i32,
}

impl Route {
    pub fn full_route(&self) -> String {
        format!("{} - {}", self.source.name, self.destination.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crew {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl Crew {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirplaneType {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airplane {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    pub airplane_type: AirplaneType,
}

impl Airplane {
    pub fn capacity(&self) -> i64 {
        i64::from(self.rows) * i64::from(self.seats_in_row)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub id: i64,
    pub route: Route,
    pub airplane: Airplane,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub crew: Vec<Crew>,
    /// Number of tickets already sold for this flight.
    pub tickets_sold: i64,
}

impl Flight {
    pub fn tickets_available(&self) -> i64 {
        self.airplane.capacity() - self.tickets_sold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Seat {
    pub row: i32,
    pub seat: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub flight: Flight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub password_hash: String,
}

// ============================================================================
// Creation inputs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct NewAirport {
    pub name: String,
    pub closest_big_city: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRoute {
    pub source: i64,
    pub destination: i64,
    pub distance: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCrew {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrewChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAirplaneType {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAirplane {
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    pub airplane_type: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFlight {
    pub route: i64,
    pub airplane: i64,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    #[serde(default)]
    pub crew: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NewTicket {
    pub row: i32,
    pub seat: i32,
    pub flight: i64,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

// ============================================================================
// List filters
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct RouteFilter {
    pub source: Vec<i64>,
    pub destination: Vec<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct FlightFilter {
    /// UTC calendar date of departure.
    pub date: Option<chrono::NaiveDate>,
    pub source: Vec<i64>,
    pub destination: Vec<i64>,
}

fn id_in(ids: &[i64], id: i64) -> bool {
    ids.is_empty() || ids.contains(&id)
}

impl RouteFilter {
    pub fn matches(&self, route: &Route) -> bool {
        id_in(&self.source, route.source.id) && id_in(&self.destination, route.destination.id)
    }
}

impl FlightFilter {
    pub fn matches(&self, flight: &Flight) -> bool {
        self.date.map_or(true, |date| flight.departure_time.date_naive() == date)
            && id_in(&self.source, flight.route.source.id)
            && id_in(&self.destination, flight.route.destination.id)
    }
}

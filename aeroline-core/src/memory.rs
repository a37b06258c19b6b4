//! In-memory store implementing every repository trait.
//!
//! Tables live behind a single `RwLock`, so each repository call sees a
//! consistent snapshot and multi-row writes (an order with its tickets) are
//! applied all-or-nothing. Uniqueness constraints mirror the SQL schema.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::models::{
    Airplane, AirplaneType, Airport, Crew, CrewChanges, Flight, FlightFilter, NewAirplane,
    NewAirplaneType, NewAirport, NewCrew, NewFlight, NewRoute, NewTicket, NewUser, Order, Route,
    RouteFilter, Seat, Ticket, User, UserChanges,
};
use crate::repository::{
    AirplaneRepository, AirportRepository, CrewRepository, FlightRepository, OrderRepository,
    RouteRepository, UserRepository,
};
use crate::validation::invalid_pk;
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone)]
struct RouteRow {
    source_id: i64,
    destination_id: i64,
    distance: i32,
}

#[derive(Debug, Clone)]
struct AirplaneRow {
    name: String,
    rows: i32,
    seats_in_row: i32,
    airplane_type_id: i64,
}

#[derive(Debug, Clone)]
struct FlightRow {
    route_id: i64,
    airplane_id: i64,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
    crew_ids: Vec<i64>,
}

#[derive(Debug, Clone)]
struct OrderRow {
    user_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct TicketRow {
    row: i32,
    seat: i32,
    flight_id: i64,
    order_id: i64,
}

#[derive(Debug, Default)]
struct Tables {
    sequences: HashMap<&'static str, i64>,
    airports: BTreeMap<i64, Airport>,
    routes: BTreeMap<i64, RouteRow>,
    crew: BTreeMap<i64, Crew>,
    airplane_types: BTreeMap<i64, AirplaneType>,
    airplanes: BTreeMap<i64, AirplaneRow>,
    flights: BTreeMap<i64, FlightRow>,
    orders: BTreeMap<i64, OrderRow>,
    tickets: BTreeMap<i64, TicketRow>,
    users: BTreeMap<i64, User>,
}

impl Tables {
    fn next_id(&mut self, table: &'static str) -> i64 {
        let seq = self.sequences.entry(table).or_insert(0);
        *seq += 1;
        *seq
    }

    fn route(&self, id: i64) -> Option<Route> {
        let row = self.routes.get(&id)?;
        Some(Route {
            id,
            source: self.airports.get(&row.source_id)?.clone(),
            destination: self.airports.get(&row.destination_id)?.clone(),
            distance: row.distance,
        })
    }

    fn airplane(&self, id: i64) -> Option<Airplane> {
        let row = self.airplanes.get(&id)?;
        Some(Airplane {
            id,
            name: row.name.clone(),
            rows: row.rows,
            seats_in_row: row.seats_in_row,
            airplane_type: self.airplane_types.get(&row.airplane_type_id)?.clone(),
        })
    }

    fn flight(&self, id: i64) -> Option<Flight> {
        let row = self.flights.get(&id)?;
        let mut crew: Vec<Crew> = row
            .crew_ids
            .iter()
            .filter_map(|crew_id| self.crew.get(crew_id).cloned())
            .collect();
        crew.sort_by(|a, b| a.last_name.cmp(&b.last_name));

        Some(Flight {
            id,
            route: self.route(row.route_id)?,
            airplane: self.airplane(row.airplane_id)?,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            crew,
            tickets_sold: self.tickets.values().filter(|t| t.flight_id == id).count() as i64,
        })
    }

    fn order(&self, id: i64) -> Option<Order> {
        let row = self.orders.get(&id)?;
        let mut tickets: Vec<Ticket> = self
            .tickets
            .iter()
            .filter(|(_, t)| t.order_id == id)
            .filter_map(|(ticket_id, t)| {
                Some(Ticket {
                    id: *ticket_id,
                    row: t.row,
                    seat: t.seat,
                    flight: self.flight(t.flight_id)?,
                })
            })
            .collect();
        tickets.sort_by_key(|t| (t.row, t.seat));

        Some(Order {
            id,
            user_id: row.user_id,
            created_at: row.created_at,
            tickets,
        })
    }

    fn seat_taken(&self, flight_id: i64, row: i32, seat: i32) -> bool {
        self.tickets
            .values()
            .any(|t| t.flight_id == flight_id && t.row == row && t.seat == seat)
    }
}

/// Store backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AirportRepository for MemoryStore {
    async fn create_airport(&self, airport: &NewAirport) -> CoreResult<Airport> {
        let mut tables = self.tables.write().await;
        if tables.airports.values().any(|a| a.name == airport.name) {
            return Err(CoreError::Conflict("airport with this name already exists.".into()));
        }
        let id = tables.next_id("airports");
        let created = Airport {
            id,
            name: airport.name.clone(),
            closest_big_city: airport.closest_big_city.clone(),
        };
        tables.airports.insert(id, created.clone());
        Ok(created)
    }

    async fn get_airport(&self, id: i64) -> CoreResult<Option<Airport>> {
        Ok(self.tables.read().await.airports.get(&id).cloned())
    }

    async fn list_airports(&self) -> CoreResult<Vec<Airport>> {
        let mut airports: Vec<Airport> = self.tables.read().await.airports.values().cloned().collect();
        airports.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(airports)
    }
}

#[async_trait]
impl RouteRepository for MemoryStore {
    async fn create_route(&self, route: &NewRoute) -> CoreResult<Route> {
        let mut tables = self.tables.write().await;
        for (field, id) in [("source", route.source), ("destination", route.destination)] {
            if !tables.airports.contains_key(&id) {
                return Err(CoreError::invalid(field, invalid_pk(id)));
            }
        }
        if tables
            .routes
            .values()
            .any(|r| r.source_id == route.source && r.destination_id == route.destination)
        {
            return Err(CoreError::Conflict(
                "route with this source and destination already exists.".into(),
            ));
        }
        let id = tables.next_id("routes");
        tables.routes.insert(
            id,
            RouteRow {
                source_id: route.source,
                destination_id: route.destination,
                distance: route.distance,
            },
        );
        tables
            .route(id)
            .ok_or_else(|| CoreError::Internal(format!("route {} vanished after insert", id)))
    }

    async fn get_route(&self, id: i64) -> CoreResult<Option<Route>> {
        Ok(self.tables.read().await.route(id))
    }

    async fn list_routes(&self, filter: &RouteFilter) -> CoreResult<Vec<Route>> {
        let tables = self.tables.read().await;
        Ok(tables
            .routes
            .keys()
            .filter_map(|id| tables.route(*id))
            .filter(|route| filter.matches(route))
            .collect())
    }
}

#[async_trait]
impl CrewRepository for MemoryStore {
    async fn create_crew(&self, crew: &NewCrew) -> CoreResult<Crew> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id("crew");
        let created = Crew {
            id,
            first_name: crew.first_name.clone(),
            last_name: crew.last_name.clone(),
        };
        tables.crew.insert(id, created.clone());
        Ok(created)
    }

    async fn get_crew(&self, id: i64) -> CoreResult<Option<Crew>> {
        Ok(self.tables.read().await.crew.get(&id).cloned())
    }

    async fn list_crew(&self) -> CoreResult<Vec<Crew>> {
        let mut crew: Vec<Crew> = self.tables.read().await.crew.values().cloned().collect();
        crew.sort_by(|a, b| a.last_name.cmp(&b.last_name));
        Ok(crew)
    }

    async fn update_crew(&self, id: i64, changes: &CrewChanges) -> CoreResult<Option<Crew>> {
        let mut tables = self.tables.write().await;
        let Some(crew) = tables.crew.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(first_name) = &changes.first_name {
            crew.first_name = first_name.clone();
        }
        if let Some(last_name) = &changes.last_name {
            crew.last_name = last_name.clone();
        }
        Ok(Some(crew.clone()))
    }

    async fn delete_crew(&self, id: i64) -> CoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.crew.remove(&id).is_none() {
            return Ok(false);
        }
        for flight in tables.flights.values_mut() {
            flight.crew_ids.retain(|crew_id| *crew_id != id);
        }
        Ok(true)
    }
}

#[async_trait]
impl AirplaneRepository for MemoryStore {
    async fn create_airplane_type(&self, airplane_type: &NewAirplaneType) -> CoreResult<AirplaneType> {
        let mut tables = self.tables.write().await;
        if tables.airplane_types.values().any(|t| t.name == airplane_type.name) {
            return Err(CoreError::Conflict("airplane type with this name already exists.".into()));
        }
        let id = tables.next_id("airplane_types");
        let created = AirplaneType {
            id,
            name: airplane_type.name.clone(),
        };
        tables.airplane_types.insert(id, created.clone());
        Ok(created)
    }

    async fn get_airplane_type(&self, id: i64) -> CoreResult<Option<AirplaneType>> {
        Ok(self.tables.read().await.airplane_types.get(&id).cloned())
    }

    async fn list_airplane_types(&self) -> CoreResult<Vec<AirplaneType>> {
        let mut types: Vec<AirplaneType> =
            self.tables.read().await.airplane_types.values().cloned().collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    async fn create_airplane(&self, airplane: &NewAirplane) -> CoreResult<Airplane> {
        let mut tables = self.tables.write().await;
        if !tables.airplane_types.contains_key(&airplane.airplane_type) {
            return Err(CoreError::invalid("airplane_type", invalid_pk(airplane.airplane_type)));
        }
        if tables.airplanes.values().any(|a| a.name == airplane.name) {
            return Err(CoreError::Conflict("airplane with this name already exists.".into()));
        }
        let id = tables.next_id("airplanes");
        tables.airplanes.insert(
            id,
            AirplaneRow {
                name: airplane.name.clone(),
                rows: airplane.rows,
                seats_in_row: airplane.seats_in_row,
                airplane_type_id: airplane.airplane_type,
            },
        );
        tables
            .airplane(id)
            .ok_or_else(|| CoreError::Internal(format!("airplane {} vanished after insert", id)))
    }

    async fn get_airplane(&self, id: i64) -> CoreResult<Option<Airplane>> {
        Ok(self.tables.read().await.airplane(id))
    }

    async fn list_airplanes(&self) -> CoreResult<Vec<Airplane>> {
        let tables = self.tables.read().await;
        let mut airplanes: Vec<Airplane> =
            tables.airplanes.keys().filter_map(|id| tables.airplane(*id)).collect();
        airplanes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(airplanes)
    }
}

#[async_trait]
impl FlightRepository for MemoryStore {
    async fn create_flight(&self, flight: &NewFlight) -> CoreResult<Flight> {
        let mut tables = self.tables.write().await;
        if !tables.routes.contains_key(&flight.route) {
            return Err(CoreError::invalid("route", invalid_pk(flight.route)));
        }
        if !tables.airplanes.contains_key(&flight.airplane) {
            return Err(CoreError::invalid("airplane", invalid_pk(flight.airplane)));
        }
        if let Some(missing) = flight.crew.iter().find(|id| !tables.crew.contains_key(*id)) {
            return Err(CoreError::invalid("crew", invalid_pk(*missing)));
        }
        if tables
            .flights
            .values()
            .any(|f| f.airplane_id == flight.airplane && f.departure_time == flight.departure_time)
        {
            return Err(CoreError::Conflict(
                "flight with this airplane and departure time already exists.".into(),
            ));
        }

        let mut crew_ids = flight.crew.clone();
        crew_ids.sort_unstable();
        crew_ids.dedup();
        let id = tables.next_id("flights");
        tables.flights.insert(
            id,
            FlightRow {
                route_id: flight.route,
                airplane_id: flight.airplane,
                departure_time: flight.departure_time,
                arrival_time: flight.arrival_time,
                crew_ids,
            },
        );
        tables
            .flight(id)
            .ok_or_else(|| CoreError::Internal(format!("flight {} vanished after insert", id)))
    }

    async fn get_flight(&self, id: i64) -> CoreResult<Option<Flight>> {
        Ok(self.tables.read().await.flight(id))
    }

    async fn list_flights(&self, filter: &FlightFilter) -> CoreResult<Vec<Flight>> {
        let tables = self.tables.read().await;
        let mut flights: Vec<Flight> = tables
            .flights
            .keys()
            .filter_map(|id| tables.flight(*id))
            .filter(|flight| filter.matches(flight))
            .collect();
        flights.sort_by_key(|f| (f.departure_time, f.arrival_time, f.id));
        Ok(flights)
    }

    async fn latest_flight_for_airplane(&self, airplane_id: i64) -> CoreResult<Option<Flight>> {
        let tables = self.tables.read().await;
        let latest = tables
            .flights
            .iter()
            .filter(|(_, f)| f.airplane_id == airplane_id)
            .max_by_key(|(id, f)| (f.arrival_time, **id))
            .map(|(id, _)| *id);
        Ok(latest.and_then(|id| tables.flight(id)))
    }

    async fn taken_seats(&self, flight_id: i64) -> CoreResult<Vec<Seat>> {
        let tables = self.tables.read().await;
        let mut seats: Vec<Seat> = tables
            .tickets
            .values()
            .filter(|t| t.flight_id == flight_id)
            .map(|t| Seat { row: t.row, seat: t.seat })
            .collect();
        seats.sort();
        Ok(seats)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create_order(
        &self,
        user_id: i64,
        created_at: DateTime<Utc>,
        tickets: &[NewTicket],
    ) -> CoreResult<Order> {
        let mut tables = self.tables.write().await;

        // Check every ticket before writing anything.
        for (i, ticket) in tickets.iter().enumerate() {
            if !tables.flights.contains_key(&ticket.flight) {
                return Err(CoreError::invalid("flight", invalid_pk(ticket.flight)));
            }
            let repeated = tickets[..i]
                .iter()
                .any(|t| t.flight == ticket.flight && t.row == ticket.row && t.seat == ticket.seat);
            if repeated || tables.seat_taken(ticket.flight, ticket.row, ticket.seat) {
                return Err(CoreError::Conflict(format!(
                    "ticket with this flight, row and seat already exists (flight {}, row {}, seat {}).",
                    ticket.flight, ticket.row, ticket.seat
                )));
            }
        }

        let order_id = tables.next_id("orders");
        tables.orders.insert(order_id, OrderRow { user_id, created_at });
        for ticket in tickets {
            let ticket_id = tables.next_id("tickets");
            tables.tickets.insert(
                ticket_id,
                TicketRow {
                    row: ticket.row,
                    seat: ticket.seat,
                    flight_id: ticket.flight,
                    order_id,
                },
            );
        }

        tables
            .order(order_id)
            .ok_or_else(|| CoreError::Internal(format!("order {} vanished after insert", order_id)))
    }

    async fn get_order(&self, user_id: i64, id: i64) -> CoreResult<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables.order(id).filter(|order| order.user_id == user_id))
    }

    async fn list_orders(&self, user_id: i64) -> CoreResult<Vec<Order>> {
        let tables = self.tables.read().await;
        let mut orders: Vec<Order> = tables
            .orders
            .iter()
            .filter(|(_, o)| o.user_id == user_id)
            .filter_map(|(id, _)| tables.order(*id))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: &NewUser) -> CoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(CoreError::Conflict("user with this email already exists.".into()));
        }
        let id = tables.next_id("users");
        let created = User {
            id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_staff: user.is_staff,
            password_hash: user.password_hash.clone(),
        };
        tables.users.insert(id, created.clone());
        Ok(created)
    }

    async fn get_user(&self, id: i64) -> CoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        Ok(self.tables.read().await.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, id: i64, changes: &UserChanges) -> CoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &changes.email {
            if tables.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(CoreError::Conflict("user with this email already exists.".into()));
            }
        }
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(password_hash) = &changes.password_hash {
            user.password_hash = password_hash.clone();
        }
        if let Some(first_name) = &changes.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &changes.last_name {
            user.last_name = last_name.clone();
        }
        Ok(Some(user.clone()))
    }
}

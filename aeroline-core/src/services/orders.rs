use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::booking::{validate_ticket, BookingViolation, SeatLayout};
use crate::models::{Flight, NewTicket, Order};
use crate::validation::invalid_pk;
use crate::{CoreError, CoreResult, Repository};

/// Validates every ticket of an order placed at `now` and persists the order
/// with its tickets as one unit.
pub async fn place_order(
    repo: &dyn Repository,
    user_id: i64,
    tickets: &[NewTicket],
    now: DateTime<Utc>,
) -> CoreResult<Order> {
    if tickets.is_empty() {
        return Err(CoreError::Validation(BookingViolation::EmptyOrder.into()));
    }

    let mut flights: HashMap<i64, Flight> = HashMap::new();
    let mut requested = HashSet::new();

    for ticket in tickets {
        let flight = match flights.entry(ticket.flight) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let flight = repo
                    .get_flight(ticket.flight)
                    .await?
                    .ok_or_else(|| CoreError::invalid("flight", invalid_pk(ticket.flight)))?;
                entry.insert(flight)
            }
        };

        let layout = SeatLayout::from(&flight.airplane);
        if let Err(violation) = validate_ticket(ticket.row, ticket.seat, layout, now, flight.departure_time) {
            warn!(
                "Rejected ticket row {} seat {} on flight {} for user {}: {}",
                ticket.row, ticket.seat, ticket.flight, user_id, violation
            );
            return Err(CoreError::Validation(violation.into()));
        }

        if !requested.insert((ticket.flight, ticket.row, ticket.seat)) {
            return Err(CoreError::Conflict(format!(
                "ticket with this flight, row and seat already exists (flight {}, row {}, seat {}).",
                ticket.flight, ticket.row, ticket.seat
            )));
        }
    }

    let order = repo.create_order(user_id, now, tickets).await?;
    info!(
        "Order {} placed by user {} with {} ticket(s)",
        order.id,
        user_id,
        order.tickets.len()
    );
    Ok(order)
}

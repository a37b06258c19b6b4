use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::Airplane;
use crate::validation::ValidationErrors;

/// Cabin dimensions a ticket must fit into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatLayout {
    pub rows: i32,
    pub seats_in_row: i32,
}

impl From<&Airplane> for SeatLayout {
    fn from(airplane: &Airplane) -> Self {
        Self {
            rows: airplane.rows,
            seats_in_row: airplane.seats_in_row,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingViolation {
    #[error("An order must contain at least one ticket.")]
    EmptyOrder,

    #[error("row number must be in available range: (1, rows): (1, {max})")]
    RowOutOfRange { row: i32, max: i32 },

    #[error("seat number must be in available range: (1, seats_in_row): (1, {max})")]
    SeatOutOfRange { seat: i32, max: i32 },

    #[error(
        "Booking for past flights is not available. \
         Order created at {order_created_at} but the flight departs at {departure_time}."
    )]
    PastFlight {
        order_created_at: DateTime<Utc>,
        departure_time: DateTime<Utc>,
    },
}

impl BookingViolation {
    /// Input field the violation is reported against.
    pub fn field(&self) -> &'static str {
        match self {
            BookingViolation::EmptyOrder => "tickets",
            BookingViolation::RowOutOfRange { .. } => "row",
            BookingViolation::SeatOutOfRange { .. } => "seat",
            BookingViolation::PastFlight { .. } => "order",
        }
    }
}

impl From<BookingViolation> for ValidationErrors {
    fn from(violation: BookingViolation) -> Self {
        ValidationErrors::single(violation.field(), violation.to_string())
    }
}

pub fn check_seat(row: i32, seat: i32, layout: SeatLayout) -> Result<(), BookingViolation> {
    if !(1..=layout.rows).contains(&row) {
        return Err(BookingViolation::RowOutOfRange { row, max: layout.rows });
    }
    if !(1..=layout.seats_in_row).contains(&seat) {
        return Err(BookingViolation::SeatOutOfRange {
            seat,
            max: layout.seats_in_row,
        });
    }
    Ok(())
}

/// Booking cutoff: an order may not be placed after the flight has left.
pub fn check_booking_cutoff(
    order_created_at: DateTime<Utc>,
    departure_time: DateTime<Utc>,
) -> Result<(), BookingViolation> {
    if order_created_at > departure_time {
        return Err(BookingViolation::PastFlight {
            order_created_at,
            departure_time,
        });
    }
    Ok(())
}

pub fn validate_ticket(
    row: i32,
    seat: i32,
    layout: SeatLayout,
    order_created_at: DateTime<Utc>,
    departure_time: DateTime<Utc>,
) -> Result<(), BookingViolation> {
    check_seat(row, seat, layout)?;
    check_booking_cutoff(order_created_at, departure_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const LAYOUT: SeatLayout = SeatLayout { rows: 40, seats_in_row: 6 };

    #[test]
    fn test_seat_bounds() {
        assert!(check_seat(1, 6, LAYOUT).is_ok());
        assert!(check_seat(40, 1, LAYOUT).is_ok());

        let err = check_seat(41, 1, LAYOUT).unwrap_err();
        assert_eq!(err, BookingViolation::RowOutOfRange { row: 41, max: 40 });
        assert_eq!(err.field(), "row");
        assert_eq!(
            err.to_string(),
            "row number must be in available range: (1, rows): (1, 40)"
        );

        assert_eq!(check_seat(0, 1, LAYOUT).unwrap_err().field(), "row");
        assert_eq!(check_seat(1, 7, LAYOUT).unwrap_err().field(), "seat");
        assert_eq!(check_seat(1, 0, LAYOUT).unwrap_err().field(), "seat");
    }

    #[test]
    fn test_row_reported_before_seat() {
        let err = check_seat(50, 50, LAYOUT).unwrap_err();
        assert_eq!(err.field(), "row");
    }

    #[test]
    fn test_booking_cutoff() {
        let departure = Utc::now();
        assert!(check_booking_cutoff(departure - Duration::hours(1), departure).is_ok());
        assert!(check_booking_cutoff(departure, departure).is_ok());

        let err = check_booking_cutoff(departure + Duration::seconds(1), departure).unwrap_err();
        assert_eq!(err.field(), "order");
        assert!(err.to_string().starts_with("Booking for past flights is not available."));
    }

    #[test]
    fn test_validate_ticket_into_field_errors() {
        let departure = Utc::now() + Duration::days(1);
        assert!(validate_ticket(1, 1, LAYOUT, Utc::now(), departure).is_ok());

        let errors: ValidationErrors = validate_ticket(1, 9, LAYOUT, Utc::now(), departure)
            .unwrap_err()
            .into();
        assert!(errors.get("seat").is_some());
    }
}

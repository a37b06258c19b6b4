//! Consistency rules applied when a flight is scheduled for an airplane.
//!
//! The rules only ever look at one earlier record: the airplane's flight with
//! the latest arrival time, whatever its position relative to the candidate.
//! Callers load that record (see [`PreviousLeg`]) and the functions here stay
//! pure.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::validation::{ValidationErrors, NON_FIELD_ERRORS};

/// Turnaround limits between two consecutive flights of one airplane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleRules {
    /// Minimum rest between the previous arrival and the next departure.
    pub min_turnaround: Duration,
    /// Maximum idle time between the previous arrival and the next departure.
    pub max_idle_gap: Duration,
}

impl ScheduleRules {
    pub fn from_hours(min_turnaround_hours: i64, max_idle_gap_hours: i64) -> Self {
        Self {
            min_turnaround: Duration::hours(min_turnaround_hours),
            max_idle_gap: Duration::hours(max_idle_gap_hours),
        }
    }
}

impl Default for ScheduleRules {
    fn default() -> Self {
        Self::from_hours(3, 24)
    }
}

/// The flight being proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposedLeg {
    pub source_airport_id: i64,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
}

/// The airplane's most recently arriving flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousLeg {
    pub destination_airport_id: i64,
    pub arrival_time: DateTime<Utc>,
    /// `full_route` of every route leaving the previous destination.
    pub onward_routes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleViolation {
    #[error("Departure time must be earlier than arrival time.")]
    TimeOrder {
        departure_time: DateTime<Utc>,
        arrival_time: DateTime<Utc>,
    },

    #[error("{}", continuity_message(.onward_routes))]
    Continuity {
        expected_source_id: i64,
        requested_source_id: i64,
        onward_routes: Vec<String>,
    },

    #[error(
        "Cannot schedule this flight before the previous flight arrives. \
         The airplane's last scheduled flight arrives at {previous_arrival}. \
         The next possible departure time is {next_possible_departure}."
    )]
    DepartsBeforePreviousArrival {
        previous_arrival: DateTime<Utc>,
        next_possible_departure: DateTime<Utc>,
    },

    #[error(
        "The airplane needs a {rest_hours}-hour rest after its previous flight. \
         The previous flight arrived at {previous_arrival}. \
         The next available departure time is {next_possible_departure}."
    )]
    Rest {
        rest_hours: i64,
        previous_arrival: DateTime<Utc>,
        next_possible_departure: DateTime<Utc>,
    },

    #[error(
        "The time difference between consecutive flights shouldn't exceed {max_gap_hours} hours. \
         Previous flight arrived at {previous_arrival}, \
         and this flight is scheduled to depart at {departure_time}."
    )]
    MaxGap {
        max_gap_hours: i64,
        previous_arrival: DateTime<Utc>,
        departure_time: DateTime<Utc>,
    },
}

fn continuity_message(onward_routes: &[String]) -> String {
    if onward_routes.is_empty() {
        "Departure location should match the arrival location of the previous flight. \
         There are no routes with the correct departure location. \
         You need to create a route first, then schedule the flight."
            .to_string()
    } else {
        format!(
            "Departure location should match the arrival location of the previous flight. \
             Available routes with the correct departure location: {}.",
            onward_routes.join(", ")
        )
    }
}

impl From<ScheduleViolation> for ValidationErrors {
    fn from(violation: ScheduleViolation) -> Self {
        ValidationErrors::single(NON_FIELD_ERRORS, violation.to_string())
    }
}

pub fn check_time_order(
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
) -> Result<(), ScheduleViolation> {
    if departure_time >= arrival_time {
        return Err(ScheduleViolation::TimeOrder {
            departure_time,
            arrival_time,
        });
    }
    Ok(())
}

pub fn check_continuity(
    source_airport_id: i64,
    previous: &PreviousLeg,
) -> Result<(), ScheduleViolation> {
    if source_airport_id != previous.destination_airport_id {
        return Err(ScheduleViolation::Continuity {
            expected_source_id: previous.destination_airport_id,
            requested_source_id: source_airport_id,
            onward_routes: previous.onward_routes.clone(),
        });
    }
    Ok(())
}

/// Rest and idle-gap checks against the previous arrival.
pub fn check_turnaround(
    rules: &ScheduleRules,
    departure_time: DateTime<Utc>,
    previous_arrival: DateTime<Utc>,
) -> Result<(), ScheduleViolation> {
    let next_possible_departure = previous_arrival + rules.min_turnaround;

    if departure_time < previous_arrival {
        return Err(ScheduleViolation::DepartsBeforePreviousArrival {
            previous_arrival,
            next_possible_departure,
        });
    }

    if departure_time < next_possible_departure {
        return Err(ScheduleViolation::Rest {
            rest_hours: rules.min_turnaround.num_hours(),
            previous_arrival,
            next_possible_departure,
        });
    }

    if departure_time - previous_arrival > rules.max_idle_gap {
        return Err(ScheduleViolation::MaxGap {
            max_gap_hours: rules.max_idle_gap.num_hours(),
            previous_arrival,
            departure_time,
        });
    }

    Ok(())
}

/// Runs every scheduling rule in order and stops at the first failure.
pub fn validate_schedule(
    rules: &ScheduleRules,
    candidate: &ProposedLeg,
    previous: Option<&PreviousLeg>,
) -> Result<(), ScheduleViolation> {
    check_time_order(candidate.departure_time, candidate.arrival_time)?;

    if let Some(previous) = previous {
        check_continuity(candidate.source_airport_id, previous)?;
        check_turnaround(rules, candidate.departure_time, previous.arrival_time)?;
    }

    Ok(())
}

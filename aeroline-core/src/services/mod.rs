//! Use cases: resolve references through a [`Repository`](crate::Repository),
//! run the pure rules, then persist.

pub mod accounts;
pub mod catalog;
pub mod flights;
pub mod orders;

pub use accounts::{authenticate, ensure_admin, register_user, update_profile, ProfileChanges, Registration};
pub use flights::schedule_flight;
pub use orders::place_order;

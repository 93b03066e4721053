//! API handlers.

pub mod bookings;
pub mod health;
pub mod quota;

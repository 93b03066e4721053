//! Covolt Client SDK.
//!
//! This crate provides a client library for services and frontends to
//! interact with the covolt reservation API.
//!
//! # Example
//!
//! ```no_run
//! use chrono::{Duration, Utc};
//! use covolt_client::{CovoltClient, CreateBookingRequest, GroupId, VehicleId};
//!
//! # async fn example() -> Result<(), covolt_client::ClientError> {
//! let client = CovoltClient::new(
//!     "http://covolt.mobility.svc:8080",
//!     "user-jwt-from-auth",
//! );
//!
//! // Reserve tomorrow morning
//! let start = Utc::now() + Duration::hours(24);
//! let outcome = client.create_booking(CreateBookingRequest {
//!     vehicle_id: VehicleId::generate(),
//!     group_id: GroupId::generate(),
//!     start,
//!     end: start + Duration::hours(2),
//!     user_id: None,
//! }).await?;
//!
//! println!("Booked {}", outcome.booking.id);
//! if !outcome.superseded.is_empty() {
//!     println!("Overrode {} booking(s)", outcome.superseded.len());
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, CovoltClient};
pub use error::ClientError;
pub use types::*;

pub use covolt_core::{BookingId, BookingStatus, GroupId, UserId, VehicleId};

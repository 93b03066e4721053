//! Covolt HTTP API Service.
//!
//! This crate provides the HTTP API for the covolt reservation engine,
//! including:
//!
//! - Booking creation, edits, and cancellation
//! - Ownership-weighted overrides of conflicting bookings
//! - Monthly override budget reporting
//! - Per-group and per-vehicle booking listings
//!
//! # Authentication
//!
//! End-user requests carry identity-provider JWTs, validated RS256 against
//! the provider's JWKS. The `test-auth` feature additionally accepts
//! `test-token:<uuid>` bearer tokens so integration tests can authenticate
//! without an identity provider.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Read-only handlers need async for routing

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod groups;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use engine::{BookingOutcome, CreateBooking, ReservationEngine, UpdateBooking};
pub use error::ApiError;
pub use groups::{GroupDirectory, GroupsClient, GroupsError, StaticDirectory};
pub use routes::create_router;
pub use state::AppState;

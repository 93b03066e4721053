//! Core types and utilities for covolt.
//!
//! This crate provides the foundational types used throughout the covolt
//! reservation platform:
//!
//! - **Identifiers**: `UserId`, `GroupId`, `VehicleId`, `BookingId`
//! - **Bookings**: `Booking`, `BookingStatus`, `TimeSlot`
//! - **Ownership**: `OwnershipShare`, `OwnershipFact`
//! - **Quotas**: `QuotaRecord`, `QuotaStatus`, `MonthKey`
//! - **Conflicts**: `resolve`, `Decision`, `ConflictReason`
//!
//! # Ownership Share Unit
//!
//! **Shares are stored in basis points: 1% = 100 bp, 100% = 10 000 bp**
//!
//! - A co-owner holding 37.5% of a vehicle has a share of 3750 bp
//! - Stored as `u16` so that priority comparisons are exact integer
//!   comparisons with no floating point involved

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod booking;
pub mod error;
pub mod ids;
pub mod month;
pub mod ownership;
pub mod policy;
pub mod quota;
pub mod resolver;
pub mod slot;

pub use booking::{Booking, BookingStatus};
pub use error::{ReservationError, Result};
pub use ids::{BookingId, GroupId, IdError, UserId, VehicleId};
pub use month::{InvalidMonthKey, MonthKey};
pub use ownership::{OwnershipFact, OwnershipShare, FULL_OWNERSHIP_BASIS_POINTS};
pub use policy::{
    ReservationPolicy, DEFAULT_MAX_BOOKING_DAYS_PER_MONTH, DEFAULT_MAX_OVERRIDES_PER_MONTH,
};
pub use quota::{QuotaRecord, QuotaStatus};
pub use resolver::{resolve, ConflictReason, Decision};
pub use slot::TimeSlot;

//! `RocksDB` storage layer for covolt.
//!
//! This crate provides persistent storage for bookings and override quotas
//! using `RocksDB` with column families for efficient indexing.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `bookings`: Primary booking records, keyed by `booking_id` (ULID)
//! - `bookings_by_vehicle`: Index for overlap scans, keyed by
//!   `vehicle_id || slot_start_ms || booking_id`
//! - `bookings_by_group`: Index for listing a group's bookings
//! - `quotas`: Override ledgers, keyed by `user_id || group_id || month`
//!
//! Every state change lands in a single `WriteBatch`, so an override that
//! flips victim rows and charges the quota either happens entirely or not at
//! all.
//!
//! # Example
//!
//! ```no_run
//! use covolt_store::{RocksStore, Store};
//! use covolt_core::{Booking, GroupId, OwnershipShare, TimeSlot, UserId, VehicleId};
//! use chrono::{Duration, Utc};
//!
//! let store = RocksStore::open("/tmp/covolt-db").unwrap();
//!
//! let slot = TimeSlot::new(Utc::now() + Duration::hours(1), Utc::now() + Duration::hours(3)).unwrap();
//! let booking = Booking::new(
//!     VehicleId::generate(),
//!     GroupId::generate(),
//!     UserId::generate(),
//!     slot,
//!     OwnershipShare::from_basis_points(5000).unwrap(),
//! );
//! store.put_booking(&booking).unwrap();
//!
//! let retrieved = store.get_booking(&booking.id).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use std::collections::BTreeSet;

use chrono::NaiveDate;

use covolt_core::{Booking, BookingId, GroupId, MonthKey, QuotaRecord, TimeSlot, UserId, VehicleId};

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations (e.g., `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    // =========================================================================
    // Booking Operations
    // =========================================================================

    /// Insert or update a booking record, maintaining both indexes.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_booking(&self, booking: &Booking) -> Result<()>;

    /// Get a booking by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_booking(&self, booking_id: &BookingId) -> Result<Option<Booking>>;

    /// Find active bookings of a vehicle whose slots overlap the given slot.
    ///
    /// Terminal bookings never conflict and are skipped. `exclude` omits one
    /// booking from the result, which edits use to ignore the row being
    /// replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn find_overlapping(
        &self,
        vehicle_id: &VehicleId,
        slot: &TimeSlot,
        exclude: Option<&BookingId>,
    ) -> Result<Vec<Booking>>;

    /// List all bookings of a vehicle, ordered by slot start.
    ///
    /// Includes terminal bookings; callers filter by status where needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_bookings_by_vehicle(&self, vehicle_id: &VehicleId) -> Result<Vec<Booking>>;

    /// List all bookings of a group, ordered by creation time.
    ///
    /// Includes terminal bookings; callers filter by status where needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_bookings_by_group(&self, group_id: &GroupId) -> Result<Vec<Booking>>;

    /// Cancel a booking, returning the updated record.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the booking doesn't exist.
    /// - `StoreError::AlreadyTerminal` if it was already canceled or
    ///   overridden.
    fn cancel_booking(&self, booking_id: &BookingId) -> Result<Booking>;

    // =========================================================================
    // Quota Operations
    // =========================================================================

    /// Get the override ledger for a member, group, and month.
    ///
    /// An absent record means no override has been used that month.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_quota(
        &self,
        user_id: &UserId,
        group_id: &GroupId,
        month: &MonthKey,
    ) -> Result<Option<QuotaRecord>>;

    /// Distinct dates inside `month` on which the member holds active
    /// bookings in the group.
    ///
    /// `exclude` omits one booking, which edits use so a moved booking does
    /// not count its old dates.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn booked_dates_in_month(
        &self,
        user_id: &UserId,
        group_id: &GroupId,
        month: &MonthKey,
        exclude: Option<&BookingId>,
    ) -> Result<BTreeSet<NaiveDate>>;

    // =========================================================================
    // Compound Operations
    // =========================================================================

    /// Commit a booking decision atomically.
    ///
    /// Applies the quota charge, flips superseded rows to `Overridden`,
    /// cancels the replaced row, and inserts the new booking with its index
    /// entries, all in one `WriteBatch`. Any failure leaves the store
    /// untouched.
    ///
    /// Supersede targets that already reached a terminal state are left
    /// unchanged and omitted from the receipt.
    ///
    /// # Errors
    ///
    /// - `StoreError::QuotaExhausted` if the charge would exceed the budget.
    /// - `StoreError::NotFound` if the replaced booking doesn't exist.
    /// - `StoreError::AlreadyTerminal` if the replaced booking is terminal.
    fn commit_booking(&self, request: &CommitRequest<'_>) -> Result<CommitReceipt>;
}

/// One atomic booking write: the new row, the rows it supersedes, the row it
/// replaces, and the quota charge funding it.
#[derive(Debug)]
pub struct CommitRequest<'a> {
    /// The new active booking to insert.
    pub booking: &'a Booking,
    /// Active bookings the new one overrides.
    pub supersede: &'a [BookingId],
    /// A previous booking of the same holder this one replaces (edits).
    pub replace: Option<&'a BookingId>,
    /// Override charge to apply, present exactly when `supersede` has rows.
    pub quota_charge: Option<QuotaCharge>,
}

/// An override charge against one member's monthly budget.
#[derive(Debug, Clone)]
pub struct QuotaCharge {
    /// The member paying for the override.
    pub user_id: UserId,
    /// The group the budget applies in.
    pub group_id: GroupId,
    /// The month bucket to charge.
    pub month: MonthKey,
    /// Budget ceiling used when the ledger record does not exist yet.
    pub max_overrides: u32,
}

/// What a committed booking actually changed.
#[derive(Debug, Clone)]
pub struct CommitReceipt {
    /// ID of the inserted booking.
    pub booking_id: BookingId,
    /// Bookings flipped to `Overridden` in this commit.
    pub superseded: Vec<BookingId>,
    /// The replaced booking, if the commit was an edit.
    pub replaced: Option<BookingId>,
    /// The override ledger after the charge, if one applied.
    pub quota: Option<QuotaRecord>,
}

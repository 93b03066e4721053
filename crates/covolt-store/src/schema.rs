//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Primary booking records, keyed by `booking_id` (ULID).
    pub const BOOKINGS: &str = "bookings";

    /// Index: bookings by vehicle, keyed by
    /// `vehicle_id || slot_start_ms || booking_id`.
    /// Value is empty (index only); the start component keeps overlap scans
    /// bounded.
    pub const BOOKINGS_BY_VEHICLE: &str = "bookings_by_vehicle";

    /// Index: bookings by group, keyed by `group_id || booking_id`.
    /// Value is empty (index only).
    pub const BOOKINGS_BY_GROUP: &str = "bookings_by_group";

    /// Override quota ledgers, keyed by `user_id || group_id || month`.
    pub const QUOTAS: &str = "quotas";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::BOOKINGS,
        cf::BOOKINGS_BY_VEHICLE,
        cf::BOOKINGS_BY_GROUP,
        cf::QUOTAS,
    ]
}

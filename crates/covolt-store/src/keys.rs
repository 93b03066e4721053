//! Key encoding utilities for `RocksDB`.
//!
//! This module provides functions for encoding and decoding keys used in
//! column families. Composite keys concatenate fixed-width components so that
//! plain byte-order iteration doubles as an index scan.

use chrono::{DateTime, Utc};

use covolt_core::{BookingId, GroupId, MonthKey, UserId, VehicleId};

/// Create a booking key from a booking ID.
#[must_use]
pub fn booking_key(booking_id: &BookingId) -> Vec<u8> {
    booking_id.to_bytes().to_vec()
}

/// Encode a slot start so big-endian byte order matches chronological order.
///
/// Millisecond timestamps are signed; flipping the sign bit biases them into
/// unsigned space, which keeps pre-epoch instants sorted below post-epoch
/// ones.
#[must_use]
pub fn encode_slot_start(at: DateTime<Utc>) -> [u8; 8] {
    #[allow(clippy::cast_sign_loss)]
    let biased = (at.timestamp_millis() as u64) ^ (1 << 63);
    biased.to_be_bytes()
}

/// Create a vehicle-booking index key.
///
/// Format: `vehicle_id (16 bytes) || slot_start_ms (8 bytes) || booking_id (16 bytes)`
///
/// Keys for one vehicle sort by slot start, so an overlap scan can stop at
/// the first key whose start is at or past the probe slot's end.
#[must_use]
pub fn vehicle_booking_key(
    vehicle_id: &VehicleId,
    slot_start: DateTime<Utc>,
    booking_id: &BookingId,
) -> Vec<u8> {
    let mut key = Vec::with_capacity(40);
    key.extend_from_slice(vehicle_id.as_bytes());
    key.extend_from_slice(&encode_slot_start(slot_start));
    key.extend_from_slice(&booking_id.to_bytes());
    key
}

/// Create a prefix for iterating all bookings of a vehicle.
#[must_use]
pub fn vehicle_bookings_prefix(vehicle_id: &VehicleId) -> Vec<u8> {
    vehicle_id.as_bytes().to_vec()
}

/// Create the exclusive upper bound for an overlap scan on one vehicle.
///
/// Index keys at or past this bound start at or after `slot_end`, so with
/// half-open slots they cannot overlap a slot ending there. The bound also
/// sorts below every key of the next vehicle, terminating the scan.
#[must_use]
pub fn vehicle_bookings_upper_bound(vehicle_id: &VehicleId, slot_end: DateTime<Utc>) -> Vec<u8> {
    let mut key = Vec::with_capacity(24);
    key.extend_from_slice(vehicle_id.as_bytes());
    key.extend_from_slice(&encode_slot_start(slot_end));
    key
}

/// Extract the booking ID from a vehicle-booking index key.
///
/// # Panics
///
/// Panics if the key is not at least 40 bytes.
#[must_use]
pub fn extract_booking_id_from_vehicle_key(key: &[u8]) -> BookingId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[24..40]);
    BookingId::from_bytes(bytes).expect("valid ULID bytes")
}

/// Create a group-booking index key.
///
/// Format: `group_id (16 bytes) || booking_id (16 bytes)`
///
/// Since ULIDs are time-ordered, bookings for a group sort by creation time.
#[must_use]
pub fn group_booking_key(group_id: &GroupId, booking_id: &BookingId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(group_id.as_bytes());
    key.extend_from_slice(&booking_id.to_bytes());
    key
}

/// Create a prefix for iterating all bookings of a group.
#[must_use]
pub fn group_bookings_prefix(group_id: &GroupId) -> Vec<u8> {
    group_id.as_bytes().to_vec()
}

/// Extract the booking ID from a group-booking index key.
///
/// # Panics
///
/// Panics if the key is not at least 32 bytes.
#[must_use]
pub fn extract_booking_id_from_group_key(key: &[u8]) -> BookingId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    BookingId::from_bytes(bytes).expect("valid ULID bytes")
}

/// Create a quota ledger key.
///
/// Format: `user_id (16 bytes) || group_id (16 bytes) || month ("YYYY-MM")`
///
/// The month component makes budgets reset implicitly: a new month is a new
/// key, and an absent record means an untouched budget.
#[must_use]
pub fn quota_key(user_id: &UserId, group_id: &GroupId, month: &MonthKey) -> Vec<u8> {
    let mut key = Vec::with_capacity(39);
    key.extend_from_slice(user_id.as_bytes());
    key.extend_from_slice(group_id.as_bytes());
    key.extend_from_slice(month.to_string().as_bytes());
    key
}

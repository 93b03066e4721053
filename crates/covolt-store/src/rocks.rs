//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use covolt_core::{
    Booking, BookingId, GroupId, MonthKey, QuotaRecord, TimeSlot, UserId, VehicleId,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{CommitReceipt, CommitRequest, Store};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path.as_ref(), cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::debug!(path = %path.as_ref().display(), "Opened reservation database");

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Stage a booking and its two index entries into a batch.
    fn stage_booking(&self, batch: &mut WriteBatch, booking: &Booking) -> Result<()> {
        let cf_bookings = self.cf(cf::BOOKINGS)?;
        let cf_by_vehicle = self.cf(cf::BOOKINGS_BY_VEHICLE)?;
        let cf_by_group = self.cf(cf::BOOKINGS_BY_GROUP)?;

        let value = Self::serialize(booking)?;
        batch.put_cf(&cf_bookings, keys::booking_key(&booking.id), &value);
        batch.put_cf(
            &cf_by_vehicle,
            keys::vehicle_booking_key(&booking.vehicle_id, booking.slot.start(), &booking.id),
            [], // Index entry (empty value)
        );
        batch.put_cf(
            &cf_by_group,
            keys::group_booking_key(&booking.group_id, &booking.id),
            [],
        );

        Ok(())
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Booking Operations
    // =========================================================================

    fn put_booking(&self, booking: &Booking) -> Result<()> {
        let mut batch = WriteBatch::default();
        self.stage_booking(&mut batch, booking)?;

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_booking(&self, booking_id: &BookingId) -> Result<Option<Booking>> {
        let cf = self.cf(cf::BOOKINGS)?;
        let key = keys::booking_key(booking_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn find_overlapping(
        &self,
        vehicle_id: &VehicleId,
        slot: &TimeSlot,
        exclude: Option<&BookingId>,
    ) -> Result<Vec<Booking>> {
        let cf_by_vehicle = self.cf(cf::BOOKINGS_BY_VEHICLE)?;
        let prefix = keys::vehicle_bookings_prefix(vehicle_id);
        let upper_bound = keys::vehicle_bookings_upper_bound(vehicle_id, slot.end());

        let iter = self.db.iterator_cf(
            &cf_by_vehicle,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        let mut overlapping = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            // Keys past the bound start at or after the probe's end, so
            // half-open slots there cannot overlap; the bound also sorts
            // below every other vehicle's keys, ending the scan.
            if &key[..] >= upper_bound.as_slice() {
                break;
            }

            let booking_id = keys::extract_booking_id_from_vehicle_key(&key);
            if exclude.is_some_and(|excluded| *excluded == booking_id) {
                continue;
            }

            let Some(booking) = self.get_booking(&booking_id)? else {
                continue;
            };
            if booking.is_active() && booking.slot.overlaps(slot) {
                overlapping.push(booking);
            }
        }

        Ok(overlapping)
    }

    fn list_bookings_by_vehicle(&self, vehicle_id: &VehicleId) -> Result<Vec<Booking>> {
        let cf_by_vehicle = self.cf(cf::BOOKINGS_BY_VEHICLE)?;
        let prefix = keys::vehicle_bookings_prefix(vehicle_id);

        let iter = self.db.iterator_cf(
            &cf_by_vehicle,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        let mut bookings = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            let booking_id = keys::extract_booking_id_from_vehicle_key(&key);
            if let Some(booking) = self.get_booking(&booking_id)? {
                bookings.push(booking);
            }
        }

        Ok(bookings)
    }

    fn list_bookings_by_group(&self, group_id: &GroupId) -> Result<Vec<Booking>> {
        let cf_by_group = self.cf(cf::BOOKINGS_BY_GROUP)?;
        let prefix = keys::group_bookings_prefix(group_id);

        let iter = self.db.iterator_cf(
            &cf_by_group,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        let mut bookings = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            let booking_id = keys::extract_booking_id_from_group_key(&key);
            if let Some(booking) = self.get_booking(&booking_id)? {
                bookings.push(booking);
            }
        }

        Ok(bookings)
    }

    fn cancel_booking(&self, booking_id: &BookingId) -> Result<Booking> {
        let cf_bookings = self.cf(cf::BOOKINGS)?;

        let mut booking = self.get_booking(booking_id)?.ok_or(StoreError::NotFound)?;
        if !booking.cancel() {
            return Err(StoreError::AlreadyTerminal {
                status: booking.status,
            });
        }

        // Index keys carry no status, so only the primary row changes.
        let value = Self::serialize(&booking)?;
        self.db
            .put_cf(&cf_bookings, keys::booking_key(booking_id), value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(booking)
    }

    // =========================================================================
    // Quota Operations
    // =========================================================================

    fn get_quota(
        &self,
        user_id: &UserId,
        group_id: &GroupId,
        month: &MonthKey,
    ) -> Result<Option<QuotaRecord>> {
        let cf = self.cf(cf::QUOTAS)?;
        let key = keys::quota_key(user_id, group_id, month);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn booked_dates_in_month(
        &self,
        user_id: &UserId,
        group_id: &GroupId,
        month: &MonthKey,
        exclude: Option<&BookingId>,
    ) -> Result<BTreeSet<NaiveDate>> {
        let mut dates = BTreeSet::new();

        for booking in self.list_bookings_by_group(group_id)? {
            if booking.user_id != *user_id || !booking.is_active() {
                continue;
            }
            if exclude.is_some_and(|excluded| *excluded == booking.id) {
                continue;
            }
            for date in booking.slot.dates() {
                if month.contains(date) {
                    dates.insert(date);
                }
            }
        }

        Ok(dates)
    }

    // =========================================================================
    // Compound Operations
    // =========================================================================

    fn commit_booking(&self, request: &CommitRequest<'_>) -> Result<CommitReceipt> {
        let cf_bookings = self.cf(cf::BOOKINGS)?;
        let cf_quotas = self.cf(cf::QUOTAS)?;

        let mut batch = WriteBatch::default();

        // Charge the quota first: an exhausted budget must abort the commit
        // before anything else is staged.
        let quota = match &request.quota_charge {
            Some(charge) => {
                let mut record = self
                    .get_quota(&charge.user_id, &charge.group_id, &charge.month)?
                    .unwrap_or_else(|| {
                        QuotaRecord::new(
                            charge.user_id,
                            charge.group_id,
                            charge.month,
                            charge.max_overrides,
                        )
                    });
                if !record.try_charge() {
                    return Err(StoreError::QuotaExhausted {
                        used: record.overrides_used,
                        max: record.max_overrides,
                    });
                }

                let key = keys::quota_key(&charge.user_id, &charge.group_id, &charge.month);
                batch.put_cf(&cf_quotas, key, Self::serialize(&record)?);
                Some(record)
            }
            None => None,
        };

        // Flip superseded rows. Rows that already reached a terminal state
        // are left as they are.
        let mut superseded = Vec::new();
        for booking_id in request.supersede {
            let Some(mut victim) = self.get_booking(booking_id)? else {
                continue;
            };
            if victim.supersede() {
                batch.put_cf(
                    &cf_bookings,
                    keys::booking_key(booking_id),
                    Self::serialize(&victim)?,
                );
                superseded.push(*booking_id);
            }
        }

        // Cancel the replaced row, if this commit is an edit.
        let replaced = match request.replace {
            Some(booking_id) => {
                let mut predecessor =
                    self.get_booking(booking_id)?.ok_or(StoreError::NotFound)?;
                if !predecessor.cancel() {
                    return Err(StoreError::AlreadyTerminal {
                        status: predecessor.status,
                    });
                }
                batch.put_cf(
                    &cf_bookings,
                    keys::booking_key(booking_id),
                    Self::serialize(&predecessor)?,
                );
                Some(*booking_id)
            }
            None => None,
        };

        self.stage_booking(&mut batch, request.booking)?;

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(CommitReceipt {
            booking_id: request.booking.id,
            superseded,
            replaced,
            quota,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QuotaCharge;
    use chrono::{TimeZone, Utc};
    use covolt_core::{BookingStatus, OwnershipShare};
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn slot(day: u32, start_hour: u32, end_hour: u32) -> TimeSlot {
        let start = Utc.with_ymd_and_hms(2024, 3, day, start_hour, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, day, end_hour, 0, 0).unwrap();
        TimeSlot::new(start, end).unwrap()
    }

    fn booking_with(
        vehicle_id: VehicleId,
        group_id: GroupId,
        user_id: UserId,
        slot: TimeSlot,
        basis_points: u16,
    ) -> Booking {
        Booking::new(
            vehicle_id,
            group_id,
            user_id,
            slot,
            OwnershipShare::from_basis_points(basis_points).unwrap(),
        )
    }

    fn plain_commit(store: &RocksStore, booking: &Booking) -> CommitReceipt {
        store
            .commit_booking(&CommitRequest {
                booking,
                supersede: &[],
                replace: None,
                quota_charge: None,
            })
            .unwrap()
    }

    fn march_charge(user_id: UserId, group_id: GroupId, max_overrides: u32) -> QuotaCharge {
        QuotaCharge {
            user_id,
            group_id,
            month: MonthKey::new(2024, 3).unwrap(),
            max_overrides,
        }
    }

    #[test]
    fn booking_roundtrip() {
        let (store, _dir) = create_test_store();
        let vehicle_id = VehicleId::generate();
        let group_id = GroupId::generate();
        let booking = booking_with(vehicle_id, group_id, UserId::generate(), slot(2, 8, 10), 5000);

        store.put_booking(&booking).unwrap();

        let retrieved = store.get_booking(&booking.id).unwrap().unwrap();
        assert_eq!(retrieved, booking);

        let by_vehicle = store.list_bookings_by_vehicle(&vehicle_id).unwrap();
        assert_eq!(by_vehicle, vec![booking.clone()]);

        let by_group = store.list_bookings_by_group(&group_id).unwrap();
        assert_eq!(by_group, vec![booking]);

        assert!(store.get_booking(&BookingId::generate()).unwrap().is_none());
    }

    #[test]
    fn vehicle_listing_orders_by_slot_start() {
        let (store, _dir) = create_test_store();
        let vehicle_id = VehicleId::generate();
        let group_id = GroupId::generate();

        let evening = booking_with(vehicle_id, group_id, UserId::generate(), slot(2, 18, 20), 5000);
        let morning = booking_with(vehicle_id, group_id, UserId::generate(), slot(2, 8, 10), 5000);

        // Insertion order is evening first; the index must sort by start.
        store.put_booking(&evening).unwrap();
        store.put_booking(&morning).unwrap();

        let listed = store.list_bookings_by_vehicle(&vehicle_id).unwrap();
        assert_eq!(listed[0].id, morning.id);
        assert_eq!(listed[1].id, evening.id);
    }

    #[test]
    fn find_overlapping_uses_half_open_bounds() {
        let (store, _dir) = create_test_store();
        let vehicle_id = VehicleId::generate();
        let group_id = GroupId::generate();
        let held = booking_with(vehicle_id, group_id, UserId::generate(), slot(2, 8, 10), 5000);
        store.put_booking(&held).unwrap();

        // Adjacent on either side: no overlap.
        assert!(store
            .find_overlapping(&vehicle_id, &slot(2, 10, 12), None)
            .unwrap()
            .is_empty());
        assert!(store
            .find_overlapping(&vehicle_id, &slot(2, 6, 8), None)
            .unwrap()
            .is_empty());

        // Partial overlaps from both sides, and containment.
        for probe in [slot(2, 9, 11), slot(2, 7, 9), slot(2, 6, 12)] {
            let found = store.find_overlapping(&vehicle_id, &probe, None).unwrap();
            assert_eq!(found.len(), 1, "probe {probe:?}");
            assert_eq!(found[0].id, held.id);
        }
    }

    #[test]
    fn find_overlapping_skips_terminal_and_excluded() {
        let (store, _dir) = create_test_store();
        let vehicle_id = VehicleId::generate();
        let group_id = GroupId::generate();

        let active = booking_with(vehicle_id, group_id, UserId::generate(), slot(2, 8, 10), 5000);
        let canceled = booking_with(vehicle_id, group_id, UserId::generate(), slot(2, 9, 11), 5000);
        store.put_booking(&active).unwrap();
        store.put_booking(&canceled).unwrap();
        store.cancel_booking(&canceled.id).unwrap();

        let found = store
            .find_overlapping(&vehicle_id, &slot(2, 8, 12), None)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, active.id);

        let found = store
            .find_overlapping(&vehicle_id, &slot(2, 8, 12), Some(&active.id))
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn find_overlapping_scopes_to_vehicle() {
        let (store, _dir) = create_test_store();
        let group_id = GroupId::generate();
        let this_vehicle = VehicleId::generate();
        let other_vehicle = VehicleId::generate();

        let mine = booking_with(this_vehicle, group_id, UserId::generate(), slot(2, 8, 10), 5000);
        let theirs = booking_with(other_vehicle, group_id, UserId::generate(), slot(2, 8, 10), 5000);
        store.put_booking(&mine).unwrap();
        store.put_booking(&theirs).unwrap();

        let found = store
            .find_overlapping(&this_vehicle, &slot(2, 9, 11), None)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, mine.id);
    }

    #[test]
    fn cancel_booking_lifecycle() {
        let (store, _dir) = create_test_store();
        let booking = booking_with(
            VehicleId::generate(),
            GroupId::generate(),
            UserId::generate(),
            slot(2, 8, 10),
            5000,
        );
        store.put_booking(&booking).unwrap();

        let canceled = store.cancel_booking(&booking.id).unwrap();
        assert_eq!(canceled.status, BookingStatus::Canceled);

        let stored = store.get_booking(&booking.id).unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Canceled);

        let again = store.cancel_booking(&booking.id);
        assert!(matches!(
            again,
            Err(StoreError::AlreadyTerminal {
                status: BookingStatus::Canceled
            })
        ));

        let missing = store.cancel_booking(&BookingId::generate());
        assert!(matches!(missing, Err(StoreError::NotFound)));
    }

    #[test]
    fn commit_plain_insert() {
        let (store, _dir) = create_test_store();
        let vehicle_id = VehicleId::generate();
        let booking = booking_with(
            vehicle_id,
            GroupId::generate(),
            UserId::generate(),
            slot(2, 8, 10),
            5000,
        );

        let receipt = plain_commit(&store, &booking);
        assert_eq!(receipt.booking_id, booking.id);
        assert!(receipt.superseded.is_empty());
        assert!(receipt.replaced.is_none());
        assert!(receipt.quota.is_none());

        let stored = store.get_booking(&booking.id).unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Booked);
        assert_eq!(store.list_bookings_by_vehicle(&vehicle_id).unwrap().len(), 1);
    }

    #[test]
    fn commit_override_flips_rows_and_charges_once() {
        let (store, _dir) = create_test_store();
        let vehicle_id = VehicleId::generate();
        let group_id = GroupId::generate();
        let winner = UserId::generate();

        let first = booking_with(vehicle_id, group_id, UserId::generate(), slot(2, 8, 10), 3000);
        let second = booking_with(vehicle_id, group_id, UserId::generate(), slot(2, 10, 12), 4000);
        plain_commit(&store, &first);
        plain_commit(&store, &second);

        let takeover = booking_with(vehicle_id, group_id, winner, slot(2, 9, 11), 7000);
        let receipt = store
            .commit_booking(&CommitRequest {
                booking: &takeover,
                supersede: &[first.id, second.id],
                replace: None,
                quota_charge: Some(march_charge(winner, group_id, 3)),
            })
            .unwrap();

        assert_eq!(receipt.superseded, vec![first.id, second.id]);
        let quota = receipt.quota.unwrap();
        assert_eq!(quota.overrides_used, 1);

        for victim in [&first.id, &second.id] {
            let stored = store.get_booking(victim).unwrap().unwrap();
            assert_eq!(stored.status, BookingStatus::Overridden);
        }
        let stored = store.get_booking(&takeover.id).unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Booked);

        // One commit is one override, however many rows it superseded.
        let month = MonthKey::new(2024, 3).unwrap();
        let ledger = store.get_quota(&winner, &group_id, &month).unwrap().unwrap();
        assert_eq!(ledger.overrides_used, 1);
    }

    #[test]
    fn commit_leaves_terminal_supersede_targets_alone() {
        let (store, _dir) = create_test_store();
        let vehicle_id = VehicleId::generate();
        let group_id = GroupId::generate();
        let winner = UserId::generate();

        let victim = booking_with(vehicle_id, group_id, UserId::generate(), slot(2, 8, 10), 3000);
        plain_commit(&store, &victim);
        store.cancel_booking(&victim.id).unwrap();

        let takeover = booking_with(vehicle_id, group_id, winner, slot(2, 9, 11), 7000);
        let receipt = store
            .commit_booking(&CommitRequest {
                booking: &takeover,
                supersede: &[victim.id],
                replace: None,
                quota_charge: Some(march_charge(winner, group_id, 3)),
            })
            .unwrap();

        assert!(receipt.superseded.is_empty());
        let stored = store.get_booking(&victim.id).unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Canceled);
    }

    #[test]
    fn commit_quota_exhausted_leaves_store_untouched() {
        let (store, _dir) = create_test_store();
        let vehicle_id = VehicleId::generate();
        let group_id = GroupId::generate();
        let winner = UserId::generate();

        let first_victim =
            booking_with(vehicle_id, group_id, UserId::generate(), slot(2, 8, 10), 3000);
        let second_victim =
            booking_with(vehicle_id, group_id, UserId::generate(), slot(3, 8, 10), 3000);
        plain_commit(&store, &first_victim);
        plain_commit(&store, &second_victim);

        let first_takeover = booking_with(vehicle_id, group_id, winner, slot(2, 9, 11), 7000);
        store
            .commit_booking(&CommitRequest {
                booking: &first_takeover,
                supersede: &[first_victim.id],
                replace: None,
                quota_charge: Some(march_charge(winner, group_id, 1)),
            })
            .unwrap();

        let second_takeover = booking_with(vehicle_id, group_id, winner, slot(3, 9, 11), 7000);
        let result = store.commit_booking(&CommitRequest {
            booking: &second_takeover,
            supersede: &[second_victim.id],
            replace: None,
            quota_charge: Some(march_charge(winner, group_id, 1)),
        });
        assert!(matches!(
            result,
            Err(StoreError::QuotaExhausted { used: 1, max: 1 })
        ));

        // Nothing from the refused commit may be visible.
        assert!(store.get_booking(&second_takeover.id).unwrap().is_none());
        let untouched = store.get_booking(&second_victim.id).unwrap().unwrap();
        assert_eq!(untouched.status, BookingStatus::Booked);
        let month = MonthKey::new(2024, 3).unwrap();
        let ledger = store.get_quota(&winner, &group_id, &month).unwrap().unwrap();
        assert_eq!(ledger.overrides_used, 1);
    }

    #[test]
    fn commit_replacement_cancels_predecessor() {
        let (store, _dir) = create_test_store();
        let vehicle_id = VehicleId::generate();
        let group_id = GroupId::generate();
        let holder = UserId::generate();

        let original = booking_with(vehicle_id, group_id, holder, slot(2, 8, 10), 5000);
        plain_commit(&store, &original);

        let moved = booking_with(vehicle_id, group_id, holder, slot(2, 14, 16), 5000);
        let receipt = store
            .commit_booking(&CommitRequest {
                booking: &moved,
                supersede: &[],
                replace: Some(&original.id),
                quota_charge: None,
            })
            .unwrap();

        assert_eq!(receipt.replaced, Some(original.id));
        let old = store.get_booking(&original.id).unwrap().unwrap();
        assert_eq!(old.status, BookingStatus::Canceled);
        let new = store.get_booking(&moved.id).unwrap().unwrap();
        assert_eq!(new.status, BookingStatus::Booked);
    }

    #[test]
    fn commit_replacement_of_terminal_row_fails() {
        let (store, _dir) = create_test_store();
        let vehicle_id = VehicleId::generate();
        let group_id = GroupId::generate();
        let holder = UserId::generate();

        let original = booking_with(vehicle_id, group_id, holder, slot(2, 8, 10), 5000);
        plain_commit(&store, &original);
        store.cancel_booking(&original.id).unwrap();

        let moved = booking_with(vehicle_id, group_id, holder, slot(2, 14, 16), 5000);
        let result = store.commit_booking(&CommitRequest {
            booking: &moved,
            supersede: &[],
            replace: Some(&original.id),
            quota_charge: None,
        });
        assert!(matches!(result, Err(StoreError::AlreadyTerminal { .. })));
        assert!(store.get_booking(&moved.id).unwrap().is_none());

        let missing = store.commit_booking(&CommitRequest {
            booking: &moved,
            supersede: &[],
            replace: Some(&BookingId::generate()),
            quota_charge: None,
        });
        assert!(matches!(missing, Err(StoreError::NotFound)));
    }

    #[test]
    fn quota_months_are_independent() {
        let (store, _dir) = create_test_store();
        let vehicle_id = VehicleId::generate();
        let group_id = GroupId::generate();
        let winner = UserId::generate();
        let march = MonthKey::new(2024, 3).unwrap();
        let april = MonthKey::new(2024, 4).unwrap();

        assert!(store.get_quota(&winner, &group_id, &march).unwrap().is_none());

        let march_victim =
            booking_with(vehicle_id, group_id, UserId::generate(), slot(2, 8, 10), 3000);
        plain_commit(&store, &march_victim);
        let march_takeover = booking_with(vehicle_id, group_id, winner, slot(2, 9, 11), 7000);
        store
            .commit_booking(&CommitRequest {
                booking: &march_takeover,
                supersede: &[march_victim.id],
                replace: None,
                quota_charge: Some(march_charge(winner, group_id, 1)),
            })
            .unwrap();

        // A fresh month starts a fresh ledger even with March exhausted.
        let april_slot = |start_hour: u32, end_hour: u32| {
            TimeSlot::new(
                Utc.with_ymd_and_hms(2024, 4, 9, start_hour, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 4, 9, end_hour, 0, 0).unwrap(),
            )
            .unwrap()
        };
        let april_victim =
            booking_with(vehicle_id, group_id, UserId::generate(), april_slot(8, 10), 3000);
        plain_commit(&store, &april_victim);
        let april_takeover = booking_with(vehicle_id, group_id, winner, april_slot(9, 11), 7000);
        store
            .commit_booking(&CommitRequest {
                booking: &april_takeover,
                supersede: &[april_victim.id],
                replace: None,
                quota_charge: Some(QuotaCharge {
                    user_id: winner,
                    group_id,
                    month: april,
                    max_overrides: 1,
                }),
            })
            .unwrap();

        assert_eq!(
            store
                .get_quota(&winner, &group_id, &march)
                .unwrap()
                .unwrap()
                .overrides_used,
            1
        );
        assert_eq!(
            store
                .get_quota(&winner, &group_id, &april)
                .unwrap()
                .unwrap()
                .overrides_used,
            1
        );
    }

    #[test]
    fn booked_dates_in_month_unions_active_days() {
        let (store, _dir) = create_test_store();
        let vehicle_id = VehicleId::generate();
        let group_id = GroupId::generate();
        let user = UserId::generate();
        let other = UserId::generate();
        let march = MonthKey::new(2024, 3).unwrap();

        // Two bookings on the 2nd land on one distinct date.
        store
            .put_booking(&booking_with(vehicle_id, group_id, user, slot(2, 8, 10), 5000))
            .unwrap();
        store
            .put_booking(&booking_with(vehicle_id, group_id, user, slot(2, 18, 20), 5000))
            .unwrap();

        // An overnight booking spans the 5th and 6th.
        let overnight_start = Utc.with_ymd_and_hms(2024, 3, 5, 22, 0, 0).unwrap();
        let overnight_end = Utc.with_ymd_and_hms(2024, 3, 6, 2, 0, 0).unwrap();
        let overnight = booking_with(
            vehicle_id,
            group_id,
            user,
            TimeSlot::new(overnight_start, overnight_end).unwrap(),
            5000,
        );
        store.put_booking(&overnight).unwrap();

        // Another member's day and a canceled day never count.
        store
            .put_booking(&booking_with(vehicle_id, group_id, other, slot(7, 8, 10), 5000))
            .unwrap();
        let canceled = booking_with(vehicle_id, group_id, user, slot(9, 8, 10), 5000);
        store.put_booking(&canceled).unwrap();
        store.cancel_booking(&canceled.id).unwrap();

        let dates = store
            .booked_dates_in_month(&user, &group_id, &march, None)
            .unwrap();
        let listed: Vec<String> = dates.iter().map(ToString::to_string).collect();
        assert_eq!(listed, vec!["2024-03-02", "2024-03-05", "2024-03-06"]);

        let without_overnight = store
            .booked_dates_in_month(&user, &group_id, &march, Some(&overnight.id))
            .unwrap();
        assert_eq!(without_overnight.len(), 1);
    }
}

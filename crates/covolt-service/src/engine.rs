//! The reservation engine.
//!
//! All booking mutations funnel through [`ReservationEngine`], which owns the
//! per-vehicle serialization the conflict resolver depends on. The engine
//! checks the request against the ownership registry, takes the vehicle lock,
//! resolves the slot against active overlaps, and hands the decision to the
//! store as one atomic commit.
//!
//! Lock order is fixed: vehicle first, then the (user, group) quota lock for
//! override commits. Registry reads happen before any lock is taken; they are
//! snapshots and must not extend the critical section by a network round
//! trip.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use covolt_core::{
    resolve, Booking, BookingId, Decision, GroupId, MonthKey, QuotaRecord, QuotaStatus,
    ReservationError, ReservationPolicy, TimeSlot, UserId, VehicleId,
};
use covolt_store::{CommitRequest, QuotaCharge, Store};

use crate::groups::GroupDirectory;

/// A request to reserve a vehicle for a slot.
#[derive(Debug, Clone)]
pub struct CreateBooking {
    /// The vehicle to reserve.
    pub vehicle_id: VehicleId,
    /// The group the requester books under.
    pub group_id: GroupId,
    /// The requested interval.
    pub slot: TimeSlot,
}

/// A request to move an existing booking.
#[derive(Debug, Clone)]
pub struct UpdateBooking {
    /// The new interval.
    pub slot: TimeSlot,
    /// A different vehicle to move to, if any.
    pub vehicle_id: Option<VehicleId>,
}

/// What a successful mutation produced.
#[derive(Debug, Clone)]
pub struct BookingOutcome {
    /// The booking now holding the slot.
    pub booking: Booking,
    /// Bookings this one overrode.
    pub superseded: Vec<BookingId>,
    /// The override ledger after the charge, when one applied.
    pub quota: Option<QuotaRecord>,
}

/// Serializes and commits booking mutations for a fleet of vehicles.
pub struct ReservationEngine {
    store: Arc<dyn Store>,
    directory: Arc<dyn GroupDirectory>,
    policy: ReservationPolicy,
    lock_wait: Duration,
    vehicle_locks: DashMap<VehicleId, Arc<Mutex<()>>>,
    quota_locks: DashMap<(UserId, GroupId), Arc<Mutex<()>>>,
}

impl ReservationEngine {
    /// Create an engine over a store and an ownership registry.
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        directory: Arc<dyn GroupDirectory>,
        policy: ReservationPolicy,
        lock_wait: Duration,
    ) -> Self {
        Self {
            store,
            directory,
            policy,
            lock_wait,
            vehicle_locks: DashMap::new(),
            quota_locks: DashMap::new(),
        }
    }

    /// The policy this engine enforces.
    #[must_use]
    pub fn policy(&self) -> &ReservationPolicy {
        &self.policy
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create a booking, overriding lower-share holders where the rules allow.
    pub async fn create(
        &self,
        user_id: UserId,
        request: CreateBooking,
    ) -> Result<BookingOutcome, ReservationError> {
        if request.slot.start() < Utc::now() {
            return Err(ReservationError::StartInPast);
        }

        // Registry reads stay outside the vehicle lock.
        match self.directory.vehicle_group(&request.vehicle_id).await? {
            Some(group) if group == request.group_id => {}
            _ => return Err(ReservationError::VehicleNotInGroup),
        }
        let fact = self
            .directory
            .ownership(&request.group_id, &user_id, &request.vehicle_id)
            .await?
            .ok_or(ReservationError::NotAMember)?;

        let _vehicle_lock = self.lock_vehicle(&request.vehicle_id).await?;

        self.check_day_cap(&user_id, &request.group_id, &request.slot, None)?;

        let overlapping =
            self.store
                .find_overlapping(&request.vehicle_id, &request.slot, None)?;
        let decision = resolve(&user_id, fact.share, &overlapping);

        let booking = Booking::new(
            request.vehicle_id,
            request.group_id,
            user_id,
            request.slot,
            fact.share,
        );
        self.commit_decision(booking, decision, None).await
    }

    /// Move a booking to a new slot, and optionally to a different vehicle.
    ///
    /// An edit is a replacement: the old row is canceled and a new row with a
    /// fresh id and a fresh ownership snapshot takes the slot, in the same
    /// atomic commit. Conflict resolution ignores the row being replaced.
    pub async fn update(
        &self,
        user_id: UserId,
        booking_id: BookingId,
        request: UpdateBooking,
    ) -> Result<BookingOutcome, ReservationError> {
        if request.slot.start() < Utc::now() {
            return Err(ReservationError::StartInPast);
        }

        let existing = self
            .store
            .get_booking(&booking_id)?
            .ok_or(ReservationError::NotFound)?;
        if existing.user_id != user_id {
            return Err(ReservationError::Forbidden);
        }
        if existing.status.is_terminal() {
            return Err(ReservationError::AlreadyTerminal {
                status: existing.status,
            });
        }

        let target_vehicle = request.vehicle_id.unwrap_or(existing.vehicle_id);
        match self.directory.vehicle_group(&target_vehicle).await? {
            Some(group) if group == existing.group_id => {}
            _ => return Err(ReservationError::VehicleNotInGroup),
        }
        let fact = self
            .directory
            .ownership(&existing.group_id, &user_id, &target_vehicle)
            .await?
            .ok_or(ReservationError::NotAMember)?;

        let _locks = if target_vehicle == existing.vehicle_id {
            (self.lock_vehicle(&target_vehicle).await?, None)
        } else {
            let (first, second) = self
                .lock_vehicle_pair(&existing.vehicle_id, &target_vehicle)
                .await?;
            (first, Some(second))
        };

        // Re-read under the lock; a concurrent override or cancel may have
        // landed while we were waiting.
        let existing = self
            .store
            .get_booking(&booking_id)?
            .ok_or(ReservationError::NotFound)?;
        if existing.status.is_terminal() {
            return Err(ReservationError::AlreadyTerminal {
                status: existing.status,
            });
        }

        self.check_day_cap(&user_id, &existing.group_id, &request.slot, Some(&booking_id))?;

        let overlapping =
            self.store
                .find_overlapping(&target_vehicle, &request.slot, Some(&booking_id))?;
        let decision = resolve(&user_id, fact.share, &overlapping);

        let booking = Booking::new(
            target_vehicle,
            existing.group_id,
            user_id,
            request.slot,
            fact.share,
        );
        self.commit_decision(booking, decision, Some(booking_id)).await
    }

    /// Cancel a booking held by the requester.
    ///
    /// Cancellation refunds nothing: overrides spent earlier in the month
    /// stay spent.
    pub async fn cancel(
        &self,
        user_id: UserId,
        booking_id: BookingId,
    ) -> Result<Booking, ReservationError> {
        let existing = self
            .store
            .get_booking(&booking_id)?
            .ok_or(ReservationError::NotFound)?;
        if existing.user_id != user_id {
            return Err(ReservationError::Forbidden);
        }

        let _vehicle_lock = self.lock_vehicle(&existing.vehicle_id).await?;

        let canceled = self.store.cancel_booking(&booking_id)?;
        tracing::info!(booking_id = %booking_id, vehicle_id = %canceled.vehicle_id, "Booking canceled");
        Ok(canceled)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// All bookings in a group, terminal rows included.
    pub fn list_group(&self, group_id: &GroupId) -> Result<Vec<Booking>, ReservationError> {
        Ok(self.store.list_bookings_by_group(group_id)?)
    }

    /// All bookings of a vehicle, ordered by slot start.
    pub fn list_vehicle(&self, vehicle_id: &VehicleId) -> Result<Vec<Booking>, ReservationError> {
        Ok(self.store.list_bookings_by_vehicle(vehicle_id)?)
    }

    /// The requester's override budget for the current month.
    pub fn quota_status(
        &self,
        user_id: &UserId,
        group_id: &GroupId,
    ) -> Result<QuotaStatus, ReservationError> {
        let month = MonthKey::current();
        let status = self.store.get_quota(user_id, group_id, &month)?.map_or_else(
            || QuotaStatus::fresh(month, self.policy.max_overrides_per_month),
            |record| record.status(),
        );
        Ok(status)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Commit a resolved decision, taking the quota lock for overrides.
    async fn commit_decision(
        &self,
        booking: Booking,
        decision: Decision,
        replace: Option<BookingId>,
    ) -> Result<BookingOutcome, ReservationError> {
        match decision {
            Decision::Accept => {
                let receipt = self.store.commit_booking(&CommitRequest {
                    booking: &booking,
                    supersede: &[],
                    replace: replace.as_ref(),
                    quota_charge: None,
                })?;
                tracing::info!(
                    booking_id = %booking.id,
                    vehicle_id = %booking.vehicle_id,
                    replaced = ?receipt.replaced,
                    "Booking committed"
                );
                Ok(BookingOutcome {
                    booking,
                    superseded: receipt.superseded,
                    quota: receipt.quota,
                })
            }
            Decision::Override { supersede } => {
                // Quota lock nests inside the vehicle lock, never the reverse.
                let _quota_lock = self.lock_quota(&booking.user_id, &booking.group_id).await?;

                let receipt = self.store.commit_booking(&CommitRequest {
                    booking: &booking,
                    supersede: &supersede,
                    replace: replace.as_ref(),
                    quota_charge: Some(QuotaCharge {
                        user_id: booking.user_id,
                        group_id: booking.group_id,
                        month: MonthKey::current(),
                        max_overrides: self.policy.max_overrides_per_month,
                    }),
                })?;
                tracing::info!(
                    booking_id = %booking.id,
                    vehicle_id = %booking.vehicle_id,
                    superseded = receipt.superseded.len(),
                    "Booking committed with override"
                );
                Ok(BookingOutcome {
                    booking,
                    superseded: receipt.superseded,
                    quota: receipt.quota,
                })
            }
            Decision::Reject(reason) => {
                tracing::debug!(
                    vehicle_id = %booking.vehicle_id,
                    user_id = %booking.user_id,
                    reason = ?reason,
                    "Booking rejected"
                );
                Err(reason.into())
            }
        }
    }

    /// Enforce the distinct-booked-days cap for every month the slot touches.
    fn check_day_cap(
        &self,
        user_id: &UserId,
        group_id: &GroupId,
        slot: &TimeSlot,
        exclude: Option<&BookingId>,
    ) -> Result<(), ReservationError> {
        let mut requested: BTreeMap<MonthKey, Vec<NaiveDate>> = BTreeMap::new();
        for date in slot.dates() {
            requested
                .entry(MonthKey::from_date(date))
                .or_default()
                .push(date);
        }

        let max = self.policy.max_booking_days_per_month;
        for (month, dates_in_month) in requested {
            let mut dates = self
                .store
                .booked_dates_in_month(user_id, group_id, &month, exclude)?;
            dates.extend(dates_in_month);
            if dates.len() > max as usize {
                return Err(ReservationError::DayQuotaExceeded {
                    days: u32::try_from(dates.len()).unwrap_or(u32::MAX),
                    max,
                });
            }
        }
        Ok(())
    }

    async fn lock_vehicle(
        &self,
        vehicle_id: &VehicleId,
    ) -> Result<OwnedMutexGuard<()>, ReservationError> {
        // Clone the Arc out of the map entry so the shard guard drops before
        // we await the mutex.
        let lock = Arc::clone(self.vehicle_locks.entry(*vehicle_id).or_default().value());
        tokio::time::timeout(self.lock_wait, lock.lock_owned())
            .await
            .map_err(|_| ReservationError::LockTimeout { scope: "vehicle" })
    }

    /// Lock two vehicles in a fixed global order so concurrent moves between
    /// the same pair cannot deadlock.
    async fn lock_vehicle_pair(
        &self,
        a: &VehicleId,
        b: &VehicleId,
    ) -> Result<(OwnedMutexGuard<()>, OwnedMutexGuard<()>), ReservationError> {
        let (first, second) = if a.as_ref() <= b.as_ref() { (a, b) } else { (b, a) };
        let first_guard = self.lock_vehicle(first).await?;
        let second_guard = self.lock_vehicle(second).await?;
        Ok((first_guard, second_guard))
    }

    async fn lock_quota(
        &self,
        user_id: &UserId,
        group_id: &GroupId,
    ) -> Result<OwnedMutexGuard<()>, ReservationError> {
        let lock = Arc::clone(
            self.quota_locks
                .entry((*user_id, *group_id))
                .or_default()
                .value(),
        );
        tokio::time::timeout(self.lock_wait, lock.lock_owned())
            .await
            .map_err(|_| ReservationError::LockTimeout { scope: "quota" })
    }
}

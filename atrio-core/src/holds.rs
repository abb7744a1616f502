use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use atrio_domain::SeatHold;

use crate::conflict::windows_overlap;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HoldError {
    #[error("Hold window is invalid: start must precede end")]
    InvalidWindow,

    #[error("Seat is already held for an overlapping window")]
    Conflict,
}

/// In-process advisory hold store, keyed by (resource, seat). One live hold
/// per key at most. Expiry is lazy: every public operation sweeps expired
/// entries first; there is no background timer, so a stale hold lingers only
/// until the next call touches the store.
///
/// DashMap shards give per-key atomicity for the check-and-set inside
/// `try_hold` without serializing unrelated seats behind one lock.
pub struct HoldStore {
    holds: DashMap<(Uuid, Uuid), SeatHold>,
}

impl HoldStore {
    pub fn new() -> Self {
        Self {
            holds: DashMap::new(),
        }
    }

    /// Place or refresh a hold on a seat for `[start, end)`.
    ///
    /// Fails with `Conflict` iff a live hold on the same key overlaps the
    /// requested window, regardless of who owns it. A live hold whose window
    /// is disjoint from the new one is overwritten: time-disjoint holds on
    /// the same seat do not contend, and the key only ever carries one entry.
    pub fn try_hold(
        &self,
        resource_id: Uuid,
        seat_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        holder_key: &str,
        ttl_seconds: u64,
    ) -> Result<SeatHold, HoldError> {
        if start >= end {
            return Err(HoldError::InvalidWindow);
        }
        self.cleanup_expired();

        let now = Utc::now();
        let hold = SeatHold {
            resource_id,
            seat_id,
            start_time: start,
            end_time: end,
            holder_key: holder_key.to_string(),
            expires_at: now + Duration::seconds(ttl_seconds as i64),
        };

        // Entry locks the shard for this key, making the check-and-set
        // indivisible with respect to other callers on the same seat.
        match self.holds.entry((resource_id, seat_id)) {
            dashmap::mapref::entry::Entry::Occupied(mut occupied) => {
                let existing = occupied.get();
                if existing.is_live(now)
                    && windows_overlap(start, end, existing.start_time, existing.end_time)
                {
                    return Err(HoldError::Conflict);
                }
                occupied.insert(hold.clone());
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(hold.clone());
            }
        }

        Ok(hold)
    }

    /// Remove a hold, but only for its owner. Returns false without side
    /// effects when no live hold exists or the holder key does not match.
    pub fn release(&self, resource_id: Uuid, seat_id: Uuid, holder_key: &str) -> bool {
        self.cleanup_expired();
        let now = Utc::now();
        self.holds
            .remove_if(&(resource_id, seat_id), |_, hold| {
                hold.is_live(now) && hold.holder_key == holder_key
            })
            .is_some()
    }

    /// All live holds for a resource.
    pub fn holds_for_resource(&self, resource_id: Uuid) -> Vec<SeatHold> {
        self.cleanup_expired();
        self.holds
            .iter()
            .filter(|entry| entry.resource_id == resource_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Seat ids whose live hold overlaps `[start, end)`.
    pub fn occupied_by_hold(
        &self,
        resource_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> HashSet<Uuid> {
        self.cleanup_expired();
        self.holds
            .iter()
            .filter(|entry| {
                entry.resource_id == resource_id
                    && windows_overlap(start, end, entry.start_time, entry.end_time)
            })
            .map(|entry| entry.seat_id)
            .collect()
    }

    /// Idempotent sweep of expired entries. Returns how many were evicted.
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.holds.len();
        self.holds.retain(|_, hold| hold.is_live(now));
        // Concurrent inserts can land mid-sweep; the count is best-effort.
        before.saturating_sub(self.holds.len())
    }

    pub fn live_count(&self) -> usize {
        let now = Utc::now();
        self.holds.iter().filter(|entry| entry.is_live(now)).count()
    }
}

impl Default for HoldStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn window(h1: u32, m1: u32, h2: u32, m2: u32) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2025, 1, 10, h1, m1, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 10, h2, m2, 0).unwrap(),
        )
    }

    #[test]
    fn test_overlapping_hold_rejected() {
        let store = HoldStore::new();
        let resource = Uuid::new_v4();
        let seat = Uuid::new_v4();
        let (start, end) = window(10, 0, 11, 0);

        store
            .try_hold(resource, seat, start, end, "holder-a", 90)
            .unwrap();

        let (start_b, end_b) = window(10, 30, 10, 45);
        let second = store.try_hold(resource, seat, start_b, end_b, "holder-b", 90);
        assert_eq!(second.unwrap_err(), HoldError::Conflict);

        // Holder A's claim survives the failed attempt.
        let holds = store.holds_for_resource(resource);
        assert_eq!(holds.len(), 1);
        assert_eq!(holds[0].holder_key, "holder-a");
    }

    #[test]
    fn test_disjoint_window_replaces_hold() {
        let store = HoldStore::new();
        let resource = Uuid::new_v4();
        let seat = Uuid::new_v4();
        let (start, end) = window(10, 0, 11, 0);

        store
            .try_hold(resource, seat, start, end, "holder-a", 90)
            .unwrap();

        // [11:00, 12:00) does not overlap [10:00, 11:00) — half-open windows.
        let (start_b, end_b) = window(11, 0, 12, 0);
        let second = store
            .try_hold(resource, seat, start_b, end_b, "holder-b", 90)
            .unwrap();
        assert_eq!(second.holder_key, "holder-b");

        // Still exactly one live hold for the key.
        assert_eq!(store.holds_for_resource(resource).len(), 1);
    }

    #[test]
    fn test_invalid_window_rejected() {
        let store = HoldStore::new();
        let (start, end) = window(11, 0, 10, 0);
        let result = store.try_hold(Uuid::new_v4(), Uuid::new_v4(), start, end, "holder-a", 90);
        assert_eq!(result.unwrap_err(), HoldError::InvalidWindow);

        let result = store.try_hold(Uuid::new_v4(), Uuid::new_v4(), start, start, "holder-a", 90);
        assert_eq!(result.unwrap_err(), HoldError::InvalidWindow);
    }

    #[test]
    fn test_release_is_ownership_checked() {
        let store = HoldStore::new();
        let resource = Uuid::new_v4();
        let seat = Uuid::new_v4();
        let (start, end) = window(10, 0, 11, 0);

        store
            .try_hold(resource, seat, start, end, "holder-a", 90)
            .unwrap();

        assert!(!store.release(resource, seat, "holder-b"));
        assert_eq!(store.holds_for_resource(resource).len(), 1);

        assert!(store.release(resource, seat, "holder-a"));
        assert!(store.holds_for_resource(resource).is_empty());

        // Releasing again finds nothing.
        assert!(!store.release(resource, seat, "holder-a"));
    }

    #[test]
    fn test_expired_hold_is_evicted_and_replaceable() {
        let store = HoldStore::new();
        let resource = Uuid::new_v4();
        let seat = Uuid::new_v4();
        let (start, end) = window(10, 0, 11, 0);

        // TTL of zero expires immediately.
        store
            .try_hold(resource, seat, start, end, "holder-a", 0)
            .unwrap();

        assert!(store.holds_for_resource(resource).is_empty());
        assert!(store.occupied_by_hold(resource, start, end).is_empty());

        // Same window, different holder: the expired hold never blocks.
        let replaced = store
            .try_hold(resource, seat, start, end, "holder-b", 90)
            .unwrap();
        assert_eq!(replaced.holder_key, "holder-b");
    }

    #[test]
    fn test_cleanup_expired_is_idempotent() {
        let store = HoldStore::new();
        let resource = Uuid::new_v4();
        let (start, end) = window(10, 0, 11, 0);

        store
            .try_hold(resource, Uuid::new_v4(), start, end, "holder-a", 0)
            .unwrap();
        store
            .try_hold(resource, Uuid::new_v4(), start, end, "holder-b", 90)
            .unwrap();

        let first = store.cleanup_expired();
        assert_eq!(first, 1);
        let live_after_first = store.holds_for_resource(resource);

        let second = store.cleanup_expired();
        assert_eq!(second, 0);
        let live_after_second = store.holds_for_resource(resource);

        assert_eq!(live_after_first.len(), live_after_second.len());
        assert_eq!(live_after_first.len(), 1);
    }

    #[test]
    fn test_occupied_by_hold_filters_window_and_resource() {
        let store = HoldStore::new();
        let resource = Uuid::new_v4();
        let other_resource = Uuid::new_v4();
        let seat_a = Uuid::new_v4();
        let seat_b = Uuid::new_v4();
        let (start, end) = window(10, 0, 11, 0);
        let (later_start, later_end) = window(14, 0, 15, 0);

        store
            .try_hold(resource, seat_a, start, end, "holder-a", 90)
            .unwrap();
        store
            .try_hold(resource, seat_b, later_start, later_end, "holder-b", 90)
            .unwrap();
        store
            .try_hold(other_resource, seat_a, start, end, "holder-c", 90)
            .unwrap();

        let occupied = store.occupied_by_hold(resource, start, end);
        assert!(occupied.contains(&seat_a));
        assert!(!occupied.contains(&seat_b));
        assert_eq!(occupied.len(), 1);
    }

    #[test]
    fn test_concurrent_try_hold_admits_one_winner() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(HoldStore::new());
        let resource = Uuid::new_v4();
        let seat = Uuid::new_v4();
        let (start, end) = window(10, 0, 11, 0);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .try_hold(resource, seat, start, end, &format!("holder-{i}"), 90)
                        .is_ok()
                })
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
        assert_eq!(store.holds_for_resource(resource).len(), 1);
    }
}

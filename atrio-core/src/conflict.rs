use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use atrio_domain::{Reservation, ReservationStatus, SeatHold};

/// Half-open interval overlap: `[a1, a2)` and `[b1, b2)` overlap iff
/// `a1 < b2 && a2 > b1`. Touching endpoints do not overlap.
pub fn windows_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Advisory occupancy for a window: seat ids taken by non-Cancelled
/// reservations, merged with seat ids under a live hold.
///
/// This view is informational only — it feeds availability rendering and
/// pre-flight checks. The commit path never consults holds; it runs the
/// ledger-only check (`ReservationLedger::find_overlapping`) instead, so the
/// two can legitimately diverge under contention.
pub fn occupied_seats(
    reservations: &[Reservation],
    holds: &[SeatHold],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> HashSet<Uuid> {
    let mut occupied: HashSet<Uuid> = reservations
        .iter()
        .filter(|r| r.status != ReservationStatus::Cancelled)
        .filter(|r| windows_overlap(start, end, r.start_time, r.end_time))
        .filter_map(|r| r.seat_id)
        .collect();

    occupied.extend(
        holds
            .iter()
            .filter(|h| windows_overlap(start, end, h.start_time, h.end_time))
            .map(|h| h.seat_id),
    );

    occupied
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, h, m, 0).unwrap()
    }

    fn reservation(seat_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>, status: ReservationStatus) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            resource_id: Uuid::new_v4(),
            seat_id: Some(seat_id),
            user_id: Some("user-1".to_string()),
            guest_email: None,
            guest_phone: None,
            start_time: start,
            end_time: end,
            status,
            event_id: None,
            created_at: Utc::now(),
        }
    }

    fn hold(seat_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> SeatHold {
        SeatHold {
            resource_id: Uuid::new_v4(),
            seat_id,
            start_time: start,
            end_time: end,
            holder_key: "session-1".to_string(),
            expires_at: Utc::now() + chrono::Duration::seconds(90),
        }
    }

    #[test]
    fn test_windows_overlap() {
        assert!(windows_overlap(at(10, 0), at(11, 0), at(10, 30), at(10, 45)));
        assert!(windows_overlap(at(10, 0), at(11, 0), at(10, 30), at(11, 30)));
        assert!(windows_overlap(at(10, 0), at(11, 0), at(9, 0), at(12, 0)));

        // Half-open: touching endpoints are disjoint.
        assert!(!windows_overlap(at(10, 0), at(11, 0), at(11, 0), at(12, 0)));
        assert!(!windows_overlap(at(11, 0), at(12, 0), at(10, 0), at(11, 0)));
        assert!(!windows_overlap(at(10, 0), at(11, 0), at(12, 0), at(13, 0)));
    }

    #[test]
    fn test_occupied_merges_reservations_and_holds() {
        let reserved_seat = Uuid::new_v4();
        let held_seat = Uuid::new_v4();

        let reservations = vec![reservation(
            reserved_seat,
            at(10, 0),
            at(11, 0),
            ReservationStatus::Confirmed,
        )];
        let holds = vec![hold(held_seat, at(10, 0), at(11, 0))];

        let occupied = occupied_seats(&reservations, &holds, at(10, 0), at(11, 0));
        assert!(occupied.contains(&reserved_seat));
        assert!(occupied.contains(&held_seat));
        assert_eq!(occupied.len(), 2);
    }

    #[test]
    fn test_cancelled_reservations_do_not_occupy() {
        let seat = Uuid::new_v4();
        let reservations = vec![reservation(
            seat,
            at(10, 0),
            at(11, 0),
            ReservationStatus::Cancelled,
        )];

        let occupied = occupied_seats(&reservations, &[], at(10, 0), at(11, 0));
        assert!(occupied.is_empty());
    }

    #[test]
    fn test_out_of_window_entries_do_not_occupy() {
        let seat_a = Uuid::new_v4();
        let seat_b = Uuid::new_v4();
        let reservations = vec![reservation(
            seat_a,
            at(8, 0),
            at(9, 0),
            ReservationStatus::Confirmed,
        )];
        let holds = vec![hold(seat_b, at(12, 0), at(13, 0))];

        let occupied = occupied_seats(&reservations, &holds, at(10, 0), at(11, 0));
        assert!(occupied.is_empty());
    }
}

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use atrio_domain::{
    LedgerError, Reservation, ReservationDraft, ReservationLedger, ReservationStatus,
};

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Reservation window is invalid: start must precede end")]
    InvalidWindow,

    #[error("Seat is already reserved for an overlapping window")]
    Conflict,

    #[error("Reservation not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Ledger failure: {0}")]
    Ledger(String),
}

impl From<LedgerError> for LifecycleError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Conflict => LifecycleError::Conflict,
            LedgerError::NotFound(id) => LifecycleError::NotFound(id),
            LedgerError::Backend(msg) => LifecycleError::Ledger(msg),
        }
    }
}

/// Manages the reservation lifecycle and its state transitions.
///
/// Commits are gated by the authoritative ledger-only conflict check; holds
/// never participate here. The ledger itself enforces the same exclusion at
/// the storage layer, so a commit that slips between check and insert still
/// surfaces as `Conflict` rather than a double booking.
pub struct ReservationManager {
    ledger: Arc<dyn ReservationLedger>,
}

impl ReservationManager {
    pub fn new(ledger: Arc<dyn ReservationLedger>) -> Self {
        Self { ledger }
    }

    /// Commit a draft into the ledger. Authenticated users book straight to
    /// Confirmed; guests enter as Pending and wait for staff confirmation.
    pub async fn create(&self, draft: ReservationDraft) -> Result<Reservation, LifecycleError> {
        if draft.start_time >= draft.end_time {
            return Err(LifecycleError::InvalidWindow);
        }

        if let Some(seat_id) = draft.seat_id {
            let taken = self
                .ledger
                .find_overlapping(draft.resource_id, seat_id, draft.start_time, draft.end_time, None)
                .await?;
            if taken {
                return Err(LifecycleError::Conflict);
            }
        }

        let status = if draft.is_guest() {
            ReservationStatus::Pending
        } else {
            ReservationStatus::Confirmed
        };

        let reservation = Reservation {
            id: Uuid::new_v4(),
            resource_id: draft.resource_id,
            seat_id: draft.seat_id,
            user_id: draft.user_id,
            guest_email: draft.guest_email,
            guest_phone: draft.guest_phone,
            start_time: draft.start_time,
            end_time: draft.end_time,
            status,
            event_id: draft.event_id,
            created_at: Utc::now(),
        };

        self.ledger.insert(&reservation).await?;
        info!(reservation_id = %reservation.id, status = %reservation.status, "Reservation committed");
        Ok(reservation)
    }

    /// Transition: Pending → Confirmed (staff action).
    pub async fn confirm(&self, id: Uuid) -> Result<Reservation, LifecycleError> {
        let mut reservation = self.fetch(id).await?;

        let status = effective_status(&reservation, Utc::now());
        if status != ReservationStatus::Pending {
            return Err(LifecycleError::InvalidTransition {
                from: status.to_string(),
                to: ReservationStatus::Confirmed.to_string(),
            });
        }

        self.ledger
            .update_status(id, ReservationStatus::Confirmed)
            .await?;
        reservation.status = ReservationStatus::Confirmed;
        info!(reservation_id = %id, "Reservation confirmed");
        Ok(reservation)
    }

    /// Transition: Pending | Confirmed → Cancelled. Forbidden once the
    /// reservation is Cancelled or has run to completion.
    pub async fn cancel(&self, id: Uuid) -> Result<Reservation, LifecycleError> {
        let mut reservation = self.fetch(id).await?;

        let status = effective_status(&reservation, Utc::now());
        if !matches!(
            status,
            ReservationStatus::Pending | ReservationStatus::Confirmed
        ) {
            return Err(LifecycleError::InvalidTransition {
                from: status.to_string(),
                to: ReservationStatus::Cancelled.to_string(),
            });
        }

        self.ledger
            .update_status(id, ReservationStatus::Cancelled)
            .await?;
        reservation.status = ReservationStatus::Cancelled;
        info!(reservation_id = %id, "Reservation cancelled");
        Ok(reservation)
    }

    /// Move a reservation to a new seat and/or window. The new pair must
    /// independently pass the authoritative check, excluding the
    /// reservation's own row.
    pub async fn reschedule(
        &self,
        id: Uuid,
        seat_id: Option<Uuid>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Reservation, LifecycleError> {
        if start >= end {
            return Err(LifecycleError::InvalidWindow);
        }

        let mut reservation = self.fetch(id).await?;

        let status = effective_status(&reservation, Utc::now());
        if !matches!(
            status,
            ReservationStatus::Pending | ReservationStatus::Confirmed
        ) {
            return Err(LifecycleError::InvalidTransition {
                from: status.to_string(),
                to: "RESCHEDULED".to_string(),
            });
        }

        if let Some(new_seat) = seat_id {
            let taken = self
                .ledger
                .find_overlapping(reservation.resource_id, new_seat, start, end, Some(id))
                .await?;
            if taken {
                return Err(LifecycleError::Conflict);
            }
        }

        self.ledger.update_window(id, seat_id, start, end).await?;
        reservation.seat_id = seat_id;
        reservation.start_time = start;
        reservation.end_time = end;
        info!(reservation_id = %id, "Reservation rescheduled");
        Ok(reservation)
    }

    async fn fetch(&self, id: Uuid) -> Result<Reservation, LifecycleError> {
        self.ledger
            .find_by_id(id)
            .await?
            .ok_or(LifecycleError::NotFound(id))
    }
}

/// Completion is derived from time passage, never stored by the hot path:
/// a Pending or Confirmed reservation whose window has ended reads as
/// Completed.
pub fn effective_status(reservation: &Reservation, now: DateTime<Utc>) -> ReservationStatus {
    match reservation.status {
        ReservationStatus::Pending | ReservationStatus::Confirmed
            if reservation.end_time < now =>
        {
            ReservationStatus::Completed
        }
        status => status,
    }
}

pub fn is_completed(reservation: &Reservation, now: DateTime<Utc>) -> bool {
    effective_status(reservation, now) == ReservationStatus::Completed
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::reservation::{Reservation, ReservationStatus};
use crate::seat::Seat;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Reservation not found: {0}")]
    NotFound(Uuid),

    #[error("Reservation conflicts with an existing booking")]
    Conflict,

    #[error("Ledger backend failure: {0}")]
    Backend(String),
}

/// Durable reservation ledger. The engine only ever talks to the store
/// through this seam; everything behind it is an external collaborator.
#[async_trait]
pub trait ReservationLedger: Send + Sync {
    /// Authoritative conflict check: does any non-Cancelled reservation for
    /// this seat overlap `[start, end)`? `exclude_id` skips the caller's own
    /// row when re-checking an edit.
    async fn find_overlapping(
        &self,
        resource_id: Uuid,
        seat_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, LedgerError>;

    /// All non-Cancelled reservations for a resource overlapping the window,
    /// used to build the advisory occupancy view.
    async fn find_overlapping_reservations(
        &self,
        resource_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, LedgerError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, LedgerError>;

    async fn insert(&self, reservation: &Reservation) -> Result<(), LedgerError>;

    async fn update_status(&self, id: Uuid, status: ReservationStatus) -> Result<(), LedgerError>;

    async fn update_window(
        &self,
        id: Uuid,
        seat_id: Option<Uuid>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), LedgerError>;
}

/// Read-only seat access; seats are created and edited elsewhere.
#[async_trait]
pub trait SeatLedger: Send + Sync {
    async fn list_for_resource(&self, resource_id: Uuid) -> Result<Vec<Seat>, LedgerError>;
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub resource_id: Uuid,
    /// Absent for capacity-based resources with no seat map.
    pub seat_id: Option<Uuid>,
    pub user_id: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ReservationStatus,
    pub event_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
            ReservationStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(ReservationStatus::Pending),
            "CONFIRMED" => Some(ReservationStatus::Confirmed),
            "CANCELLED" => Some(ReservationStatus::Cancelled),
            "COMPLETED" => Some(ReservationStatus::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to a reservation commit. The lifecycle assigns id, status and
/// created_at; everything else comes from the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct ReservationDraft {
    pub resource_id: Uuid,
    pub seat_id: Option<Uuid>,
    pub user_id: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub event_id: Option<Uuid>,
}

impl ReservationDraft {
    /// Guests have no account; their reservations enter the lifecycle as
    /// Pending and wait for staff confirmation.
    pub fn is_guest(&self) -> bool {
        self.user_id.is_none()
    }
}

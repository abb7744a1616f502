use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Advisory in-memory claim on a seat for a time window. Never persisted;
/// the hold store is its only owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatHold {
    pub resource_id: Uuid,
    pub seat_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Opaque ownership key: a user id or an anonymous session token.
    pub holder_key: String,
    pub expires_at: DateTime<Utc>,
}

impl SeatHold {
    /// A hold is live until its expiry instant.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

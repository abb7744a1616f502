use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Change-notifier payload fanned out to live viewers of a resource.
/// Delivery is best-effort; nothing in the engine depends on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceEvent {
    HoldPlaced {
        resource_id: Uuid,
        seat_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    },
    HoldReleased {
        resource_id: Uuid,
        seat_id: Uuid,
    },
    SeatReserved {
        resource_id: Uuid,
        seat_id: Uuid,
        reservation_id: Uuid,
    },
}

impl ResourceEvent {
    pub fn resource_id(&self) -> Uuid {
        match self {
            ResourceEvent::HoldPlaced { resource_id, .. }
            | ResourceEvent::HoldReleased { resource_id, .. }
            | ResourceEvent::SeatReserved { resource_id, .. } => *resource_id,
        }
    }
}

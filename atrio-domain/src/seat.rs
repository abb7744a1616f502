use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Layout-level seat record. `is_available` is a static flag set by the
/// seat-map editor, not a live-occupancy indicator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub x: i32,
    pub y: i32,
    pub label: Option<String>,
    pub is_available: bool,
}

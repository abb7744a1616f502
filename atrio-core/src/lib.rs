pub mod conflict;
pub mod holds;
pub mod lifecycle;

pub use conflict::{occupied_seats, windows_overlap};
pub use holds::{HoldError, HoldStore};
pub use lifecycle::{effective_status, is_completed, LifecycleError, ReservationManager};

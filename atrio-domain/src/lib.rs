pub mod events;
pub mod hold;
pub mod repository;
pub mod reservation;
pub mod seat;

pub use events::ResourceEvent;
pub use hold::SeatHold;
pub use repository::{LedgerError, ReservationLedger, SeatLedger};
pub use reservation::{Reservation, ReservationDraft, ReservationStatus};
pub use seat::Seat;

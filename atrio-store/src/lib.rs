pub mod app_config;
pub mod database;
pub mod events;
pub mod reservation_repo;
pub mod seat_repo;

pub use database::DbClient;
pub use events::EventProducer;
pub use reservation_repo::ReservationRepository;
pub use seat_repo::SeatRepository;

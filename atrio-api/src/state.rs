use std::sync::Arc;

use tokio::sync::broadcast;

use atrio_core::{HoldStore, ReservationManager};
use atrio_domain::ResourceEvent;
use atrio_store::{app_config::BusinessRules, DbClient, EventProducer, ReservationRepository, SeatRepository};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbClient>,
    pub ledger: Arc<ReservationRepository>,
    pub seats: Arc<SeatRepository>,
    pub holds: Arc<HoldStore>,
    pub manager: Arc<ReservationManager>,
    pub events: Arc<EventProducer>,
    pub resource_tx: broadcast::Sender<ResourceEvent>,
    pub business_rules: BusinessRules,
}

use std::net::SocketAddr;
use std::sync::Arc;

use atrio_api::{app, AppState};
use atrio_core::{HoldStore, ReservationManager};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atrio_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = atrio_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Atrio API on port {}", config.server.port);

    let db = atrio_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");
    let db = Arc::new(db);

    let kafka = atrio_store::EventProducer::new(&config.kafka.brokers)
        .expect("Failed to create Kafka producer");

    let ledger = Arc::new(atrio_store::ReservationRepository::new(db.pool.clone()));
    let seats = Arc::new(atrio_store::SeatRepository::new(db.pool.clone()));

    // SSE fan-out channel; slow or absent subscribers just miss events.
    let (resource_tx, _) = tokio::sync::broadcast::channel(100);

    let app_state = AppState {
        db,
        ledger: ledger.clone(),
        seats,
        holds: Arc::new(HoldStore::new()),
        manager: Arc::new(ReservationManager::new(ledger)),
        events: Arc::new(kafka),
        resource_tx,
        business_rules: config.business_rules.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

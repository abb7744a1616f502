use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use atrio_domain::{Reservation, ReservationDraft, ResourceEvent};

use crate::error::{lifecycle_error, AppError};
use crate::holds::publish_event;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ReservationResponse {
    reservation_id: Uuid,
    status: String,
}

impl From<&Reservation> for ReservationResponse {
    fn from(reservation: &Reservation) -> Self {
        Self {
            reservation_id: reservation.id,
            status: reservation.status.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RescheduleRequest {
    seat_id: Option<Uuid>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/reservations", post(commit_reservation))
        .route("/v1/reservations/{id}/confirm", post(confirm_reservation))
        .route("/v1/reservations/{id}/cancel", post(cancel_reservation))
        .route("/v1/reservations/{id}/window", put(reschedule_reservation))
}

/// Commit a draft into the ledger. The hold (if the caller placed one) is
/// advisory and not consulted here; the ledger conflict check is the gate.
async fn commit_reservation(
    State(state): State<AppState>,
    Json(draft): Json<ReservationDraft>,
) -> Result<(StatusCode, Json<ReservationResponse>), AppError> {
    let reservation = state
        .manager
        .create(draft)
        .await
        .map_err(lifecycle_error)?;

    info!(reservation_id = %reservation.id, "Reservation committed: {}", reservation.status);

    if let Some(seat_id) = reservation.seat_id {
        let event = ResourceEvent::SeatReserved {
            resource_id: reservation.resource_id,
            seat_id,
            reservation_id: reservation.id,
        };
        publish_event(&state, "reservations.committed", event).await;
    }

    Ok((StatusCode::CREATED, Json((&reservation).into())))
}

async fn confirm_reservation(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state.manager.confirm(id).await.map_err(lifecycle_error)?;
    Ok(Json((&reservation).into()))
}

async fn cancel_reservation(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state.manager.cancel(id).await.map_err(lifecycle_error)?;
    Ok(Json((&reservation).into()))
}

async fn reschedule_reservation(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(req): Json<RescheduleRequest>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state
        .manager
        .reschedule(id, req.seat_id, req.start_time, req.end_time)
        .await
        .map_err(lifecycle_error)?;

    if let Some(seat_id) = reservation.seat_id {
        let event = ResourceEvent::SeatReserved {
            resource_id: reservation.resource_id,
            seat_id,
            reservation_id: reservation.id,
        };
        publish_event(&state, "reservations.rescheduled", event).await;
    }

    Ok(Json((&reservation).into()))
}

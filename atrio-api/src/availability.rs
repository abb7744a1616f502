use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atrio_core::occupied_seats;
use atrio_domain::{ReservationLedger, Seat, SeatLedger};

use crate::error::{ledger_error, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct AvailabilityQuery {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct AvailabilityResponse {
    seats: Vec<Seat>,
    occupied_seat_ids: Vec<Uuid>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/v1/resources/{resource_id}/availability",
        get(availability),
    )
}

/// Advisory occupancy: ledger reservations merged with live holds. This is
/// the view the seat map renders; commits are gated by the ledger-only check
/// instead.
async fn availability(
    Path(resource_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
    State(state): State<AppState>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    if query.start >= query.end {
        return Err(AppError::ValidationError(
            "start must precede end".to_string(),
        ));
    }

    let reservations = state
        .ledger
        .find_overlapping_reservations(resource_id, query.start, query.end)
        .await
        .map_err(ledger_error)?;

    let holds = state.holds.holds_for_resource(resource_id);
    let occupied = occupied_seats(&reservations, &holds, query.start, query.end);

    let seats = state
        .seats
        .list_for_resource(resource_id)
        .await
        .map_err(ledger_error)?;

    Ok(Json(AvailabilityResponse {
        seats,
        occupied_seat_ids: occupied.into_iter().collect(),
    }))
}

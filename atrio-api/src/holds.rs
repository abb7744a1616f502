use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use atrio_domain::ResourceEvent;

use crate::error::{hold_error, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct PlaceHoldRequest {
    resource_id: Uuid,
    seat_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    holder_key: String,
    ttl_seconds: Option<u64>,
}

#[derive(Debug, Serialize)]
struct PlaceHoldResponse {
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ReleaseHoldRequest {
    resource_id: Uuid,
    seat_id: Uuid,
    holder_key: String,
}

#[derive(Debug, Serialize)]
struct ReleaseHoldResponse {
    released: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/holds", post(place_hold).delete(release_hold))
        .route("/v1/resources/{resource_id}/stream", get(resource_stream))
}

async fn place_hold(
    State(state): State<AppState>,
    Json(req): Json<PlaceHoldRequest>,
) -> Result<(StatusCode, Json<PlaceHoldResponse>), AppError> {
    let ttl = state.business_rules.hold_ttl(req.ttl_seconds);

    let hold = state
        .holds
        .try_hold(
            req.resource_id,
            req.seat_id,
            req.start_time,
            req.end_time,
            &req.holder_key,
            ttl,
        )
        .map_err(hold_error)?;

    info!(resource_id = %req.resource_id, seat_id = %req.seat_id, "Seat held");

    let event = ResourceEvent::HoldPlaced {
        resource_id: req.resource_id,
        seat_id: req.seat_id,
        start_time: req.start_time,
        end_time: req.end_time,
    };
    publish_event(&state, "holds.placed", event).await;

    Ok((
        StatusCode::CREATED,
        Json(PlaceHoldResponse {
            expires_at: hold.expires_at,
        }),
    ))
}

async fn release_hold(
    State(state): State<AppState>,
    Json(req): Json<ReleaseHoldRequest>,
) -> Result<Json<ReleaseHoldResponse>, AppError> {
    let released = state
        .holds
        .release(req.resource_id, req.seat_id, &req.holder_key);

    if released {
        let event = ResourceEvent::HoldReleased {
            resource_id: req.resource_id,
            seat_id: req.seat_id,
        };
        publish_event(&state, "holds.released", event).await;
    }

    Ok(Json(ReleaseHoldResponse { released }))
}

/// Live feed of a resource's hold and reservation events, for viewers with
/// the seat map open.
async fn resource_stream(
    Path(resource_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.resource_tx.subscribe();

    let stream = tokio_stream::wrappers::BroadcastStream::new(rx).filter_map(move |result| {
        async move {
            match result {
                Ok(event) => {
                    if event.resource_id() == resource_id {
                        Some(Ok::<_, Infallible>(
                            Event::default()
                                .event("resource_event")
                                .data(serde_json::to_string(&event).unwrap()),
                        ))
                    } else {
                        None
                    }
                }
                Err(_) => None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Best-effort fan-out: Kafka for downstream consumers, the broadcast
/// channel for connected SSE viewers. Neither outcome affects the caller.
pub(crate) async fn publish_event(state: &AppState, topic: &str, event: ResourceEvent) {
    if let Ok(payload) = serde_json::to_string(&event) {
        let _ = state
            .events
            .publish(topic, &event.resource_id().to_string(), &payload)
            .await;
    }
    let _ = state.resource_tx.send(event);
}

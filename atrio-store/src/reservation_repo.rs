use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use atrio_domain::{LedgerError, Reservation, ReservationLedger, ReservationStatus};

/// Postgres-backed reservation ledger.
///
/// The `reservations` table carries an exclusion constraint over
/// (resource_id, seat_id, window) for non-cancelled rows, so a write racing
/// past the application-level conflict check still fails here instead of
/// double-booking the seat.
pub struct ReservationRepository {
    pool: Pool<Postgres>,
}

impl ReservationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_sqlx_error(err: sqlx::Error) -> LedgerError {
    if let Some(db_err) = err.as_database_error() {
        // 23P01: exclusion constraint violation, 23505: unique violation.
        if let Some(code) = db_err.code() {
            if code == "23P01" || code == "23505" {
                return LedgerError::Conflict;
            }
        }
    }
    LedgerError::Backend(err.to_string())
}

fn row_to_reservation(row: &PgRow) -> Result<Reservation, LedgerError> {
    let status_str: String = row
        .try_get("status")
        .map_err(|e| LedgerError::Backend(e.to_string()))?;
    let status = ReservationStatus::parse(&status_str)
        .ok_or_else(|| LedgerError::Backend(format!("Unknown reservation status: {status_str}")))?;

    Ok(Reservation {
        id: row.try_get("id").map_err(|e| LedgerError::Backend(e.to_string()))?,
        resource_id: row
            .try_get("resource_id")
            .map_err(|e| LedgerError::Backend(e.to_string()))?,
        seat_id: row
            .try_get("seat_id")
            .map_err(|e| LedgerError::Backend(e.to_string()))?,
        user_id: row
            .try_get("user_id")
            .map_err(|e| LedgerError::Backend(e.to_string()))?,
        guest_email: row
            .try_get("guest_email")
            .map_err(|e| LedgerError::Backend(e.to_string()))?,
        guest_phone: row
            .try_get("guest_phone")
            .map_err(|e| LedgerError::Backend(e.to_string()))?,
        start_time: row
            .try_get("start_time")
            .map_err(|e| LedgerError::Backend(e.to_string()))?,
        end_time: row
            .try_get("end_time")
            .map_err(|e| LedgerError::Backend(e.to_string()))?,
        status,
        event_id: row
            .try_get("event_id")
            .map_err(|e| LedgerError::Backend(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| LedgerError::Backend(e.to_string()))?,
    })
}

#[async_trait]
impl ReservationLedger for ReservationRepository {
    async fn find_overlapping(
        &self,
        resource_id: Uuid,
        seat_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, LedgerError> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM reservations
                WHERE resource_id = $1
                  AND seat_id = $2
                  AND status <> 'CANCELLED'
                  AND start_time < $4
                  AND end_time > $3
                  AND ($5::uuid IS NULL OR id <> $5)
            )
            "#,
        )
        .bind(resource_id)
        .bind(seat_id)
        .bind(start)
        .bind(end)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(taken)
    }

    async fn find_overlapping_reservations(
        &self,
        resource_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, LedgerError> {
        let rows = sqlx::query(
            r#"
            SELECT id, resource_id, seat_id, user_id, guest_email, guest_phone,
                   start_time, end_time, status, event_id, created_at
            FROM reservations
            WHERE resource_id = $1
              AND status <> 'CANCELLED'
              AND start_time < $3
              AND end_time > $2
            "#,
        )
        .bind(resource_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(row_to_reservation).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, LedgerError> {
        let row = sqlx::query(
            r#"
            SELECT id, resource_id, seat_id, user_id, guest_email, guest_phone,
                   start_time, end_time, status, event_id, created_at
            FROM reservations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_reservation).transpose()
    }

    async fn insert(&self, reservation: &Reservation) -> Result<(), LedgerError> {
        sqlx::query(
            r#"
            INSERT INTO reservations
                (id, resource_id, seat_id, user_id, guest_email, guest_phone,
                 start_time, end_time, status, event_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(reservation.id)
        .bind(reservation.resource_id)
        .bind(reservation.seat_id)
        .bind(&reservation.user_id)
        .bind(&reservation.guest_email)
        .bind(&reservation.guest_phone)
        .bind(reservation.start_time)
        .bind(reservation.end_time)
        .bind(reservation.status.as_str())
        .bind(reservation.event_id)
        .bind(reservation.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: ReservationStatus) -> Result<(), LedgerError> {
        let result = sqlx::query(
            r#"
            UPDATE reservations SET status = $1 WHERE id = $2
            "#,
        )
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::NotFound(id));
        }
        Ok(())
    }

    async fn update_window(
        &self,
        id: Uuid,
        seat_id: Option<Uuid>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET seat_id = $1, start_time = $2, end_time = $3
            WHERE id = $4
            "#,
        )
        .bind(seat_id)
        .bind(start)
        .bind(end)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::NotFound(id));
        }
        Ok(())
    }
}

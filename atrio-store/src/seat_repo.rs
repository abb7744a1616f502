use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use atrio_domain::{LedgerError, Seat, SeatLedger};

/// Read-only seat access. Seat maps are created and edited by the layout
/// tooling; this engine only renders them.
pub struct SeatRepository {
    pool: Pool<Postgres>,
}

impl SeatRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeatLedger for SeatRepository {
    async fn list_for_resource(&self, resource_id: Uuid) -> Result<Vec<Seat>, LedgerError> {
        let rows = sqlx::query(
            r#"
            SELECT id, resource_id, x, y, label, is_available
            FROM seats
            WHERE resource_id = $1
            ORDER BY y, x
            "#,
        )
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LedgerError::Backend(e.to_string()))?;

        rows.iter()
            .map(|row| {
                Ok(Seat {
                    id: row.try_get("id").map_err(|e| LedgerError::Backend(e.to_string()))?,
                    resource_id: row
                        .try_get("resource_id")
                        .map_err(|e| LedgerError::Backend(e.to_string()))?,
                    x: row.try_get("x").map_err(|e| LedgerError::Backend(e.to_string()))?,
                    y: row.try_get("y").map_err(|e| LedgerError::Backend(e.to_string()))?,
                    label: row
                        .try_get("label")
                        .map_err(|e| LedgerError::Backend(e.to_string()))?,
                    is_available: row
                        .try_get("is_available")
                        .map_err(|e| LedgerError::Backend(e.to_string()))?,
                })
            })
            .collect()
    }
}

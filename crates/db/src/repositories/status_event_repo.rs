//! Repository for the `dossier_status_events` table (append-only).

use dossier_core::types::{DbId, Timestamp};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::status_event::StatusEventRow;

const COLUMNS: &str = "id, dossier_id, status, at";

pub struct StatusEventRepo;

impl StatusEventRepo {
    pub async fn append(
        tx: &mut Transaction<'_, Postgres>,
        dossier_id: DbId,
        status: &str,
        at: Timestamp,
    ) -> Result<StatusEventRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO dossier_status_events (dossier_id, status, at) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StatusEventRow>(&query)
            .bind(dossier_id)
            .bind(status)
            .bind(at)
            .fetch_one(&mut **tx)
            .await
    }

    /// Most recent event of a dossier.
    pub async fn last_for_dossier(
        tx: &mut Transaction<'_, Postgres>,
        dossier_id: DbId,
    ) -> Result<Option<StatusEventRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM dossier_status_events WHERE dossier_id = $1 \
             ORDER BY id DESC LIMIT 1"
        );
        sqlx::query_as::<_, StatusEventRow>(&query)
            .bind(dossier_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Events of a dossier in insertion order.
    pub async fn list_for_dossier(
        pool: &PgPool,
        dossier_id: DbId,
    ) -> Result<Vec<StatusEventRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM dossier_status_events WHERE dossier_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, StatusEventRow>(&query)
            .bind(dossier_id)
            .fetch_all(pool)
            .await
    }
}

//! Repository for the `dossier_messages` table (append-only).

use dossier_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::message::MessageRow;

const COLUMNS: &str = "id, dossier_id, sender, text, created_at";

pub struct MessageRepo;

impl MessageRepo {
    pub async fn create(
        pool: &PgPool,
        dossier_id: DbId,
        sender: &str,
        text: &str,
        created_at: Timestamp,
    ) -> Result<MessageRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO dossier_messages (dossier_id, sender, text, created_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MessageRow>(&query)
            .bind(dossier_id)
            .bind(sender)
            .bind(text)
            .bind(created_at)
            .fetch_one(pool)
            .await
    }

    /// Messages of a dossier, oldest first.
    pub async fn list_for_dossier(
        pool: &PgPool,
        dossier_id: DbId,
    ) -> Result<Vec<MessageRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM dossier_messages WHERE dossier_id = $1 ORDER BY id");
        sqlx::query_as::<_, MessageRow>(&query)
            .bind(dossier_id)
            .fetch_all(pool)
            .await
    }
}

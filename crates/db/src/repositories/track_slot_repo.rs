//! Repository for the `track_slots` table.
//!
//! The draft and its status key are written together under a row lock.
//! Progress is upserted on its own.

use sqlx::{PgPool, Postgres, Transaction};

use crate::models::track_slot::TrackSlotRow;

const COLUMNS: &str = "track, draft, status, progress, updated_at";

pub struct TrackSlotRepo;

impl TrackSlotRepo {
    pub async fn find(pool: &PgPool, track: &str) -> Result<Option<TrackSlotRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM track_slots WHERE track = $1");
        sqlx::query_as::<_, TrackSlotRow>(&query)
            .bind(track)
            .fetch_optional(pool)
            .await
    }

    /// Lock the slot row until the transaction ends, creating an empty row
    /// first if the slot has never been written.
    pub async fn lock(
        tx: &mut Transaction<'_, Postgres>,
        track: &str,
    ) -> Result<TrackSlotRow, sqlx::Error> {
        sqlx::query("INSERT INTO track_slots (track) VALUES ($1) ON CONFLICT (track) DO NOTHING")
            .bind(track)
            .execute(&mut **tx)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM track_slots WHERE track = $1 FOR UPDATE");
        sqlx::query_as::<_, TrackSlotRow>(&query)
            .bind(track)
            .fetch_one(&mut **tx)
            .await
    }

    /// Store the draft and its status key of a row locked with [`Self::lock`].
    pub async fn set_draft(
        tx: &mut Transaction<'_, Postgres>,
        track: &str,
        draft: &serde_json::Value,
        status: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE track_slots SET draft = $2, status = $3, updated_at = NOW() \
             WHERE track = $1",
        )
        .bind(track)
        .bind(draft)
        .bind(status)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn set_progress(pool: &PgPool, track: &str, progress: i32) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO track_slots (track, progress) VALUES ($1, $2) \
             ON CONFLICT (track) DO UPDATE SET progress = EXCLUDED.progress, updated_at = NOW()",
        )
        .bind(track)
        .bind(progress)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Delete the slot. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, track: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM track_slots WHERE track = $1")
            .bind(track)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

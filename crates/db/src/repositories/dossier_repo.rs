//! Repository for the `dossiers` table.

use dossier_core::types::{DbId, Timestamp};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::dossier::{CreateDossier, DossierRow};

/// Column list for `dossiers` queries.
const COLUMNS: &str = "\
    id, owner_id, owner_email, track, status, draft, progress, \
    created_at, updated_at";

/// Provides CRUD operations for dossiers. Rows are never deleted.
pub struct DossierRepo;

impl DossierRepo {
    /// Insert a new dossier, returning the full row.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        input: &CreateDossier,
    ) -> Result<DossierRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO dossiers \
                (owner_id, owner_email, track, status, draft, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DossierRow>(&query)
            .bind(input.owner_id)
            .bind(&input.owner_email)
            .bind(&input.track)
            .bind(&input.status)
            .bind(&input.draft)
            .bind(input.created_at)
            .bind(input.updated_at)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a dossier by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DossierRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dossiers WHERE id = $1");
        sqlx::query_as::<_, DossierRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a dossier and lock its row until the transaction ends.
    pub async fn lock_by_id(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<DossierRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dossiers WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, DossierRow>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Replace the draft and its denormalized status of a row locked with
    /// [`Self::lock_by_id`].
    pub async fn update_draft(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        status: &str,
        draft: &serde_json::Value,
        updated_at: Timestamp,
    ) -> Result<DossierRow, sqlx::Error> {
        let query = format!(
            "UPDATE dossiers SET status = $2, draft = $3, updated_at = $4 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DossierRow>(&query)
            .bind(id)
            .bind(status)
            .bind(draft)
            .bind(updated_at)
            .fetch_one(&mut **tx)
            .await
    }

    /// Store the onboarding step index. Returns `true` if a row was updated.
    pub async fn update_progress(pool: &PgPool, id: DbId, step: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE dossiers SET progress = $2 WHERE id = $1")
            .bind(id)
            .bind(step)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List dossiers of one owner, oldest first.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<DossierRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dossiers WHERE owner_id = $1 ORDER BY id");
        sqlx::query_as::<_, DossierRow>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// List every dossier, oldest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<DossierRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dossiers ORDER BY id");
        sqlx::query_as::<_, DossierRow>(&query)
            .fetch_all(pool)
            .await
    }
}

//! Repository for the `promo_codes` table.

use sqlx::PgPool;

use crate::models::promo_code::PromoCodeRow;

const COLUMNS: &str = "code, promo_type, value, active, note, created_at, updated_at";

pub struct PromoCodeRepo;

impl PromoCodeRepo {
    /// Insert or replace a promo code by its (normalized) code.
    pub async fn upsert(
        pool: &PgPool,
        code: &str,
        promo_type: &str,
        value: f64,
        active: bool,
        note: Option<&str>,
    ) -> Result<PromoCodeRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO promo_codes (code, promo_type, value, active, note) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (code) DO UPDATE SET \
                promo_type = EXCLUDED.promo_type, \
                value = EXCLUDED.value, \
                active = EXCLUDED.active, \
                note = EXCLUDED.note, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PromoCodeRow>(&query)
            .bind(code)
            .bind(promo_type)
            .bind(value)
            .bind(active)
            .bind(note)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<PromoCodeRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM promo_codes WHERE code = $1");
        sqlx::query_as::<_, PromoCodeRow>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<PromoCodeRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM promo_codes ORDER BY code");
        sqlx::query_as::<_, PromoCodeRow>(&query)
            .fetch_all(pool)
            .await
    }
}

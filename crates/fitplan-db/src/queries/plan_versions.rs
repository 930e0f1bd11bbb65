//! Database query functions for the `plan_versions` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::debug;

use crate::models::{PlanKind, PlanVersion};

/// Insert a new active version for `(user_id, kind)`.
///
/// Runs as one transaction:
/// 1. take a transaction-scoped advisory lock keyed on the pair, so
///    concurrent writers for the same pair serialize;
/// 2. deactivate every existing version for the pair;
/// 3. insert `max(version) + 1` (or 1) as the active row.
///
/// Earlier rows are never deleted. If any step fails the transaction rolls
/// back and the previous active version stays active.
pub async fn insert_version(
    pool: &PgPool,
    user_id: i64,
    kind: PlanKind,
    payload: &serde_json::Value,
) -> Result<PlanVersion> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(lock_key(user_id, kind))
        .execute(&mut *tx)
        .await
        .context("failed to acquire plan version lock")?;

    let deactivated = sqlx::query(
        "UPDATE plan_versions SET active = FALSE \
         WHERE user_id = $1 AND kind = $2 AND active",
    )
    .bind(user_id)
    .bind(kind)
    .execute(&mut *tx)
    .await
    .context("failed to deactivate previous plan versions")?
    .rows_affected();

    let record = sqlx::query_as::<_, PlanVersion>(
        "INSERT INTO plan_versions (user_id, kind, version, active, payload) \
         VALUES ( \
             $1, $2, \
             (SELECT COALESCE(MAX(version), 0) + 1 FROM plan_versions \
              WHERE user_id = $1 AND kind = $2), \
             TRUE, $3 \
         ) \
         RETURNING *",
    )
    .bind(user_id)
    .bind(kind)
    .bind(payload)
    .fetch_one(&mut *tx)
    .await
    .context("failed to insert plan version")?;

    tx.commit().await.context("failed to commit transaction")?;

    debug!(
        user_id,
        kind = %kind,
        version = record.version,
        deactivated,
        "plan version inserted"
    );
    Ok(record)
}

/// The most recently created version for the pair, active or not.
pub async fn get_latest(pool: &PgPool, user_id: i64, kind: PlanKind) -> Result<Option<PlanVersion>> {
    sqlx::query_as::<_, PlanVersion>(
        "SELECT * FROM plan_versions \
         WHERE user_id = $1 AND kind = $2 \
         ORDER BY created_at DESC, version DESC \
         LIMIT 1",
    )
    .bind(user_id)
    .bind(kind)
    .fetch_optional(pool)
    .await
    .context("failed to fetch latest plan version")
}

/// The version currently flagged active for the pair, if any.
pub async fn get_active(pool: &PgPool, user_id: i64, kind: PlanKind) -> Result<Option<PlanVersion>> {
    sqlx::query_as::<_, PlanVersion>(
        "SELECT * FROM plan_versions WHERE user_id = $1 AND kind = $2 AND active",
    )
    .bind(user_id)
    .bind(kind)
    .fetch_optional(pool)
    .await
    .context("failed to fetch active plan version")
}

/// Fetch one specific version number.
pub async fn get_version(
    pool: &PgPool,
    user_id: i64,
    kind: PlanKind,
    version: i32,
) -> Result<Option<PlanVersion>> {
    sqlx::query_as::<_, PlanVersion>(
        "SELECT * FROM plan_versions WHERE user_id = $1 AND kind = $2 AND version = $3",
    )
    .bind(user_id)
    .bind(kind)
    .bind(version)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to fetch {kind} plan version {version}"))
}

/// Full history for the pair, newest version first.
pub async fn list_versions(pool: &PgPool, user_id: i64, kind: PlanKind) -> Result<Vec<PlanVersion>> {
    sqlx::query_as::<_, PlanVersion>(
        "SELECT * FROM plan_versions \
         WHERE user_id = $1 AND kind = $2 \
         ORDER BY version DESC",
    )
    .bind(user_id)
    .bind(kind)
    .fetch_all(pool)
    .await
    .context("failed to list plan versions")
}

/// Number of versions ever stored for the pair.
pub async fn count_versions(pool: &PgPool, user_id: i64, kind: PlanKind) -> Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM plan_versions WHERE user_id = $1 AND kind = $2")
        .bind(user_id)
        .bind(kind)
        .fetch_one(pool)
        .await
        .context("failed to count plan versions")
}

fn lock_key(user_id: i64, kind: PlanKind) -> String {
    format!("plan_versions:{user_id}:{kind}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_key_differs_per_kind_and_user() {
        assert_ne!(lock_key(1, PlanKind::Meal), lock_key(1, PlanKind::Workout));
        assert_ne!(lock_key(1, PlanKind::Meal), lock_key(2, PlanKind::Meal));
        assert_eq!(lock_key(7, PlanKind::Workout), "plan_versions:7:workout");
    }
}

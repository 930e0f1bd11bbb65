//! Versioned plan persistence on top of `fitplan_db`.
//!
//! Thin typed layer: plans go in as [`Plan`] and come out as
//! [`PlanVersion`] records whose payload decodes back to a [`Plan`]. All
//! database errors surface as [`PlanError::Persistence`].

use anyhow::Context;
use fitplan_db::models::{PlanKind, PlanVersion};
use fitplan_db::queries::plan_versions;
use sqlx::PgPool;

use crate::error::PlanError;
use crate::model::Plan;

#[derive(Debug, Clone)]
pub struct PlanVersionStore {
    pool: PgPool,
}

impl PlanVersionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Save `plan` as the new active version for `(user_id, plan.kind())`.
    ///
    /// Prior versions for the pair are deactivated in the same transaction;
    /// see [`plan_versions::insert_version`].
    pub async fn save(&self, user_id: i64, plan: &Plan) -> Result<PlanVersion, PlanError> {
        let payload = serde_json::to_value(plan)
            .context("failed to serialize plan")
            .map_err(PlanError::Persistence)?;
        plan_versions::insert_version(&self.pool, user_id, plan.kind(), &payload)
            .await
            .map_err(PlanError::Persistence)
    }

    /// Newest version by creation time, active or not.
    pub async fn get_latest(
        &self,
        user_id: i64,
        kind: PlanKind,
    ) -> Result<Option<PlanVersion>, PlanError> {
        plan_versions::get_latest(&self.pool, user_id, kind)
            .await
            .map_err(PlanError::Persistence)
    }

    pub async fn get_active(
        &self,
        user_id: i64,
        kind: PlanKind,
    ) -> Result<Option<PlanVersion>, PlanError> {
        plan_versions::get_active(&self.pool, user_id, kind)
            .await
            .map_err(PlanError::Persistence)
    }

    /// All versions for the pair, newest first.
    pub async fn list_history(
        &self,
        user_id: i64,
        kind: PlanKind,
    ) -> Result<Vec<PlanVersion>, PlanError> {
        plan_versions::list_versions(&self.pool, user_id, kind)
            .await
            .map_err(PlanError::Persistence)
    }

    pub async fn get_version(
        &self,
        user_id: i64,
        kind: PlanKind,
        version: i32,
    ) -> Result<Option<PlanVersion>, PlanError> {
        plan_versions::get_version(&self.pool, user_id, kind, version)
            .await
            .map_err(PlanError::Persistence)
    }

    pub async fn count_for_user(&self, user_id: i64, kind: PlanKind) -> Result<i64, PlanError> {
        plan_versions::count_versions(&self.pool, user_id, kind)
            .await
            .map_err(PlanError::Persistence)
    }
}

/// Decode a stored payload back into a [`Plan`].
///
/// Fails if the payload does not deserialize or its kind disagrees with the
/// record's.
pub fn decode_plan(record: &PlanVersion) -> Result<Plan, PlanError> {
    let plan: Plan = serde_json::from_value(record.payload.clone())
        .with_context(|| {
            format!(
                "stored {} plan v{} for user {} does not decode",
                record.kind, record.version, record.user_id
            )
        })
        .map_err(PlanError::Persistence)?;
    if plan.kind() != record.kind {
        return Err(PlanError::Persistence(anyhow::anyhow!(
            "stored plan {} is tagged {} but recorded as {}",
            record.id,
            plan.kind(),
            record.kind
        )));
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn record(kind: PlanKind, payload: serde_json::Value) -> PlanVersion {
        PlanVersion {
            id: Uuid::new_v4(),
            user_id: 1,
            kind,
            version: 1,
            active: true,
            payload,
            created_at: Utc::now(),
        }
    }

    fn workout_payload() -> serde_json::Value {
        json!({
            "kind": "workout",
            "meta": {
                "created_at": "2026-03-01T08:00:00Z",
                "generator": "stub",
                "generator_version": "1",
                "language": "en",
                "disclaimer": "x"
            },
            "preferences": {},
            "days": []
        })
    }

    #[test]
    fn decodes_matching_payload() {
        let plan = decode_plan(&record(PlanKind::Workout, workout_payload())).unwrap();
        assert_eq!(plan.kind(), PlanKind::Workout);
        assert_eq!(plan.meta().generator, "stub");
    }

    #[test]
    fn rejects_kind_mismatch_and_garbage() {
        let mismatch = decode_plan(&record(PlanKind::Meal, workout_payload())).unwrap_err();
        assert!(matches!(mismatch, PlanError::Persistence(_)));

        let garbage = decode_plan(&record(PlanKind::Meal, json!({"kind": "meal"}))).unwrap_err();
        assert!(garbage.to_string().contains("does not decode"));
    }
}

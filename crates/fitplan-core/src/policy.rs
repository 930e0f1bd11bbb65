//! Lifetime generation limits.
//!
//! For a limited kind a user may generate exactly one plan, ever: once any
//! version exists for `(user, kind)`, further generation is refused. The
//! check runs before generation and is not atomic with the later save, so
//! two concurrent first requests can both pass it.

use std::collections::HashSet;

use fitplan_db::models::PlanKind;
use tracing::info;

use crate::error::PlanError;
use crate::store::PlanVersionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifetimePolicy {
    limited: HashSet<PlanKind>,
}

impl LifetimePolicy {
    pub fn new(limited: impl IntoIterator<Item = PlanKind>) -> Self {
        Self {
            limited: limited.into_iter().collect(),
        }
    }

    /// No limits at all.
    pub fn unlimited() -> Self {
        Self {
            limited: HashSet::new(),
        }
    }

    pub fn is_limited(&self, kind: PlanKind) -> bool {
        self.limited.contains(&kind)
    }

    /// Refuse with [`PlanError::Policy`] if `kind` is limited and the user
    /// already has a version of it.
    pub async fn check(
        &self,
        store: &PlanVersionStore,
        user_id: i64,
        kind: PlanKind,
    ) -> Result<(), PlanError> {
        if !self.is_limited(kind) {
            return Ok(());
        }
        let existing = store.count_for_user(user_id, kind).await?;
        if existing > 0 {
            info!(user_id, kind = %kind, existing, "generation refused by lifetime policy");
            return Err(PlanError::Policy { user_id, kind });
        }
        Ok(())
    }
}

/// Workout plans are once per lifetime; meal plans are unlimited.
impl Default for LifetimePolicy {
    fn default() -> Self {
        Self::new([PlanKind::Workout])
    }
}

//! End-to-end plan generation.
//!
//! [`PlanService`] runs one request through input checks, the lifetime
//! policy, generation (external generator or the mock planner), candidate
//! validation, derived aggregates and persistence.
//!
//! ```text
//! request --check--> policy --generate--> candidate --validate/coerce--> Plan
//!                                                                          |
//!                                                   save (best effort) <---+
//! ```
//!
//! Persistence is best effort: if the save fails after a plan was
//! produced, the failure is logged and reported in the
//! [`GenerationOutcome`] and the plan is still returned.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use fitplan_db::models::{PlanKind, PlanVersion};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{info, warn};

use crate::candidate::{self, CandidateSchema};
use crate::catalog::Catalog;
use crate::error::PlanError;
use crate::generator::{GenerationRequest, PlanGenerator};
use crate::meal::{self, aggregate};
use crate::model::{
    DayPlan, Language, MealPlan, MealPlanRequest, Plan, PlanMeta, WorkoutPlan, WorkoutPlanRequest,
};
use crate::policy::LifetimePolicy;
use crate::render::{self, Document, RenderOptions};
use crate::store::{PlanVersionStore, decode_plan};

/// Result of a generation request that produced a plan.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub plan: Plan,
    /// The stored version, or `None` if saving failed.
    pub record: Option<PlanVersion>,
    /// Why saving failed, when it did.
    pub persistence_error: Option<String>,
}

impl GenerationOutcome {
    pub fn persisted(&self) -> bool {
        self.record.is_some()
    }
}

/// Result of rebuilding one day of a meal plan.
#[derive(Debug, Clone, Serialize)]
pub struct DayRegeneration {
    pub day: DayPlan,
    /// The new version of the stored plan the day was spliced into, if any.
    pub record: Option<PlanVersion>,
    /// Why saving the spliced plan failed, when it did.
    pub persistence_error: Option<String>,
}

impl DayRegeneration {
    pub fn persisted(&self) -> bool {
        self.record.is_some()
    }
}

pub struct PlanService {
    store: PlanVersionStore,
    catalog: Arc<Catalog>,
    generator: Option<Arc<dyn PlanGenerator>>,
    policy: LifetimePolicy,
    rng: Mutex<StdRng>,
}

impl PlanService {
    /// A service with no external generator, the default lifetime policy
    /// and an OS-seeded RNG.
    pub fn new(store: PlanVersionStore, catalog: Arc<Catalog>) -> Self {
        Self {
            store,
            catalog,
            generator: None,
            policy: LifetimePolicy::default(),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn PlanGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_policy(mut self, policy: LifetimePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fix the mock planner's RNG seed, for reproducible plans.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn store(&self) -> &PlanVersionStore {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Generate, validate and save a week of meals for `user_id`.
    ///
    /// Uses the external generator when one is configured and the mock
    /// planner otherwise.
    pub async fn generate_meal_plan(
        &self,
        user_id: i64,
        request: &MealPlanRequest,
    ) -> Result<GenerationOutcome, PlanError> {
        request.check()?;
        self.policy.check(&self.store, user_id, PlanKind::Meal).await?;

        let plan = match &self.generator {
            Some(generator) => self.meal_from_generator(generator.as_ref(), request).await?,
            None => {
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                meal::generate_meal_plan(request, &self.catalog, Utc::now(), &mut *rng)
            }
        };
        info!(
            user_id,
            generator = %plan.meta.generator,
            days = plan.days.len(),
            "meal plan generated"
        );

        Ok(self.persist(user_id, Plan::Meal(plan)).await)
    }

    /// Rebuild day `day` (1-based) of a meal plan with the built-in planner.
    ///
    /// If the user has a stored meal plan, the new day replaces the one with
    /// the same number, the shopping list is rebuilt and the result is saved
    /// as a new version (best effort, as for generation). Otherwise the day
    /// is only returned. The lifetime policy does not apply: no new plan is
    /// generated.
    pub async fn regenerate_meal_day(
        &self,
        user_id: i64,
        day: u32,
        request: &MealPlanRequest,
    ) -> Result<DayRegeneration, PlanError> {
        request.check()?;
        if !(1..=request.day_count).contains(&day) {
            return Err(PlanError::input(format!(
                "day must be between 1 and {}, got {day}",
                request.day_count
            )));
        }

        let regenerated = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            meal::generate_day(day, request, &self.catalog, &mut *rng)
        };
        info!(user_id, day, meals = regenerated.meals.len(), "meal day regenerated");

        let Some((_, Plan::Meal(mut plan))) = self.latest(user_id, PlanKind::Meal).await? else {
            return Ok(DayRegeneration {
                day: regenerated,
                record: None,
                persistence_error: None,
            });
        };

        match plan.days.iter_mut().find(|d| d.day == day) {
            Some(existing) => *existing = regenerated.clone(),
            None => {
                plan.days.push(regenerated.clone());
                plan.days.sort_by_key(|d| d.day);
            }
        }
        plan.shopping_list = aggregate(&plan.days, &self.catalog.categories);
        plan.meta.created_at = Utc::now();

        let outcome = self.persist(user_id, Plan::Meal(plan)).await;
        Ok(DayRegeneration {
            day: regenerated,
            record: outcome.record,
            persistence_error: outcome.persistence_error,
        })
    }

    async fn meal_from_generator(
        &self,
        generator: &dyn PlanGenerator,
        request: &MealPlanRequest,
    ) -> Result<MealPlan, PlanError> {
        let prefs = &request.preferences;
        let schema =
            CandidateSchema::meal(request.day_count as usize, prefs.slot_labels().len());
        let candidate = self
            .call_generator(generator, GenerationRequest::Meal(request), &schema)
            .await?;
        let days = candidate::coerce_meal_days(candidate, &request.targets)?;
        let shopping_list = aggregate(&days, &self.catalog.categories);

        Ok(MealPlan {
            meta: meta(generator, prefs.language),
            preferences: prefs.clone(),
            targets: request.targets,
            days,
            shopping_list,
        })
    }

    /// Generate, validate and save a workout plan for `user_id`.
    ///
    /// Requires an external generator; there is no offline fallback for
    /// workouts.
    pub async fn generate_workout_plan(
        &self,
        user_id: i64,
        request: &WorkoutPlanRequest,
    ) -> Result<GenerationOutcome, PlanError> {
        request.check()?;
        let generator = self
            .generator
            .as_deref()
            .ok_or(PlanError::GeneratorUnavailable(PlanKind::Workout))?;
        self.policy.check(&self.store, user_id, PlanKind::Workout).await?;

        let schema = CandidateSchema::workout(request.day_count as usize);
        let candidate = self
            .call_generator(generator, GenerationRequest::Workout(request), &schema)
            .await?;
        let days = candidate::coerce_workout_days(candidate)?;

        let plan = WorkoutPlan {
            meta: meta(generator, request.preferences.language),
            preferences: request.preferences.clone(),
            days,
        };
        info!(
            user_id,
            generator = %plan.meta.generator,
            days = plan.days.len(),
            "workout plan generated"
        );

        Ok(self.persist(user_id, Plan::Workout(plan)).await)
    }

    async fn call_generator(
        &self,
        generator: &dyn PlanGenerator,
        request: GenerationRequest<'_>,
        schema: &CandidateSchema,
    ) -> Result<serde_json::Value, PlanError> {
        let output = generator
            .generate(request)
            .await
            .map_err(|source| PlanError::Generator {
                generator: generator.name().to_owned(),
                source,
            })?;

        candidate::parse_output(output)
            .and_then(|value| candidate::validate(value, schema))
            .map_err(|e| {
                warn!(
                    generator = generator.name(),
                    kind = %schema.kind,
                    error = %e,
                    "generated plan rejected"
                );
                PlanError::Validation(e)
            })
    }

    async fn persist(&self, user_id: i64, plan: Plan) -> GenerationOutcome {
        match self.store.save(user_id, &plan).await {
            Ok(record) => {
                info!(
                    user_id,
                    kind = %record.kind,
                    version = record.version,
                    "plan saved"
                );
                GenerationOutcome {
                    plan,
                    record: Some(record),
                    persistence_error: None,
                }
            }
            Err(e) => {
                warn!(
                    user_id,
                    kind = %plan.kind(),
                    error = %e,
                    "failed to save generated plan; returning it unsaved"
                );
                GenerationOutcome {
                    plan,
                    record: None,
                    persistence_error: Some(e.to_string()),
                }
            }
        }
    }

    /// Newest stored plan of `kind` for the user, decoded.
    pub async fn latest(
        &self,
        user_id: i64,
        kind: PlanKind,
    ) -> Result<Option<(PlanVersion, Plan)>, PlanError> {
        match self.store.get_latest(user_id, kind).await? {
            Some(record) => {
                let plan = decode_plan(&record)?;
                Ok(Some((record, plan)))
            }
            None => Ok(None),
        }
    }

    /// Every stored version of `kind` for the user, newest first.
    pub async fn history(&self, user_id: i64, kind: PlanKind) -> Result<Vec<PlanVersion>, PlanError> {
        self.store.list_history(user_id, kind).await
    }

    /// Render the newest stored plan of `kind`, if any.
    pub async fn render_latest(
        &self,
        user_id: i64,
        kind: PlanKind,
        options: &RenderOptions,
    ) -> Result<Option<Document>, PlanError> {
        Ok(self
            .latest(user_id, kind)
            .await?
            .map(|(_, plan)| render::render(&plan, options)))
    }
}

fn meta(generator: &dyn PlanGenerator, language: Language) -> PlanMeta {
    PlanMeta {
        created_at: Utc::now(),
        generator: generator.name().to_owned(),
        generator_version: generator.version().to_owned(),
        language,
        disclaimer: language.disclaimer().to_owned(),
    }
}

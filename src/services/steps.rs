//! Step service - evolution and financial roadmaps of an idea
//!
//! Bulk creation is all or nothing. Priorities are unique per idea; a clash
//! surfaces as `Conflict("invalid priority: N")` and rolls back the batch.

use std::sync::Arc;

use diesel::SqliteConnection;
use serde::Deserialize;

use crate::config::LimitArgs;
use crate::db::models::{
    current_timestamp, new_id, EvolutionStep, EvolutionStepChangeset, FinancialStep,
    FinancialStepChangeset,
};
use crate::db::{steps, Database};
use crate::types::IdeagramError;
use crate::validation::Validator;

use super::events::{DomainEvent, EventBus};
use super::ideas::{owned_idea, visible_idea};
use super::Actor;

const EVOLUTION_STEP_NOT_FOUND: &str = "No evolutionary step found with this uuid!";
const FINANCIAL_STEP_NOT_FOUND: &str = "No financial step found with this uuid!";

#[derive(Debug, Clone, Deserialize)]
pub struct EvolutionStepInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub finish_date: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvolutionStepUpdate {
    pub title: Option<String>,
    pub finish_date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FinancialStepInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub cost: i64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinancialStepUpdate {
    pub title: Option<String>,
    pub cost: Option<i64>,
    pub unit: Option<String>,
    pub description: Option<String>,
}

pub struct StepService {
    db: Database,
    events: Arc<EventBus>,
    limits: LimitArgs,
}

impl StepService {
    pub fn new(db: Database, events: Arc<EventBus>, limits: LimitArgs) -> Self {
        Self { db, events, limits }
    }

    // =========================================================================
    // Evolution steps
    // =========================================================================

    pub fn list_evolution(&self, actor: &Actor, idea_id: &str) -> Result<Vec<EvolutionStep>, IdeagramError> {
        self.db.with_conn(|conn| {
            let idea = visible_idea(conn, actor, idea_id)?;
            steps::list_evolution_steps(conn, &idea.id)
        })
    }

    pub fn create_evolution(
        &self,
        actor: &Actor,
        idea_id: &str,
        inputs: Vec<EvolutionStepInput>,
    ) -> Result<Vec<EvolutionStep>, IdeagramError> {
        let mut v = Validator::new();
        for input in &inputs {
            validate_step_text(&mut v, &input.title, &input.description);
            if let Some(finish_date) = &input.finish_date {
                v.date("finish_date", finish_date);
            }
            validate_priority(&mut v, input.priority, self.limits.max_evolutionary_steps_count);
        }
        v.finish()?;

        let created = self.db.transaction(|conn| {
            let idea = owned_idea(conn, actor, idea_id)?;
            let now = current_timestamp();
            let mut created = Vec::with_capacity(inputs.len());
            for input in inputs {
                let step = EvolutionStep {
                    id: new_id(),
                    idea_id: idea.id.clone(),
                    title: input.title,
                    finish_date: input.finish_date,
                    description: input.description,
                    priority: input.priority,
                    created_at: now.clone(),
                    updated_at: now.clone(),
                };
                steps::insert_evolution_step(conn, &step)
                    .map_err(|e| priority_clash(e, step.priority))?;
                created.push(step);
            }
            Ok(created)
        })?;

        self.events.emit(DomainEvent::StepsCreated {
            idea_id: idea_id.to_string(),
            kind: "evolution",
            count: created.len(),
        });
        Ok(created)
    }

    /// Update title, finish date or description; priority stays fixed
    pub fn update_evolution(
        &self,
        actor: &Actor,
        step_id: &str,
        input: EvolutionStepUpdate,
    ) -> Result<EvolutionStep, IdeagramError> {
        let mut v = Validator::new();
        if let Some(title) = &input.title {
            v.required("title", title);
            v.max_len("title", title, 100);
        }
        if let Some(finish_date) = &input.finish_date {
            v.date("finish_date", finish_date);
        }
        v.finish()?;

        self.db.transaction(|conn| {
            let step = owned_evolution_step(conn, actor, step_id)?;
            let changes = EvolutionStepChangeset {
                title: input.title,
                finish_date: input.finish_date,
                description: input.description,
                updated_at: current_timestamp(),
            };
            steps::update_evolution_step(conn, &step.id, &changes)
        })
    }

    pub fn delete_evolution(&self, actor: &Actor, step_id: &str) -> Result<(), IdeagramError> {
        self.db.transaction(|conn| {
            let step = owned_evolution_step(conn, actor, step_id)?;
            steps::delete_evolution_step(conn, &step.id)?;
            Ok(())
        })
    }

    // =========================================================================
    // Financial steps
    // =========================================================================

    pub fn list_financial(&self, actor: &Actor, idea_id: &str) -> Result<Vec<FinancialStep>, IdeagramError> {
        self.db.with_conn(|conn| {
            let idea = visible_idea(conn, actor, idea_id)?;
            steps::list_financial_steps(conn, &idea.id)
        })
    }

    pub fn create_financial(
        &self,
        actor: &Actor,
        idea_id: &str,
        inputs: Vec<FinancialStepInput>,
    ) -> Result<Vec<FinancialStep>, IdeagramError> {
        let mut v = Validator::new();
        for input in &inputs {
            validate_step_text(&mut v, &input.title, &input.description);
            validate_cost(&mut v, input.cost, &input.unit);
            validate_priority(&mut v, input.priority, self.limits.max_financial_steps_count);
        }
        v.finish()?;

        let created = self.db.transaction(|conn| {
            let idea = owned_idea(conn, actor, idea_id)?;
            let now = current_timestamp();
            let mut created = Vec::with_capacity(inputs.len());
            for input in inputs {
                let step = FinancialStep {
                    id: new_id(),
                    idea_id: idea.id.clone(),
                    title: input.title,
                    cost: input.cost,
                    unit: input.unit,
                    description: input.description,
                    priority: input.priority,
                    created_at: now.clone(),
                    updated_at: now.clone(),
                };
                steps::insert_financial_step(conn, &step)
                    .map_err(|e| priority_clash(e, step.priority))?;
                created.push(step);
            }
            Ok(created)
        })?;

        self.events.emit(DomainEvent::StepsCreated {
            idea_id: idea_id.to_string(),
            kind: "financial",
            count: created.len(),
        });
        Ok(created)
    }

    pub fn update_financial(
        &self,
        actor: &Actor,
        step_id: &str,
        input: FinancialStepUpdate,
    ) -> Result<FinancialStep, IdeagramError> {
        let mut v = Validator::new();
        if let Some(title) = &input.title {
            v.required("title", title);
            v.max_len("title", title, 100);
        }
        if let Some(cost) = input.cost {
            v.check("cost", cost >= 0, "Ensure this value is greater than or equal to 0.");
        }
        if let Some(unit) = &input.unit {
            v.required("unit", unit);
            v.max_len("unit", unit, 50);
        }
        v.finish()?;

        self.db.transaction(|conn| {
            let step = owned_financial_step(conn, actor, step_id)?;
            let changes = FinancialStepChangeset {
                title: input.title,
                cost: input.cost,
                unit: input.unit,
                description: input.description,
                updated_at: current_timestamp(),
            };
            steps::update_financial_step(conn, &step.id, &changes)
        })
    }

    pub fn delete_financial(&self, actor: &Actor, step_id: &str) -> Result<(), IdeagramError> {
        self.db.transaction(|conn| {
            let step = owned_financial_step(conn, actor, step_id)?;
            steps::delete_financial_step(conn, &step.id)?;
            Ok(())
        })
    }
}

fn owned_evolution_step(
    conn: &mut SqliteConnection,
    actor: &Actor,
    step_id: &str,
) -> Result<EvolutionStep, IdeagramError> {
    let not_found = || IdeagramError::NotFound(EVOLUTION_STEP_NOT_FOUND.into());
    let step = steps::get_evolution_step(conn, step_id)?.ok_or_else(not_found)?;
    owned_idea(conn, actor, &step.idea_id).map_err(|_| not_found())?;
    Ok(step)
}

fn owned_financial_step(
    conn: &mut SqliteConnection,
    actor: &Actor,
    step_id: &str,
) -> Result<FinancialStep, IdeagramError> {
    let not_found = || IdeagramError::NotFound(FINANCIAL_STEP_NOT_FOUND.into());
    let step = steps::get_financial_step(conn, step_id)?.ok_or_else(not_found)?;
    owned_idea(conn, actor, &step.idea_id).map_err(|_| not_found())?;
    Ok(step)
}

fn priority_clash(err: IdeagramError, priority: i32) -> IdeagramError {
    match err {
        IdeagramError::Conflict(_) => IdeagramError::Conflict(format!("invalid priority: {}", priority)),
        other => other,
    }
}

fn validate_step_text(v: &mut Validator, title: &str, description: &str) {
    v.required("title", title);
    v.max_len("title", title, 100);
    v.required("description", description);
}

fn validate_cost(v: &mut Validator, cost: i64, unit: &str) {
    v.check("cost", cost >= 0, "Ensure this value is greater than or equal to 0.");
    v.required("unit", unit);
    v.max_len("unit", unit, 50);
}

fn validate_priority(v: &mut Validator, priority: i32, max: i32) {
    v.check(
        "priority",
        (1..=max).contains(&priority),
        format!("Ensure this value is between 1 and {}.", max),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ideas::IdeaInput;
    use crate::services::testing::{actor, harness};
    use crate::services::Services;

    fn idea(services: &Services, owner: &Actor) -> String {
        services
            .ideas
            .create(
                owner,
                IdeaInput {
                    classification: vec![],
                    title: "Seed bank".into(),
                    goal: "Keep seeds".into(),
                    abstract_text: "A seed library".into(),
                    description: "Details".into(),
                    image: None,
                    max_donation: 0,
                    show_likes: true,
                    show_views: true,
                    show_comments: true,
                },
            )
            .unwrap()
            .id
    }

    fn evolution(priority: i32) -> EvolutionStepInput {
        EvolutionStepInput {
            title: format!("Step {}", priority),
            finish_date: Some("2030-01-01".into()),
            description: "work".into(),
            priority,
        }
    }

    #[test]
    fn test_duplicate_priority_conflicts() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        let idea_id = idea(&h.services, &alice);

        h.services
            .steps
            .create_evolution(&alice, &idea_id, vec![evolution(1)])
            .unwrap();
        let err = h
            .services
            .steps
            .create_evolution(&alice, &idea_id, vec![evolution(1)])
            .unwrap_err();
        match err {
            IdeagramError::Conflict(message) => assert_eq!(message, "invalid priority: 1"),
            other => panic!("unexpected {:?}", other),
        }

        let rows = h.services.steps.list_evolution(&alice, &idea_id).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_bulk_create_is_all_or_nothing() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        let idea_id = idea(&h.services, &alice);

        let err = h
            .services
            .steps
            .create_evolution(&alice, &idea_id, vec![evolution(2), evolution(3), evolution(2)])
            .unwrap_err();
        assert!(matches!(err, IdeagramError::Conflict(_)));
        assert!(h.services.steps.list_evolution(&alice, &idea_id).unwrap().is_empty());

        let rows = h
            .services
            .steps
            .create_evolution(&alice, &idea_id, vec![evolution(3), evolution(1)])
            .unwrap();
        assert_eq!(rows.len(), 2);
        let listed = h.services.steps.list_evolution(&alice, &idea_id).unwrap();
        assert_eq!(listed[0].priority, 1);
        assert_eq!(listed[1].priority, 3);
    }

    #[test]
    fn test_priority_bounds() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        let idea_id = idea(&h.services, &alice);

        let err = h
            .services
            .steps
            .create_evolution(&alice, &idea_id, vec![evolution(0)])
            .unwrap_err();
        assert!(matches!(err, IdeagramError::Validation(_)));
    }

    #[test]
    fn test_only_owner_writes() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        let bob = actor(&h.services, "bob");
        let idea_id = idea(&h.services, &alice);

        assert!(matches!(
            h.services.steps.create_evolution(&bob, &idea_id, vec![evolution(1)]),
            Err(IdeagramError::NotFound(_))
        ));

        let step = h
            .services
            .steps
            .create_financial(
                &alice,
                &idea_id,
                vec![FinancialStepInput {
                    title: "Shelves".into(),
                    cost: 1200,
                    unit: "USD".into(),
                    description: "Wooden shelves".into(),
                    priority: 1,
                }],
            )
            .unwrap()
            .remove(0);

        assert!(h
            .services
            .steps
            .update_financial(&bob, &step.id, FinancialStepUpdate::default())
            .is_err());

        let updated = h
            .services
            .steps
            .update_financial(
                &alice,
                &step.id,
                FinancialStepUpdate {
                    cost: Some(1500),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.cost, 1500);
        assert_eq!(updated.priority, 1);
        assert_eq!(updated.title, "Shelves");

        h.services.steps.delete_financial(&alice, &step.id).unwrap();
        assert!(h.services.steps.list_financial(&bob, &idea_id).unwrap().is_empty());
    }
}

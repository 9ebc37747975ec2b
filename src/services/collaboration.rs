//! Collaboration service - help wanted requests on an idea

use std::sync::Arc;

use diesel::SqliteConnection;
use serde::Deserialize;

use crate::db::models::{current_timestamp, new_id, CollaborationRequest, CollaborationRequestChangeset};
use crate::db::{collaboration, Database};
use crate::types::IdeagramError;
use crate::validation::{Validator, COLLABORATION_STATUSES};

use super::events::{DomainEvent, EventBus};
use super::ideas::{owned_idea, visible_idea};
use super::Actor;

const REQUEST_NOT_FOUND: &str = "No collaboration request found with this uuid!";

#[derive(Debug, Clone, Deserialize)]
pub struct CollaborationInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub skills: String,
    pub age: Option<i32>,
    pub education: Option<String>,
    pub description: Option<String>,
    pub salary: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollaborationUpdate {
    pub title: Option<String>,
    pub status: Option<String>,
    pub skills: Option<String>,
    pub age: Option<i32>,
    pub education: Option<String>,
    pub description: Option<String>,
    pub salary: Option<i64>,
}

pub struct CollaborationService {
    db: Database,
    events: Arc<EventBus>,
}

impl CollaborationService {
    pub fn new(db: Database, events: Arc<EventBus>) -> Self {
        Self { db, events }
    }

    pub fn list(&self, actor: &Actor, idea_id: &str) -> Result<Vec<CollaborationRequest>, IdeagramError> {
        self.db.with_conn(|conn| {
            let idea = visible_idea(conn, actor, idea_id)?;
            collaboration::list_requests(conn, &idea.id)
        })
    }

    pub fn create(
        &self,
        actor: &Actor,
        idea_id: &str,
        input: CollaborationInput,
    ) -> Result<CollaborationRequest, IdeagramError> {
        let mut v = Validator::new();
        v.required("title", &input.title);
        v.max_len("title", &input.title, 100);
        v.choice("status", &input.status, COLLABORATION_STATUSES);
        v.required("skills", &input.skills);
        validate_numbers(&mut v, input.age, input.salary);
        v.finish()?;

        let request = self.db.transaction(|conn| {
            let idea = owned_idea(conn, actor, idea_id)?;
            let now = current_timestamp();
            let request = CollaborationRequest {
                id: new_id(),
                idea_id: idea.id,
                title: input.title,
                status: input.status,
                skills: input.skills,
                age: input.age,
                education: input.education,
                description: input.description,
                salary: input.salary,
                created_at: now.clone(),
                updated_at: now,
            };
            collaboration::insert_request(conn, &request)?;
            Ok(request)
        })?;

        self.events.emit(DomainEvent::CollaborationRequested {
            idea_id: request.idea_id.clone(),
            request_id: request.id.clone(),
        });
        Ok(request)
    }

    pub fn update(
        &self,
        actor: &Actor,
        request_id: &str,
        input: CollaborationUpdate,
    ) -> Result<CollaborationRequest, IdeagramError> {
        let mut v = Validator::new();
        if let Some(title) = &input.title {
            v.required("title", title);
            v.max_len("title", title, 100);
        }
        if let Some(status) = &input.status {
            v.choice("status", status, COLLABORATION_STATUSES);
        }
        if let Some(skills) = &input.skills {
            v.required("skills", skills);
        }
        validate_numbers(&mut v, input.age, input.salary);
        v.finish()?;

        self.db.transaction(|conn| {
            let request = owned_request(conn, actor, request_id)?;
            let changes = CollaborationRequestChangeset {
                title: input.title,
                status: input.status,
                skills: input.skills,
                age: input.age,
                education: input.education,
                description: input.description,
                salary: input.salary,
                updated_at: current_timestamp(),
            };
            collaboration::update_request(conn, &request.id, &changes)
        })
    }

    pub fn delete(&self, actor: &Actor, request_id: &str) -> Result<(), IdeagramError> {
        self.db.transaction(|conn| {
            let request = owned_request(conn, actor, request_id)?;
            collaboration::delete_request(conn, &request.id)?;
            Ok(())
        })
    }
}

fn owned_request(
    conn: &mut SqliteConnection,
    actor: &Actor,
    request_id: &str,
) -> Result<CollaborationRequest, IdeagramError> {
    let not_found = || IdeagramError::NotFound(REQUEST_NOT_FOUND.into());
    let request = collaboration::get_request(conn, request_id)?.ok_or_else(not_found)?;
    owned_idea(conn, actor, &request.idea_id).map_err(|_| not_found())?;
    Ok(request)
}

fn validate_numbers(v: &mut Validator, age: Option<i32>, salary: Option<i64>) {
    if let Some(age) = age {
        v.check(
            "age",
            (10..=120).contains(&age),
            "Ensure this value is between 10 and 120.",
        );
    }
    if let Some(salary) = salary {
        v.check("salary", salary >= 0, "Ensure this value is greater than or equal to 0.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ideas::IdeaInput;
    use crate::services::testing::{actor, harness};

    fn input() -> CollaborationInput {
        CollaborationInput {
            title: "Backend developer".into(),
            status: "part_time".into(),
            skills: "rust, sql".into(),
            age: Some(25),
            education: None,
            description: None,
            salary: Some(1000),
        }
    }

    #[test]
    fn test_request_lifecycle() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        let bob = actor(&h.services, "bob");
        let idea_id = h
            .services
            .ideas
            .create(
                &alice,
                IdeaInput {
                    classification: vec![],
                    title: "Tool library".into(),
                    goal: "Share tools".into(),
                    abstract_text: "Borrow instead of buy".into(),
                    description: "Details".into(),
                    image: None,
                    max_donation: 0,
                    show_likes: true,
                    show_views: true,
                    show_comments: true,
                },
            )
            .unwrap()
            .id;

        assert!(matches!(
            h.services.collaboration.create(&bob, &idea_id, input()),
            Err(IdeagramError::NotFound(_))
        ));

        let mut bad = input();
        bad.status = "weekends".into();
        bad.age = Some(5);
        match h.services.collaboration.create(&alice, &idea_id, bad).unwrap_err() {
            IdeagramError::Validation(fields) => {
                assert!(fields.contains_key("status"));
                assert!(fields.contains_key("age"));
            }
            other => panic!("unexpected {:?}", other),
        }

        let request = h.services.collaboration.create(&alice, &idea_id, input()).unwrap();
        assert_eq!(h.services.collaboration.list(&bob, &idea_id).unwrap().len(), 1);

        let updated = h
            .services
            .collaboration
            .update(
                &alice,
                &request.id,
                CollaborationUpdate {
                    status: Some("freelance".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, "freelance");
        assert_eq!(updated.skills, "rust, sql");

        assert!(h.services.collaboration.delete(&bob, &request.id).is_err());
        h.services.collaboration.delete(&alice, &request.id).unwrap();
        assert!(h.services.collaboration.list(&alice, &idea_id).unwrap().is_empty());
    }
}

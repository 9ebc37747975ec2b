//! Idea service - idea CRUD, detail views and catalog lists
//!
//! Also holds the ownership and visibility lookups shared by the idea
//! sub-resource services.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use diesel::SqliteConnection;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::db::ideas::IdeaCounter;
use crate::db::models::{current_timestamp, new_id, Classification, Idea, IdeaChangeset, NewIdea, Organization};
use crate::db::{catalog, engagement, ideas, profiles, Database};
use crate::types::IdeagramError;
use crate::validation::Validator;

use super::events::{DomainEvent, EventBus};
use super::moderation::ensure_clean;
use super::Actor;

pub(crate) const IDEA_NOT_FOUND: &str = "No idea found with this uuid!";

/// Idea as returned by the API
///
/// Counters hidden by the owner's `show_*` flags are left out for other
/// viewers.
#[derive(Debug, Clone, Serialize)]
pub struct IdeaView {
    pub id: String,
    pub profile: String,
    pub classification: Vec<String>,
    pub title: String,
    pub goal: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub description: String,
    pub image: Option<String>,
    pub max_donation: i64,
    pub total_donation: i64,
    pub attached_files_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments_count: Option<i32>,
    pub show_likes: bool,
    pub show_views: bool,
    pub show_comments: bool,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdeaInput {
    #[serde(default)]
    pub classification: Vec<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub goal: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub max_donation: i64,
    #[serde(default = "default_true")]
    pub show_likes: bool,
    #[serde(default = "default_true")]
    pub show_views: bool,
    #[serde(default = "default_true")]
    pub show_comments: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdeaUpdate {
    pub classification: Option<Vec<String>>,
    pub title: Option<String>,
    pub goal: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub max_donation: Option<i64>,
    pub show_likes: Option<bool>,
    pub show_views: Option<bool>,
    pub show_comments: Option<bool>,
}

pub struct IdeaService {
    db: Database,
    events: Arc<EventBus>,
    media_dir: PathBuf,
}

impl IdeaService {
    pub fn new(db: Database, events: Arc<EventBus>, media_dir: PathBuf) -> Self {
        Self {
            db,
            events,
            media_dir,
        }
    }

    // =========================================================================
    // Catalogs
    // =========================================================================

    pub fn classifications(&self) -> Result<Vec<Classification>, IdeagramError> {
        self.db.with_conn(catalog::list_classifications)
    }

    pub fn organizations(&self) -> Result<Vec<Organization>, IdeagramError> {
        self.db.with_conn(catalog::list_organizations)
    }

    // =========================================================================
    // Ideas
    // =========================================================================

    /// Create an idea with its classification tags
    ///
    /// Text containing a forbidden word is rejected before anything is
    /// written. The owner's `idea_count` is left as is.
    pub fn create(&self, actor: &Actor, input: IdeaInput) -> Result<IdeaView, IdeagramError> {
        let mut v = Validator::new();
        validate_title(&mut v, &input.title);
        validate_goal(&mut v, &input.goal);
        validate_abstract(&mut v, &input.abstract_text);
        v.required("description", &input.description);
        v.check(
            "max_donation",
            input.max_donation >= 0,
            "Ensure this value is greater than or equal to 0.",
        );
        v.finish()?;

        let classification = dedup(&input.classification);
        let id = new_id();
        let now = current_timestamp();

        let view = self.db.transaction(|conn| {
            ensure_clean(
                conn,
                &[
                    ("title", input.title.as_str()),
                    ("goal", input.goal.as_str()),
                    ("abstract", input.abstract_text.as_str()),
                    ("description", input.description.as_str()),
                ],
            )?;
            ensure_classifications(conn, &classification)?;

            let idea = ideas::insert_idea(
                conn,
                &NewIdea {
                    id: &id,
                    profile_id: &actor.profile.id,
                    title: &input.title,
                    goal: &input.goal,
                    abstract_text: &input.abstract_text,
                    description: &input.description,
                    image: input.image.as_deref(),
                    max_donation: input.max_donation,
                    show_likes: input.show_likes,
                    show_views: input.show_views,
                    show_comments: input.show_comments,
                    created_at: &now,
                    updated_at: &now,
                },
            )?;
            ideas::set_classifications(conn, &idea.id, &classification)?;
            build_idea_view(conn, idea, true)
        })?;

        debug!(id = %view.id, profile_id = %actor.profile.id, "Idea created");
        self.events.emit(DomainEvent::IdeaCreated {
            id: view.id.clone(),
            profile_id: actor.profile.id.clone(),
            title: view.title.clone(),
        });
        Ok(view)
    }

    /// Idea detail; a view by anyone but the owner bumps `views_count`
    pub fn get(&self, actor: &Actor, idea_id: &str) -> Result<IdeaView, IdeagramError> {
        self.db.transaction(|conn| {
            let mut idea = visible_idea(conn, actor, idea_id)?;
            let is_owner = idea.profile_id == actor.profile.id;
            if !is_owner {
                ideas::adjust_counter(conn, &idea.id, IdeaCounter::Views, 1)?;
                idea = load_idea(conn, idea_id)?;
            }
            build_idea_view(conn, idea, is_owner)
        })
    }

    /// Partial update by the owner; supplied text passes the moderation gate
    pub fn update(&self, actor: &Actor, idea_id: &str, input: IdeaUpdate) -> Result<IdeaView, IdeagramError> {
        let mut v = Validator::new();
        if let Some(title) = &input.title {
            validate_title(&mut v, title);
        }
        if let Some(goal) = &input.goal {
            validate_goal(&mut v, goal);
        }
        if let Some(abstract_text) = &input.abstract_text {
            validate_abstract(&mut v, abstract_text);
        }
        if let Some(description) = &input.description {
            v.required("description", description);
        }
        if let Some(max_donation) = input.max_donation {
            v.check(
                "max_donation",
                max_donation >= 0,
                "Ensure this value is greater than or equal to 0.",
            );
        }
        v.finish()?;

        let view = self.db.transaction(|conn| {
            let idea = owned_idea(conn, actor, idea_id)?;

            let texts: Vec<(&str, &str)> = [
                ("title", input.title.as_deref()),
                ("goal", input.goal.as_deref()),
                ("abstract", input.abstract_text.as_deref()),
                ("description", input.description.as_deref()),
            ]
            .into_iter()
            .filter_map(|(field, text)| text.map(|t| (field, t)))
            .collect();
            ensure_clean(conn, &texts)?;

            if let Some(classification) = &input.classification {
                let classification = dedup(classification);
                ensure_classifications(conn, &classification)?;
                ideas::set_classifications(conn, &idea.id, &classification)?;
            }

            let changes = IdeaChangeset {
                title: input.title.clone(),
                goal: input.goal.clone(),
                abstract_text: input.abstract_text.clone(),
                description: input.description.clone(),
                image: input.image.clone(),
                max_donation: input.max_donation,
                show_likes: input.show_likes,
                show_views: input.show_views,
                show_comments: input.show_comments,
                updated_at: current_timestamp(),
            };
            let idea = ideas::update_idea(conn, &idea.id, &changes)?;
            build_idea_view(conn, idea, true)
        })?;

        self.events.emit(DomainEvent::IdeaUpdated { id: view.id.clone() });
        Ok(view)
    }

    /// Delete an owned idea; sub-resources go with it
    pub fn delete(&self, actor: &Actor, idea_id: &str) -> Result<(), IdeagramError> {
        let files = self.db.transaction(|conn| {
            let idea = owned_idea(conn, actor, idea_id)?;
            let files: Vec<String> = engagement::list_attachments(conn, &idea.id)?
                .into_iter()
                .map(|a| a.file)
                .collect();
            ideas::delete_idea(conn, &idea.id)?;
            Ok(files)
        })?;

        for file in files {
            if let Err(e) = std::fs::remove_file(self.media_dir.join(&file)) {
                warn!(file = %file, error = %e, "Failed to remove attachment file");
            }
        }

        self.events.emit(DomainEvent::IdeaDeleted {
            id: idea_id.to_string(),
        });
        Ok(())
    }
}

// ============================================================================
// Shared lookups
// ============================================================================

pub(crate) fn load_idea(conn: &mut SqliteConnection, idea_id: &str) -> Result<Idea, IdeagramError> {
    ideas::get_idea(conn, idea_id)?.ok_or_else(|| IdeagramError::NotFound(IDEA_NOT_FOUND.into()))
}

/// An idea owned by the caller; anything else reads as missing
pub(crate) fn owned_idea(
    conn: &mut SqliteConnection,
    actor: &Actor,
    idea_id: &str,
) -> Result<Idea, IdeagramError> {
    let idea = load_idea(conn, idea_id)?;
    if idea.profile_id != actor.profile.id {
        return Err(IdeagramError::NotFound(IDEA_NOT_FOUND.into()));
    }
    Ok(idea)
}

/// An idea the caller may see
///
/// Owners always see their ideas. Others only see active, non-banned ideas
/// of visible profiles.
pub(crate) fn visible_idea(
    conn: &mut SqliteConnection,
    actor: &Actor,
    idea_id: &str,
) -> Result<Idea, IdeagramError> {
    let idea = load_idea(conn, idea_id)?;
    if idea.profile_id == actor.profile.id {
        return Ok(idea);
    }
    if !idea.is_active || idea.is_banned {
        return Err(IdeagramError::NotFound(IDEA_NOT_FOUND.into()));
    }
    let owner_visible = profiles::get_profile(conn, &idea.profile_id)?
        .map(|p| p.is_visible())
        .unwrap_or(false);
    if !owner_visible {
        return Err(IdeagramError::NotFound(IDEA_NOT_FOUND.into()));
    }
    Ok(idea)
}

pub(crate) fn build_idea_view(
    conn: &mut SqliteConnection,
    idea: Idea,
    is_owner: bool,
) -> Result<IdeaView, IdeagramError> {
    let classification = ideas::classification_ids(conn, &idea.id)?;
    let shown = |flag: bool, value: i32| (is_owner || flag).then_some(value);

    Ok(IdeaView {
        views_count: shown(idea.show_views, idea.views_count),
        likes_count: shown(idea.show_likes, idea.likes_count),
        comments_count: shown(idea.show_comments, idea.comments_count),
        id: idea.id,
        profile: idea.profile_id,
        classification,
        title: idea.title,
        goal: idea.goal,
        abstract_text: idea.abstract_text,
        description: idea.description,
        image: idea.image,
        max_donation: idea.max_donation,
        total_donation: idea.total_donation,
        attached_files_count: idea.attached_files_count,
        show_likes: idea.show_likes,
        show_views: idea.show_views,
        show_comments: idea.show_comments,
        is_active: idea.is_active,
        created_at: idea.created_at,
        updated_at: idea.updated_at,
    })
}

fn validate_title(v: &mut Validator, title: &str) {
    v.required("title", title);
    v.max_len("title", title, 100);
}

fn validate_goal(v: &mut Validator, goal: &str) {
    v.required("goal", goal);
    v.max_len("goal", goal, 500);
}

fn validate_abstract(v: &mut Validator, abstract_text: &str) {
    v.required("abstract", abstract_text);
    v.max_len("abstract", abstract_text, 1500);
}

fn dedup(ids: &[String]) -> Vec<String> {
    ids.iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn ensure_classifications(conn: &mut SqliteConnection, ids: &[String]) -> Result<(), IdeagramError> {
    let found = catalog::find_classifications(conn, ids)?;
    let mut v = Validator::new();
    for id in ids {
        v.check(
            "classification",
            found.iter().any(|c| &c.id == id),
            format!("Invalid pk \"{}\" - object does not exist.", id),
        );
    }
    v.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{actor, harness, reload};
    use crate::services::profiles::ProfileUpdate;

    fn music(services: &crate::services::Services) -> String {
        services
            .db
            .with_conn(|conn| catalog::create_classification(conn, "music"))
            .unwrap()
            .id
    }

    fn input(classification: Vec<String>) -> IdeaInput {
        IdeaInput {
            classification,
            title: "Street piano".into(),
            goal: "Put pianos in parks".into(),
            abstract_text: "Public pianos for everyone".into(),
            description: "Longer description".into(),
            image: None,
            max_donation: 500,
            show_likes: true,
            show_views: false,
            show_comments: true,
        }
    }

    #[test]
    fn test_create_persists_fields_and_keeps_idea_count() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        let tag = music(&h.services);

        let view = h.services.ideas.create(&alice, input(vec![tag.clone()])).unwrap();
        assert_eq!(view.classification, vec![tag]);

        let stored = h
            .services
            .db
            .with_conn(|conn| ideas::get_idea(conn, &view.id))
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, "Street piano");
        assert_eq!(stored.goal, "Put pianos in parks");
        assert_eq!(stored.abstract_text, "Public pianos for everyone");
        assert_eq!(stored.description, "Longer description");
        assert_eq!(stored.max_donation, 500);
        assert!(!stored.show_views);
        assert_eq!(stored.profile_id, alice.profile.id);

        assert_eq!(reload(&h.services, &alice.user.id).profile.idea_count, 0);
    }

    #[test]
    fn test_forbidden_word_blocks_create() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        h.services.moderation.add_word("ass").unwrap();

        let mut bad = input(vec![]);
        bad.title = "The Assassin".into();
        let err = h.services.ideas.create(&alice, bad).unwrap_err();
        assert!(matches!(err, IdeagramError::Validation(ref f) if f.contains_key("title")));

        let count = h
            .services
            .db
            .with_conn(|conn| ideas::list_ideas_by_profile(conn, &alice.profile.id))
            .unwrap()
            .len();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_unknown_classification_rejected() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        let err = h
            .services
            .ideas
            .create(&alice, input(vec!["missing".into()]))
            .unwrap_err();
        assert!(matches!(err, IdeagramError::Validation(ref f) if f.contains_key("classification")));
    }

    #[test]
    fn test_views_and_hidden_counts() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        let bob = actor(&h.services, "bob");
        let idea = h.services.ideas.create(&alice, input(vec![])).unwrap();

        let seen = h.services.ideas.get(&bob, &idea.id).unwrap();
        assert!(seen.views_count.is_none());
        assert_eq!(seen.likes_count, Some(0));

        let own = h.services.ideas.get(&alice, &idea.id).unwrap();
        assert_eq!(own.views_count, Some(1));
    }

    #[test]
    fn test_hidden_from_others_when_inactive_or_private() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        let bob = actor(&h.services, "bob");
        let idea = h.services.ideas.create(&alice, input(vec![])).unwrap();

        h.services
            .profiles
            .update(
                &alice,
                ProfileUpdate {
                    is_public: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(matches!(
            h.services.ideas.get(&bob, &idea.id),
            Err(IdeagramError::NotFound(_))
        ));
        assert!(h.services.ideas.get(&alice, &idea.id).is_ok());
    }

    #[test]
    fn test_update_and_delete_owner_only() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        let bob = actor(&h.services, "bob");
        let idea = h.services.ideas.create(&alice, input(vec![])).unwrap();

        let update = IdeaUpdate {
            title: Some("Renamed".into()),
            ..Default::default()
        };
        assert!(matches!(
            h.services.ideas.update(&bob, &idea.id, update.clone()),
            Err(IdeagramError::NotFound(_))
        ));
        let updated = h.services.ideas.update(&alice, &idea.id, update).unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.goal, "Put pianos in parks");

        h.services.moderation.add_word("scam").unwrap();
        let err = h
            .services
            .ideas
            .update(
                &alice,
                &idea.id,
                IdeaUpdate {
                    goal: Some("Totally not a SCAM".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, IdeagramError::Validation(_)));

        assert!(h.services.ideas.delete(&bob, &idea.id).is_err());
        h.services.ideas.delete(&alice, &idea.id).unwrap();
        assert!(matches!(
            h.services.ideas.get(&alice, &idea.id),
            Err(IdeagramError::NotFound(_))
        ));
    }
}

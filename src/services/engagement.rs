//! Engagement service - likes and comments
//!
//! `likes_count` and `comments_count` move with their rows in the same
//! transaction.

use std::sync::Arc;

use serde::Deserialize;

use crate::db::ideas::IdeaCounter;
use crate::db::models::{current_timestamp, new_id, Idea, IdeaComment, IdeaLike};
use crate::db::{engagement, ideas, Database};
use crate::types::IdeagramError;
use crate::validation::Validator;

use super::events::{DomainEvent, EventBus};
use super::ideas::{load_idea, visible_idea};
use super::Actor;

#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    #[serde(default)]
    pub comment: String,
}

pub struct EngagementService {
    db: Database,
    events: Arc<EventBus>,
}

impl EngagementService {
    pub fn new(db: Database, events: Arc<EventBus>) -> Self {
        Self { db, events }
    }

    // =========================================================================
    // Likes
    // =========================================================================

    pub fn likes(&self, actor: &Actor, idea_id: &str) -> Result<Vec<IdeaLike>, IdeagramError> {
        self.db.with_conn(|conn| {
            let idea = visible_idea(conn, actor, idea_id)?;
            ensure_shown(&idea, actor, idea.show_likes, "Idea's likes are hidden")?;
            engagement::list_likes(conn, &idea.id)
        })
    }

    pub fn like(&self, actor: &Actor, idea_id: &str) -> Result<IdeaLike, IdeagramError> {
        let like = self.db.transaction(|conn| {
            let idea = visible_idea(conn, actor, idea_id)?;
            let like = IdeaLike {
                id: new_id(),
                idea_id: idea.id.clone(),
                profile_id: actor.profile.id.clone(),
                created_at: current_timestamp(),
            };
            engagement::insert_like(conn, &like).map_err(|e| match e {
                IdeagramError::Conflict(_) => {
                    IdeagramError::Conflict("You already liked this idea.".into())
                }
                other => other,
            })?;
            ideas::adjust_counter(conn, &idea.id, IdeaCounter::Likes, 1)?;
            Ok(like)
        })?;

        self.events.emit(DomainEvent::IdeaLiked {
            idea_id: like.idea_id.clone(),
            profile_id: like.profile_id.clone(),
        });
        Ok(like)
    }

    /// Remove the caller's like; removing a like that is not there is a no-op
    pub fn unlike(&self, actor: &Actor, idea_id: &str) -> Result<(), IdeagramError> {
        self.db.transaction(|conn| {
            let idea = load_idea(conn, idea_id)?;
            if engagement::delete_like(conn, &idea.id, &actor.profile.id)? > 0 {
                ideas::adjust_counter(conn, &idea.id, IdeaCounter::Likes, -1)?;
            }
            Ok(())
        })
    }

    // =========================================================================
    // Comments
    // =========================================================================

    pub fn comments(&self, actor: &Actor, idea_id: &str) -> Result<Vec<IdeaComment>, IdeagramError> {
        self.db.with_conn(|conn| {
            let idea = visible_idea(conn, actor, idea_id)?;
            ensure_shown(&idea, actor, idea.show_comments, "Idea's comments are hidden")?;
            engagement::list_comments(conn, &idea.id)
        })
    }

    pub fn comment(&self, actor: &Actor, idea_id: &str, input: CommentInput) -> Result<IdeaComment, IdeagramError> {
        let mut v = Validator::new();
        v.required("comment", &input.comment);
        v.max_len("comment", &input.comment, 1000);
        v.finish()?;

        let comment = self.db.transaction(|conn| {
            let idea = visible_idea(conn, actor, idea_id)?;
            let comment = IdeaComment {
                id: new_id(),
                idea_id: idea.id.clone(),
                profile_id: actor.profile.id.clone(),
                comment: input.comment,
                date: current_timestamp(),
            };
            engagement::insert_comment(conn, &comment)?;
            ideas::adjust_counter(conn, &idea.id, IdeaCounter::Comments, 1)?;
            Ok(comment)
        })?;

        self.events.emit(DomainEvent::CommentAdded {
            idea_id: comment.idea_id.clone(),
            comment_id: comment.id.clone(),
        });
        Ok(comment)
    }

    /// Delete a comment written by the caller or left on the caller's idea
    pub fn delete_comment(&self, actor: &Actor, comment_id: &str) -> Result<(), IdeagramError> {
        self.db.transaction(|conn| {
            let not_found = || IdeagramError::NotFound("No comment found with this uuid!".into());
            let comment = engagement::get_comment(conn, comment_id)?.ok_or_else(not_found)?;
            let idea = load_idea(conn, &comment.idea_id)?;
            if comment.profile_id != actor.profile.id && idea.profile_id != actor.profile.id {
                return Err(not_found());
            }
            engagement::delete_comment(conn, &comment.id)?;
            ideas::adjust_counter(conn, &idea.id, IdeaCounter::Comments, -1)?;
            Ok(())
        })
    }
}

fn ensure_shown(idea: &Idea, actor: &Actor, shown: bool, message: &str) -> Result<(), IdeagramError> {
    if shown || idea.profile_id == actor.profile.id {
        Ok(())
    } else {
        Err(IdeagramError::Forbidden(message.to_string()))
    }
}

//! Idea storage

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text};

use super::diesel_schema::{idea_classifications, ideas};
use super::models::{current_timestamp, Idea, IdeaChangeset, IdeaClassification, NewIdea};
use crate::types::IdeagramError;

/// Denormalized idea counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdeaCounter {
    Views,
    Likes,
    Comments,
    AttachedFiles,
}

impl IdeaCounter {
    fn column(self) -> &'static str {
        match self {
            Self::Views => "views_count",
            Self::Likes => "likes_count",
            Self::Comments => "comments_count",
            Self::AttachedFiles => "attached_files_count",
        }
    }
}

pub fn insert_idea(conn: &mut SqliteConnection, idea: &NewIdea<'_>) -> Result<Idea, IdeagramError> {
    diesel::insert_into(ideas::table).values(idea).execute(conn)?;
    Ok(ideas::table.find(idea.id).first::<Idea>(conn)?)
}

pub fn get_idea(conn: &mut SqliteConnection, id: &str) -> Result<Option<Idea>, IdeagramError> {
    Ok(ideas::table.find(id).first::<Idea>(conn).optional()?)
}

/// Ideas of a profile, newest first
pub fn list_ideas_by_profile(
    conn: &mut SqliteConnection,
    profile_id: &str,
) -> Result<Vec<Idea>, IdeagramError> {
    Ok(ideas::table
        .filter(ideas::profile_id.eq(profile_id))
        .order(ideas::created_at.desc())
        .load::<Idea>(conn)?)
}

pub fn update_idea(
    conn: &mut SqliteConnection,
    id: &str,
    changes: &IdeaChangeset,
) -> Result<Idea, IdeagramError> {
    diesel::update(ideas::table.find(id)).set(changes).execute(conn)?;
    Ok(ideas::table.find(id).first::<Idea>(conn)?)
}

pub fn delete_idea(conn: &mut SqliteConnection, id: &str) -> Result<usize, IdeagramError> {
    Ok(diesel::delete(ideas::table.find(id)).execute(conn)?)
}

pub fn set_active(conn: &mut SqliteConnection, id: &str, active: bool) -> Result<(), IdeagramError> {
    diesel::update(ideas::table.find(id))
        .set((
            ideas::is_active.eq(active),
            ideas::updated_at.eq(current_timestamp()),
        ))
        .execute(conn)?;
    Ok(())
}

pub fn set_banned(conn: &mut SqliteConnection, id: &str, banned: bool) -> Result<(), IdeagramError> {
    diesel::update(ideas::table.find(id))
        .set((
            ideas::is_banned.eq(banned),
            ideas::updated_at.eq(current_timestamp()),
        ))
        .execute(conn)?;
    Ok(())
}

/// Shift a counter by `delta`, clamped at zero
pub fn adjust_counter(
    conn: &mut SqliteConnection,
    id: &str,
    counter: IdeaCounter,
    delta: i32,
) -> Result<(), IdeagramError> {
    let column = counter.column();
    diesel::sql_query(format!(
        "UPDATE ideas SET {col} = MAX({col} + ?, 0) WHERE id = ?",
        col = column
    ))
    .bind::<Integer, _>(delta)
    .bind::<Text, _>(id)
    .execute(conn)?;
    Ok(())
}

pub fn add_donation_total(
    conn: &mut SqliteConnection,
    id: &str,
    amount: i64,
) -> Result<(), IdeagramError> {
    diesel::sql_query("UPDATE ideas SET total_donation = total_donation + ? WHERE id = ?")
        .bind::<BigInt, _>(amount)
        .bind::<Text, _>(id)
        .execute(conn)?;
    Ok(())
}

// ============================================================================
// Classification tags
// ============================================================================

/// Replace the tag set of an idea
pub fn set_classifications(
    conn: &mut SqliteConnection,
    idea_id: &str,
    classification_ids: &[String],
) -> Result<(), IdeagramError> {
    diesel::delete(idea_classifications::table.filter(idea_classifications::idea_id.eq(idea_id)))
        .execute(conn)?;

    let rows: Vec<IdeaClassification> = classification_ids
        .iter()
        .map(|classification_id| IdeaClassification {
            idea_id: idea_id.to_string(),
            classification_id: classification_id.clone(),
        })
        .collect();

    if !rows.is_empty() {
        diesel::insert_into(idea_classifications::table)
            .values(&rows)
            .execute(conn)?;
    }
    Ok(())
}

pub fn classification_ids(
    conn: &mut SqliteConnection,
    idea_id: &str,
) -> Result<Vec<String>, IdeagramError> {
    Ok(idea_classifications::table
        .filter(idea_classifications::idea_id.eq(idea_id))
        .select(idea_classifications::classification_id)
        .order(idea_classifications::classification_id.asc())
        .load::<String>(conn)?)
}


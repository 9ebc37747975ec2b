//! Likes, comments, donations and attachments on ideas

use diesel::prelude::*;

use super::diesel_schema::{donations, idea_attachments, idea_comments, idea_likes};
use super::models::{Donation, IdeaAttachment, IdeaComment, IdeaLike};
use crate::types::IdeagramError;

// ============================================================================
// Likes
// ============================================================================

pub fn insert_like(conn: &mut SqliteConnection, like: &IdeaLike) -> Result<(), IdeagramError> {
    diesel::insert_into(idea_likes::table)
        .values(like)
        .execute(conn)?;
    Ok(())
}

pub fn delete_like(
    conn: &mut SqliteConnection,
    idea_id: &str,
    profile_id: &str,
) -> Result<usize, IdeagramError> {
    Ok(diesel::delete(
        idea_likes::table
            .filter(idea_likes::idea_id.eq(idea_id))
            .filter(idea_likes::profile_id.eq(profile_id)),
    )
    .execute(conn)?)
}

pub fn list_likes(conn: &mut SqliteConnection, idea_id: &str) -> Result<Vec<IdeaLike>, IdeagramError> {
    Ok(idea_likes::table
        .filter(idea_likes::idea_id.eq(idea_id))
        .order(idea_likes::created_at.asc())
        .load::<IdeaLike>(conn)?)
}

// ============================================================================
// Comments
// ============================================================================

pub fn insert_comment(conn: &mut SqliteConnection, comment: &IdeaComment) -> Result<(), IdeagramError> {
    diesel::insert_into(idea_comments::table)
        .values(comment)
        .execute(conn)?;
    Ok(())
}

pub fn get_comment(conn: &mut SqliteConnection, id: &str) -> Result<Option<IdeaComment>, IdeagramError> {
    Ok(idea_comments::table
        .find(id)
        .first::<IdeaComment>(conn)
        .optional()?)
}

pub fn list_comments(
    conn: &mut SqliteConnection,
    idea_id: &str,
) -> Result<Vec<IdeaComment>, IdeagramError> {
    Ok(idea_comments::table
        .filter(idea_comments::idea_id.eq(idea_id))
        .order(idea_comments::date.asc())
        .load::<IdeaComment>(conn)?)
}

pub fn delete_comment(conn: &mut SqliteConnection, id: &str) -> Result<usize, IdeagramError> {
    Ok(diesel::delete(idea_comments::table.find(id)).execute(conn)?)
}

// ============================================================================
// Donations
// ============================================================================

pub fn insert_donation(conn: &mut SqliteConnection, donation: &Donation) -> Result<(), IdeagramError> {
    diesel::insert_into(donations::table)
        .values(donation)
        .execute(conn)?;
    Ok(())
}

pub fn list_donations(
    conn: &mut SqliteConnection,
    idea_id: &str,
) -> Result<Vec<Donation>, IdeagramError> {
    Ok(donations::table
        .filter(donations::idea_id.eq(idea_id))
        .order(donations::date.asc())
        .load::<Donation>(conn)?)
}

// ============================================================================
// Attachments
// ============================================================================

pub fn insert_attachment(
    conn: &mut SqliteConnection,
    attachment: &IdeaAttachment,
) -> Result<(), IdeagramError> {
    diesel::insert_into(idea_attachments::table)
        .values(attachment)
        .execute(conn)?;
    Ok(())
}

pub fn get_attachment(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<IdeaAttachment>, IdeagramError> {
    Ok(idea_attachments::table
        .find(id)
        .first::<IdeaAttachment>(conn)
        .optional()?)
}

pub fn list_attachments(
    conn: &mut SqliteConnection,
    idea_id: &str,
) -> Result<Vec<IdeaAttachment>, IdeagramError> {
    Ok(idea_attachments::table
        .filter(idea_attachments::idea_id.eq(idea_id))
        .order(idea_attachments::created_at.asc())
        .load::<IdeaAttachment>(conn)?)
}

pub fn count_attachments(conn: &mut SqliteConnection, idea_id: &str) -> Result<i64, IdeagramError> {
    Ok(idea_attachments::table
        .filter(idea_attachments::idea_id.eq(idea_id))
        .count()
        .get_result(conn)?)
}

pub fn delete_attachment(conn: &mut SqliteConnection, id: &str) -> Result<usize, IdeagramError> {
    Ok(diesel::delete(idea_attachments::table.find(id)).execute(conn)?)
}

//! Admin-managed catalogs: classifications, organizations, forbidden words

use diesel::prelude::*;

use super::diesel_schema::{classifications, forbidden_words, organizations};
use super::models::{new_id, Classification, ForbiddenWord, Organization};
use crate::types::IdeagramError;

// ============================================================================
// Classifications
// ============================================================================

pub fn create_classification(
    conn: &mut SqliteConnection,
    title: &str,
) -> Result<Classification, IdeagramError> {
    let row = Classification {
        id: new_id(),
        title: title.to_string(),
    };
    diesel::insert_into(classifications::table)
        .values(&row)
        .execute(conn)?;
    Ok(row)
}

pub fn list_classifications(conn: &mut SqliteConnection) -> Result<Vec<Classification>, IdeagramError> {
    Ok(classifications::table
        .order(classifications::title.asc())
        .load::<Classification>(conn)?)
}

/// Classifications among `ids` that exist
pub fn find_classifications(
    conn: &mut SqliteConnection,
    ids: &[String],
) -> Result<Vec<Classification>, IdeagramError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(classifications::table
        .filter(classifications::id.eq_any(ids))
        .load::<Classification>(conn)?)
}

// ============================================================================
// Organizations
// ============================================================================

pub fn create_organization(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Organization, IdeagramError> {
    let row = Organization {
        id: new_id(),
        name: name.to_string(),
    };
    diesel::insert_into(organizations::table)
        .values(&row)
        .execute(conn)?;
    Ok(row)
}

pub fn list_organizations(conn: &mut SqliteConnection) -> Result<Vec<Organization>, IdeagramError> {
    Ok(organizations::table
        .order(organizations::name.asc())
        .load::<Organization>(conn)?)
}

pub fn get_organization(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Organization>, IdeagramError> {
    Ok(organizations::table
        .find(id)
        .first::<Organization>(conn)
        .optional()?)
}

// ============================================================================
// Forbidden words (stored lowercase)
// ============================================================================

pub fn add_forbidden_word(
    conn: &mut SqliteConnection,
    word: &str,
) -> Result<ForbiddenWord, IdeagramError> {
    let row = ForbiddenWord {
        id: new_id(),
        word: word.trim().to_lowercase(),
    };
    diesel::insert_into(forbidden_words::table)
        .values(&row)
        .execute(conn)?;
    Ok(row)
}

pub fn remove_forbidden_word(conn: &mut SqliteConnection, word: &str) -> Result<usize, IdeagramError> {
    Ok(diesel::delete(
        forbidden_words::table.filter(forbidden_words::word.eq(word.trim().to_lowercase())),
    )
    .execute(conn)?)
}

pub fn list_forbidden_words(conn: &mut SqliteConnection) -> Result<Vec<String>, IdeagramError> {
    Ok(forbidden_words::table
        .select(forbidden_words::word)
        .order(forbidden_words::word.asc())
        .load::<String>(conn)?)
}

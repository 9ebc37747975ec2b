//! Profile, address and social link storage

use diesel::prelude::*;

use super::diesel_schema::{addresses, profile_links, profiles};
use super::models::{
    current_timestamp, Address, AddressChangeset, NewProfile, Profile, ProfileChangeset,
    ProfileLink,
};
use crate::types::IdeagramError;

// ============================================================================
// Profiles
// ============================================================================

pub fn insert_profile(
    conn: &mut SqliteConnection,
    id: &str,
    user_id: &str,
    username: &str,
) -> Result<Profile, IdeagramError> {
    let now = current_timestamp();
    diesel::insert_into(profiles::table)
        .values(&NewProfile {
            id,
            user_id,
            username,
            gender: "other",
            created_at: &now,
            updated_at: &now,
        })
        .execute(conn)?;

    get_profile(conn, id)?
        .ok_or_else(|| IdeagramError::Internal("Profile vanished after insert".into()))
}

pub fn get_profile(conn: &mut SqliteConnection, id: &str) -> Result<Option<Profile>, IdeagramError> {
    Ok(profiles::table.find(id).first::<Profile>(conn).optional()?)
}

pub fn get_profile_by_user(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Option<Profile>, IdeagramError> {
    Ok(profiles::table
        .filter(profiles::user_id.eq(user_id))
        .first::<Profile>(conn)
        .optional()?)
}

pub fn get_profile_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> Result<Option<Profile>, IdeagramError> {
    Ok(profiles::table
        .filter(profiles::username.eq(username))
        .first::<Profile>(conn)
        .optional()?)
}

pub fn username_exists(conn: &mut SqliteConnection, username: &str) -> Result<bool, IdeagramError> {
    let count: i64 = profiles::table
        .filter(profiles::username.eq(username))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Load profiles by id, ordered by username
pub fn list_profiles_by_ids(
    conn: &mut SqliteConnection,
    ids: &[String],
) -> Result<Vec<Profile>, IdeagramError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(profiles::table
        .filter(profiles::id.eq_any(ids))
        .order(profiles::username.asc())
        .load::<Profile>(conn)?)
}

pub fn update_profile(
    conn: &mut SqliteConnection,
    id: &str,
    changes: &ProfileChangeset,
) -> Result<Profile, IdeagramError> {
    diesel::update(profiles::table.find(id))
        .set(changes)
        .execute(conn)?;
    Ok(profiles::table.find(id).first::<Profile>(conn)?)
}

pub fn set_banned(conn: &mut SqliteConnection, id: &str, banned: bool) -> Result<(), IdeagramError> {
    diesel::update(profiles::table.find(id))
        .set((
            profiles::is_banned.eq(banned),
            profiles::updated_at.eq(current_timestamp()),
        ))
        .execute(conn)?;
    Ok(())
}

pub fn set_active(conn: &mut SqliteConnection, id: &str, active: bool) -> Result<(), IdeagramError> {
    diesel::update(profiles::table.find(id))
        .set((
            profiles::is_active.eq(active),
            profiles::updated_at.eq(current_timestamp()),
        ))
        .execute(conn)?;
    Ok(())
}

// ============================================================================
// Addresses
// ============================================================================

pub fn get_address(conn: &mut SqliteConnection, id: &str) -> Result<Option<Address>, IdeagramError> {
    Ok(addresses::table.find(id).first::<Address>(conn).optional()?)
}

pub fn insert_address(conn: &mut SqliteConnection, address: &Address) -> Result<(), IdeagramError> {
    diesel::insert_into(addresses::table)
        .values(address)
        .execute(conn)?;
    Ok(())
}

pub fn update_address(
    conn: &mut SqliteConnection,
    id: &str,
    changes: &AddressChangeset,
) -> Result<(), IdeagramError> {
    if changes.is_empty() {
        return Ok(());
    }
    diesel::update(addresses::table.find(id))
        .set(changes)
        .execute(conn)?;
    Ok(())
}

// ============================================================================
// Social links
// ============================================================================

pub fn list_links(
    conn: &mut SqliteConnection,
    profile_id: &str,
) -> Result<Vec<ProfileLink>, IdeagramError> {
    Ok(profile_links::table
        .filter(profile_links::profile_id.eq(profile_id))
        .order(profile_links::priority.asc())
        .load::<ProfileLink>(conn)?)
}

pub fn insert_link(conn: &mut SqliteConnection, link: &ProfileLink) -> Result<(), IdeagramError> {
    diesel::insert_into(profile_links::table)
        .values(link)
        .execute(conn)?;
    Ok(())
}

/// Delete a link owned by `profile_id`, returns rows removed
pub fn delete_link(
    conn: &mut SqliteConnection,
    id: &str,
    profile_id: &str,
) -> Result<usize, IdeagramError> {
    Ok(diesel::delete(
        profile_links::table
            .filter(profile_links::id.eq(id))
            .filter(profile_links::profile_id.eq(profile_id)),
    )
    .execute(conn)?)
}

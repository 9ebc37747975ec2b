//! Follow graph storage
//!
//! The `(profile_id, following_id)` pair is unique in the table, so a
//! duplicate follow surfaces as a unique violation from the insert itself.

use diesel::prelude::*;

use super::diesel_schema::{followings, profiles};
use super::models::{current_date, new_id, Following};
use crate::types::IdeagramError;

pub fn insert_following(
    conn: &mut SqliteConnection,
    profile_id: &str,
    following_id: &str,
) -> Result<Following, IdeagramError> {
    let row = Following {
        id: new_id(),
        profile_id: profile_id.to_string(),
        following_id: following_id.to_string(),
        date: current_date(),
    };
    diesel::insert_into(followings::table)
        .values(&row)
        .execute(conn)?;
    Ok(row)
}

/// Delete the follow edge, returns rows removed
pub fn delete_following(
    conn: &mut SqliteConnection,
    profile_id: &str,
    following_id: &str,
) -> Result<usize, IdeagramError> {
    Ok(diesel::delete(
        followings::table
            .filter(followings::profile_id.eq(profile_id))
            .filter(followings::following_id.eq(following_id)),
    )
    .execute(conn)?)
}

/// All edges for an ordered pair (at most one while the constraint holds)
pub fn find_pair(
    conn: &mut SqliteConnection,
    profile_id: &str,
    following_id: &str,
) -> Result<Vec<Following>, IdeagramError> {
    Ok(followings::table
        .filter(followings::profile_id.eq(profile_id))
        .filter(followings::following_id.eq(following_id))
        .load::<Following>(conn)?)
}

/// Ids of profiles following `profile_id`
pub fn follower_ids(conn: &mut SqliteConnection, profile_id: &str) -> Result<Vec<String>, IdeagramError> {
    Ok(followings::table
        .filter(followings::following_id.eq(profile_id))
        .select(followings::profile_id)
        .load::<String>(conn)?)
}

/// Ids of profiles `profile_id` follows
pub fn following_ids(conn: &mut SqliteConnection, profile_id: &str) -> Result<Vec<String>, IdeagramError> {
    Ok(followings::table
        .filter(followings::profile_id.eq(profile_id))
        .select(followings::following_id)
        .load::<String>(conn)?)
}

/// Shift the denormalized counters for a follow edge by `delta`
///
/// Counters never drop below zero.
pub fn adjust_follow_counters(
    conn: &mut SqliteConnection,
    follower_id: &str,
    followee_id: &str,
    delta: i32,
) -> Result<(), IdeagramError> {
    if delta >= 0 {
        diesel::update(profiles::table.find(follower_id))
            .set(profiles::following_count.eq(profiles::following_count + delta))
            .execute(conn)?;
        diesel::update(profiles::table.find(followee_id))
            .set(profiles::follower_count.eq(profiles::follower_count + delta))
            .execute(conn)?;
    } else {
        let amount = -delta;
        diesel::update(
            profiles::table
                .find(follower_id)
                .filter(profiles::following_count.ge(amount)),
        )
        .set(profiles::following_count.eq(profiles::following_count - amount))
        .execute(conn)?;
        diesel::update(
            profiles::table
                .find(followee_id)
                .filter(profiles::follower_count.ge(amount)),
        )
        .set(profiles::follower_count.eq(profiles::follower_count - amount))
        .execute(conn)?;
    }
    Ok(())
}

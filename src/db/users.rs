//! User account storage

use diesel::prelude::*;

use super::diesel_schema::users;
use super::models::{current_timestamp, NewUser, User};
use crate::types::IdeagramError;

/// Insert a user and return the stored row
pub fn insert_user(
    conn: &mut SqliteConnection,
    id: &str,
    email: &str,
    password_hash: &str,
    is_admin: bool,
) -> Result<User, IdeagramError> {
    let now = current_timestamp();
    diesel::insert_into(users::table)
        .values(&NewUser {
            id,
            email,
            password_hash,
            is_active: true,
            is_admin,
            is_email_verified: false,
            created_at: &now,
            updated_at: &now,
        })
        .execute(conn)?;

    get_user(conn, id)?.ok_or_else(|| IdeagramError::Internal("User vanished after insert".into()))
}

pub fn get_user(conn: &mut SqliteConnection, id: &str) -> Result<Option<User>, IdeagramError> {
    Ok(users::table.find(id).first::<User>(conn).optional()?)
}

pub fn get_user_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<User>, IdeagramError> {
    Ok(users::table
        .filter(users::email.eq(email))
        .first::<User>(conn)
        .optional()?)
}

pub fn email_exists(conn: &mut SqliteConnection, email: &str) -> Result<bool, IdeagramError> {
    let count: i64 = users::table
        .filter(users::email.eq(email))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

pub fn set_password_hash(
    conn: &mut SqliteConnection,
    id: &str,
    password_hash: &str,
) -> Result<(), IdeagramError> {
    diesel::update(users::table.find(id))
        .set((
            users::password_hash.eq(password_hash),
            users::updated_at.eq(current_timestamp()),
        ))
        .execute(conn)?;
    Ok(())
}

/// Mark the account with this email as verified, returns rows touched
pub fn mark_email_verified(conn: &mut SqliteConnection, email: &str) -> Result<usize, IdeagramError> {
    Ok(diesel::update(users::table.filter(users::email.eq(email)))
        .set((
            users::is_email_verified.eq(true),
            users::updated_at.eq(current_timestamp()),
        ))
        .execute(conn)?)
}

pub fn set_active(conn: &mut SqliteConnection, id: &str, active: bool) -> Result<(), IdeagramError> {
    diesel::update(users::table.find(id))
        .set((
            users::is_active.eq(active),
            users::updated_at.eq(current_timestamp()),
        ))
        .execute(conn)?;
    Ok(())
}

//! Database schema definitions
//!
//! The DDL here is the source of truth; `diesel_schema.rs` mirrors it for
//! the query builder. Uniqueness rules live in the database, not in code.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_types::Integer;
use tracing::info;

use crate::types::IdeagramError;

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

#[derive(QueryableByName)]
struct VersionRow {
    #[diesel(sql_type = Integer)]
    version: i32,
}

/// Initialize the database schema
pub fn init_schema(conn: &mut SqliteConnection) -> Result<(), IdeagramError> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating new database schema v{}", SCHEMA_VERSION);
        create_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!("Migrating schema from v{} to v{}", current_version, SCHEMA_VERSION);
        create_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else {
        info!("Database schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Get current schema version (0 if not initialized)
pub fn get_schema_version(conn: &mut SqliteConnection) -> Result<i32, IdeagramError> {
    conn.batch_execute("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
        .map_err(|e| {
            IdeagramError::Database(format!("Failed to create schema_version table: {}", e))
        })?;

    let row: Option<VersionRow> = diesel::sql_query("SELECT version FROM schema_version LIMIT 1")
        .get_result(conn)
        .optional()?;

    Ok(row.map(|r| r.version).unwrap_or(0))
}

fn set_schema_version(conn: &mut SqliteConnection, version: i32) -> Result<(), IdeagramError> {
    conn.batch_execute(&format!(
        "DELETE FROM schema_version; INSERT INTO schema_version (version) VALUES ({});",
        version
    ))
    .map_err(|e| IdeagramError::Database(format!("Failed to set schema_version: {}", e)))
}

fn create_tables(conn: &mut SqliteConnection) -> Result<(), IdeagramError> {
    for (name, ddl) in [
        ("accounts", ACCOUNTS_SCHEMA),
        ("ideas", IDEAS_SCHEMA),
        ("moderation", MODERATION_SCHEMA),
        ("emails", EMAILS_SCHEMA),
    ] {
        conn.batch_execute(ddl).map_err(|e| {
            IdeagramError::Database(format!("Failed to create {} tables: {}", name, e))
        })?;
    }
    Ok(())
}

const ACCOUNTS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT 1,
    is_admin BOOLEAN NOT NULL DEFAULT 0,
    is_email_verified BOOLEAN NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS addresses (
    id TEXT PRIMARY KEY NOT NULL,
    country TEXT,
    state TEXT,
    city TEXT,
    address TEXT,
    zip_code TEXT
);

CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY NOT NULL,
    user_id TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    username TEXT NOT NULL UNIQUE,
    first_name TEXT,
    last_name TEXT,
    birth_date TEXT,
    gender TEXT NOT NULL DEFAULT 'other',
    bio TEXT,
    address_id TEXT REFERENCES addresses(id) ON DELETE SET NULL,
    profile_image TEXT,
    follower_count INTEGER NOT NULL DEFAULT 0,
    following_count INTEGER NOT NULL DEFAULT 0,
    idea_count INTEGER NOT NULL DEFAULT 0,
    is_public BOOLEAN NOT NULL DEFAULT 1,
    is_active BOOLEAN NOT NULL DEFAULT 1,
    is_banned BOOLEAN NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS profile_links (
    id TEXT PRIMARY KEY NOT NULL,
    profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    link_type TEXT NOT NULL,
    link TEXT NOT NULL,
    priority INTEGER NOT NULL DEFAULT 0,
    UNIQUE (profile_id, link_type)
);

CREATE TABLE IF NOT EXISTS followings (
    id TEXT PRIMARY KEY NOT NULL,
    profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    following_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    date TEXT NOT NULL,
    UNIQUE (profile_id, following_id),
    CHECK (profile_id <> following_id)
);

CREATE INDEX IF NOT EXISTS idx_followings_following ON followings(following_id);
"#;

const IDEAS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS classifications (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS ideas (
    id TEXT PRIMARY KEY NOT NULL,
    profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    goal TEXT NOT NULL,
    abstract_text TEXT NOT NULL,
    description TEXT NOT NULL,
    image TEXT,
    attached_files_count INTEGER NOT NULL DEFAULT 0,
    views_count INTEGER NOT NULL DEFAULT 0,
    likes_count INTEGER NOT NULL DEFAULT 0,
    comments_count INTEGER NOT NULL DEFAULT 0,
    max_donation INTEGER NOT NULL DEFAULT 0,
    total_donation INTEGER NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT 1,
    is_banned BOOLEAN NOT NULL DEFAULT 0,
    show_likes BOOLEAN NOT NULL DEFAULT 1,
    show_views BOOLEAN NOT NULL DEFAULT 1,
    show_comments BOOLEAN NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_ideas_profile ON ideas(profile_id);

CREATE TABLE IF NOT EXISTS idea_classifications (
    idea_id TEXT NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
    classification_id TEXT NOT NULL REFERENCES classifications(id) ON DELETE CASCADE,
    PRIMARY KEY (idea_id, classification_id)
);

CREATE TABLE IF NOT EXISTS evolution_steps (
    id TEXT PRIMARY KEY NOT NULL,
    idea_id TEXT NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    finish_date TEXT,
    description TEXT NOT NULL,
    priority INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (idea_id, priority)
);

CREATE TABLE IF NOT EXISTS financial_steps (
    id TEXT PRIMARY KEY NOT NULL,
    idea_id TEXT NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    cost INTEGER NOT NULL DEFAULT 0,
    unit TEXT NOT NULL,
    description TEXT NOT NULL,
    priority INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (idea_id, priority)
);

CREATE TABLE IF NOT EXISTS idea_likes (
    id TEXT PRIMARY KEY NOT NULL,
    idea_id TEXT NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
    profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    UNIQUE (idea_id, profile_id)
);

CREATE TABLE IF NOT EXISTS idea_comments (
    id TEXT PRIMARY KEY NOT NULL,
    idea_id TEXT NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
    profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    comment TEXT NOT NULL,
    date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS collaboration_requests (
    id TEXT PRIMARY KEY NOT NULL,
    idea_id TEXT NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    status TEXT NOT NULL,
    skills TEXT NOT NULL,
    age INTEGER,
    education TEXT,
    description TEXT,
    salary INTEGER,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS idea_attachments (
    id TEXT PRIMARY KEY NOT NULL,
    idea_id TEXT NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
    file TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS organizations (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS official_informations (
    id TEXT PRIMARY KEY NOT NULL,
    idea_id TEXT NOT NULL UNIQUE REFERENCES ideas(id) ON DELETE CASCADE,
    organization_id TEXT REFERENCES organizations(id) ON DELETE SET NULL,
    registration_number TEXT,
    registered_at TEXT,
    description TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS donations (
    id TEXT PRIMARY KEY NOT NULL,
    idea_id TEXT NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
    profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    amount INTEGER NOT NULL,
    message TEXT,
    date TEXT NOT NULL
);
"#;

const MODERATION_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS forbidden_words (
    id TEXT PRIMARY KEY NOT NULL,
    word TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS profile_reports (
    id TEXT PRIMARY KEY NOT NULL,
    profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    reporter_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    report_reason TEXT NOT NULL,
    description TEXT,
    is_checked BOOLEAN NOT NULL DEFAULT 0,
    date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS idea_reports (
    id TEXT PRIMARY KEY NOT NULL,
    idea_id TEXT NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
    reporter_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    report_reason TEXT NOT NULL,
    description TEXT,
    is_checked BOOLEAN NOT NULL DEFAULT 0,
    date TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_idea_reports_idea ON idea_reports(idea_id, is_checked);
"#;

const EMAILS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS emails (
    id TEXT PRIMARY KEY NOT NULL,
    email_type TEXT NOT NULL,
    subject TEXT NOT NULL,
    content TEXT NOT NULL,
    date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sent_emails (
    id TEXT PRIMARY KEY NOT NULL,
    email_id TEXT NOT NULL REFERENCES emails(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    is_sent BOOLEAN NOT NULL DEFAULT 0
);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let mut conn = SqliteConnection::establish(":memory:").unwrap();
        init_schema(&mut conn).unwrap();
        assert_eq!(get_schema_version(&mut conn).unwrap(), SCHEMA_VERSION);
        init_schema(&mut conn).unwrap();
        assert_eq!(get_schema_version(&mut conn).unwrap(), SCHEMA_VERSION);
    }
}

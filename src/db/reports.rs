//! Abuse report storage

use diesel::prelude::*;

use super::diesel_schema::{idea_reports, profile_reports};
use super::models::{IdeaReport, ProfileReport};
use crate::types::IdeagramError;

pub fn insert_profile_report(
    conn: &mut SqliteConnection,
    report: &ProfileReport,
) -> Result<(), IdeagramError> {
    diesel::insert_into(profile_reports::table)
        .values(report)
        .execute(conn)?;
    Ok(())
}

pub fn insert_idea_report(conn: &mut SqliteConnection, report: &IdeaReport) -> Result<(), IdeagramError> {
    diesel::insert_into(idea_reports::table)
        .values(report)
        .execute(conn)?;
    Ok(())
}

/// Reports on an idea that no moderator has looked at yet
pub fn count_unchecked_idea_reports(
    conn: &mut SqliteConnection,
    idea_id: &str,
) -> Result<i64, IdeagramError> {
    Ok(idea_reports::table
        .filter(idea_reports::idea_id.eq(idea_id))
        .filter(idea_reports::is_checked.eq(false))
        .count()
        .get_result(conn)?)
}


//! Collaboration requests and official information

use diesel::prelude::*;

use super::diesel_schema::{collaboration_requests, official_informations};
use super::models::{
    CollaborationRequest, CollaborationRequestChangeset, OfficialInformation,
    OfficialInformationChangeset,
};
use crate::types::IdeagramError;

pub fn insert_request(
    conn: &mut SqliteConnection,
    request: &CollaborationRequest,
) -> Result<(), IdeagramError> {
    diesel::insert_into(collaboration_requests::table)
        .values(request)
        .execute(conn)?;
    Ok(())
}

pub fn get_request(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<CollaborationRequest>, IdeagramError> {
    Ok(collaboration_requests::table
        .find(id)
        .first::<CollaborationRequest>(conn)
        .optional()?)
}

pub fn list_requests(
    conn: &mut SqliteConnection,
    idea_id: &str,
) -> Result<Vec<CollaborationRequest>, IdeagramError> {
    Ok(collaboration_requests::table
        .filter(collaboration_requests::idea_id.eq(idea_id))
        .order(collaboration_requests::created_at.asc())
        .load::<CollaborationRequest>(conn)?)
}

pub fn update_request(
    conn: &mut SqliteConnection,
    id: &str,
    changes: &CollaborationRequestChangeset,
) -> Result<CollaborationRequest, IdeagramError> {
    diesel::update(collaboration_requests::table.find(id))
        .set(changes)
        .execute(conn)?;
    Ok(collaboration_requests::table
        .find(id)
        .first::<CollaborationRequest>(conn)?)
}

pub fn delete_request(conn: &mut SqliteConnection, id: &str) -> Result<usize, IdeagramError> {
    Ok(diesel::delete(collaboration_requests::table.find(id)).execute(conn)?)
}

// ============================================================================
// Official information (one row per idea)
// ============================================================================

pub fn get_official(
    conn: &mut SqliteConnection,
    idea_id: &str,
) -> Result<Option<OfficialInformation>, IdeagramError> {
    Ok(official_informations::table
        .filter(official_informations::idea_id.eq(idea_id))
        .first::<OfficialInformation>(conn)
        .optional()?)
}

pub fn insert_official(
    conn: &mut SqliteConnection,
    info: &OfficialInformation,
) -> Result<(), IdeagramError> {
    diesel::insert_into(official_informations::table)
        .values(info)
        .execute(conn)?;
    Ok(())
}

pub fn update_official(
    conn: &mut SqliteConnection,
    idea_id: &str,
    changes: &OfficialInformationChangeset,
) -> Result<OfficialInformation, IdeagramError> {
    diesel::update(
        official_informations::table.filter(official_informations::idea_id.eq(idea_id)),
    )
    .set(changes)
    .execute(conn)?;
    Ok(official_informations::table
        .filter(official_informations::idea_id.eq(idea_id))
        .first::<OfficialInformation>(conn)?)
}

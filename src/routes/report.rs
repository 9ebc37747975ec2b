//! Abuse report routes

use super::response::{created, HandlerResult};
use super::ApiRequest;
use crate::server::AppState;
use crate::services::reports::{IdeaReportInput, ProfileReportInput};
use crate::services::Actor;

/// POST /api/report/profile/
pub fn report_profile(state: &AppState, req: &ApiRequest, actor: &Actor) -> HandlerResult {
    let input: ProfileReportInput = req.json()?;
    Ok(created(&state.services.reports.report_profile(actor, input)?))
}

/// POST /api/report/idea/
pub fn report_idea(state: &AppState, req: &ApiRequest, actor: &Actor) -> HandlerResult {
    let input: IdeaReportInput = req.json()?;
    Ok(created(&state.services.reports.report_idea(actor, input)?))
}

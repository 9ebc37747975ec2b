//! Idea routes and their sub-resources

use super::response::{created, no_content, ok, HandlerResult};
use super::{ApiRequest, OneOrMany};
use crate::server::AppState;
use crate::services::attachments::AttachmentInput;
use crate::services::collaboration::{CollaborationInput, CollaborationUpdate};
use crate::services::engagement::CommentInput;
use crate::services::funding::{DonationInput, OfficialInput};
use crate::services::ideas::{IdeaInput, IdeaUpdate};
use crate::services::steps::{
    EvolutionStepInput, EvolutionStepUpdate, FinancialStepInput, FinancialStepUpdate,
};
use crate::services::Actor;

// ============================================================================
// Catalog
// ============================================================================

/// GET /api/idea/classification/list
pub fn classifications(state: &AppState) -> HandlerResult {
    Ok(ok(&state.services.ideas.classifications()?))
}

/// GET /api/idea/organization/list
pub fn organizations(state: &AppState) -> HandlerResult {
    Ok(ok(&state.services.ideas.organizations()?))
}

// ============================================================================
// Ideas
// ============================================================================

pub fn create(state: &AppState, req: &ApiRequest, actor: &Actor) -> HandlerResult {
    let input: IdeaInput = req.json()?;
    Ok(created(&state.services.ideas.create(actor, input)?))
}

pub fn get(state: &AppState, actor: &Actor, idea_id: &str) -> HandlerResult {
    Ok(ok(&state.services.ideas.get(actor, idea_id)?))
}

pub fn update(state: &AppState, req: &ApiRequest, actor: &Actor, idea_id: &str) -> HandlerResult {
    let input: IdeaUpdate = req.json()?;
    Ok(ok(&state.services.ideas.update(actor, idea_id, input)?))
}

pub fn delete(state: &AppState, actor: &Actor, idea_id: &str) -> HandlerResult {
    state.services.ideas.delete(actor, idea_id)?;
    Ok(no_content())
}

// ============================================================================
// Evolution and financial steps
// ============================================================================

pub fn list_evolution(state: &AppState, actor: &Actor, idea_id: &str) -> HandlerResult {
    Ok(ok(&state.services.steps.list_evolution(actor, idea_id)?))
}

/// Accepts one step or a list; a list is stored all or nothing
pub fn create_evolution(state: &AppState, req: &ApiRequest, actor: &Actor, idea_id: &str) -> HandlerResult {
    let inputs: OneOrMany<EvolutionStepInput> = req.json()?;
    let steps = state
        .services
        .steps
        .create_evolution(actor, idea_id, inputs.into_vec())?;
    Ok(created(&steps))
}

pub fn update_evolution(state: &AppState, req: &ApiRequest, actor: &Actor, step_id: &str) -> HandlerResult {
    let input: EvolutionStepUpdate = req.json()?;
    Ok(ok(&state.services.steps.update_evolution(actor, step_id, input)?))
}

pub fn delete_evolution(state: &AppState, actor: &Actor, step_id: &str) -> HandlerResult {
    state.services.steps.delete_evolution(actor, step_id)?;
    Ok(no_content())
}

pub fn list_financial(state: &AppState, actor: &Actor, idea_id: &str) -> HandlerResult {
    Ok(ok(&state.services.steps.list_financial(actor, idea_id)?))
}

pub fn create_financial(state: &AppState, req: &ApiRequest, actor: &Actor, idea_id: &str) -> HandlerResult {
    let inputs: OneOrMany<FinancialStepInput> = req.json()?;
    let steps = state
        .services
        .steps
        .create_financial(actor, idea_id, inputs.into_vec())?;
    Ok(created(&steps))
}

pub fn update_financial(state: &AppState, req: &ApiRequest, actor: &Actor, step_id: &str) -> HandlerResult {
    let input: FinancialStepUpdate = req.json()?;
    Ok(ok(&state.services.steps.update_financial(actor, step_id, input)?))
}

pub fn delete_financial(state: &AppState, actor: &Actor, step_id: &str) -> HandlerResult {
    state.services.steps.delete_financial(actor, step_id)?;
    Ok(no_content())
}

// ============================================================================
// Likes and comments
// ============================================================================

pub fn likes(state: &AppState, actor: &Actor, idea_id: &str) -> HandlerResult {
    Ok(ok(&state.services.engagement.likes(actor, idea_id)?))
}

pub fn like(state: &AppState, actor: &Actor, idea_id: &str) -> HandlerResult {
    Ok(created(&state.services.engagement.like(actor, idea_id)?))
}

pub fn unlike(state: &AppState, actor: &Actor, idea_id: &str) -> HandlerResult {
    state.services.engagement.unlike(actor, idea_id)?;
    Ok(no_content())
}

pub fn comments(state: &AppState, actor: &Actor, idea_id: &str) -> HandlerResult {
    Ok(ok(&state.services.engagement.comments(actor, idea_id)?))
}

pub fn comment(state: &AppState, req: &ApiRequest, actor: &Actor, idea_id: &str) -> HandlerResult {
    let input: CommentInput = req.json()?;
    Ok(created(&state.services.engagement.comment(actor, idea_id, input)?))
}

pub fn delete_comment(state: &AppState, actor: &Actor, comment_id: &str) -> HandlerResult {
    state.services.engagement.delete_comment(actor, comment_id)?;
    Ok(no_content())
}

// ============================================================================
// Collaboration requests
// ============================================================================

pub fn collaborations(state: &AppState, actor: &Actor, idea_id: &str) -> HandlerResult {
    Ok(ok(&state.services.collaboration.list(actor, idea_id)?))
}

pub fn create_collaboration(state: &AppState, req: &ApiRequest, actor: &Actor, idea_id: &str) -> HandlerResult {
    let input: CollaborationInput = req.json()?;
    Ok(created(&state.services.collaboration.create(actor, idea_id, input)?))
}

pub fn update_collaboration(
    state: &AppState,
    req: &ApiRequest,
    actor: &Actor,
    request_id: &str,
) -> HandlerResult {
    let input: CollaborationUpdate = req.json()?;
    Ok(ok(&state.services.collaboration.update(actor, request_id, input)?))
}

pub fn delete_collaboration(state: &AppState, actor: &Actor, request_id: &str) -> HandlerResult {
    state.services.collaboration.delete(actor, request_id)?;
    Ok(no_content())
}

// ============================================================================
// Attachments
// ============================================================================

pub fn attachments(state: &AppState, actor: &Actor, idea_id: &str) -> HandlerResult {
    Ok(ok(&state.services.attachments.list(actor, idea_id)?))
}

pub fn add_attachment(state: &AppState, req: &ApiRequest, actor: &Actor, idea_id: &str) -> HandlerResult {
    let input: AttachmentInput = req.json()?;
    Ok(created(&state.services.attachments.add(actor, idea_id, input)?))
}

pub fn delete_attachment(state: &AppState, actor: &Actor, attachment_id: &str) -> HandlerResult {
    state.services.attachments.delete(actor, attachment_id)?;
    Ok(no_content())
}

// ============================================================================
// Official information and donations
// ============================================================================

pub fn official(state: &AppState, actor: &Actor, idea_id: &str) -> HandlerResult {
    Ok(ok(&state.services.funding.official(actor, idea_id)?))
}

pub fn upsert_official(state: &AppState, req: &ApiRequest, actor: &Actor, idea_id: &str) -> HandlerResult {
    let input: OfficialInput = req.json()?;
    Ok(ok(&state.services.funding.upsert_official(actor, idea_id, input)?))
}

pub fn donations(state: &AppState, actor: &Actor, idea_id: &str) -> HandlerResult {
    Ok(ok(&state.services.funding.donations(actor, idea_id)?))
}

pub fn donate(state: &AppState, req: &ApiRequest, actor: &Actor, idea_id: &str) -> HandlerResult {
    let input: DonationInput = req.json()?;
    Ok(created(&state.services.funding.donate(actor, idea_id, input)?))
}

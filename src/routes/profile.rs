//! Profile, link and follow routes

use super::response::{created, no_content, ok, HandlerResult};
use super::ApiRequest;
use crate::server::AppState;
use crate::services::profiles::{LinkInput, ProfileUpdate};
use crate::services::Actor;

pub fn get_own(state: &AppState, actor: &Actor) -> HandlerResult {
    Ok(ok(&state.services.profiles.get_own(actor)?))
}

pub fn update(state: &AppState, req: &ApiRequest, actor: &Actor) -> HandlerResult {
    let input: ProfileUpdate = req.json()?;
    Ok(ok(&state.services.profiles.update(actor, input)?))
}

pub fn get_by_username(state: &AppState, actor: &Actor, username: &str) -> HandlerResult {
    Ok(ok(&state.services.profiles.get_by_username(actor, username)?))
}

pub fn followers(state: &AppState, actor: &Actor, username: &str) -> HandlerResult {
    Ok(ok(&state.services.profiles.followers(actor, username)?))
}

pub fn followings(state: &AppState, actor: &Actor, username: &str) -> HandlerResult {
    Ok(ok(&state.services.profiles.followings(actor, username)?))
}

pub fn ideas(state: &AppState, actor: &Actor, username: &str) -> HandlerResult {
    Ok(ok(&state.services.profiles.ideas(actor, username)?))
}

pub fn links(state: &AppState, actor: &Actor) -> HandlerResult {
    Ok(ok(&state.services.profiles.links(actor)?))
}

pub fn add_link(state: &AppState, req: &ApiRequest, actor: &Actor) -> HandlerResult {
    let input: LinkInput = req.json()?;
    Ok(created(&state.services.profiles.add_link(actor, input)?))
}

pub fn delete_link(state: &AppState, actor: &Actor, link_id: &str) -> HandlerResult {
    state.services.profiles.delete_link(actor, link_id)?;
    Ok(no_content())
}

/// POST /api/user/follow/{username}/
pub fn follow(state: &AppState, actor: &Actor, username: &str) -> HandlerResult {
    Ok(created(&state.services.social.follow(actor, username)?))
}

/// DELETE /api/user/follow/{username}/
pub fn unfollow(state: &AppState, actor: &Actor, username: &str) -> HandlerResult {
    state.services.social.unfollow(actor, username)?;
    Ok(no_content())
}

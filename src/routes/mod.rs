//! HTTP routes for Ideagram
//!
//! The server collects each request into an [`ApiRequest`] and hands it to
//! [`dispatch`], which matches method and path segments to a handler.
//! Handlers are synchronous: they call services that each hold one pooled
//! SQLite connection for the duration of a transaction.

pub mod auth;
pub mod health;
pub mod idea;
pub mod profile;
pub mod report;
pub mod response;

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use hyper::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::auth::{extract_token_from_header, granted_level, is_allowed, PermissionLevel};
use crate::server::AppState;
use crate::services::Actor;
use crate::types::IdeagramError;

pub use health::health_check;
pub use response::{error_response, HandlerResult};

/// Fully buffered request as seen by the handlers
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Attach a JSON body
    pub fn with_json(mut self, value: &serde_json::Value) -> Self {
        self.body = Bytes::from(value.to_string());
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// Attach a bearer token
    pub fn with_bearer(mut self, token: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
            self.headers.insert(AUTHORIZATION, value);
        }
        self
    }

    /// Decode the body as JSON; an empty body reads as `{}`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, IdeagramError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_slice(b"{}")?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Bearer token from the Authorization header
    pub fn bearer(&self) -> Option<&str> {
        let header = self.headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());
        extract_token_from_header(header)
    }
}

/// A body that may hold one object or a list of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

/// Resolve the caller and check it holds `required`
pub fn require(state: &AppState, req: &ApiRequest, required: PermissionLevel) -> Result<Actor, IdeagramError> {
    let token = req.bearer().ok_or_else(|| {
        IdeagramError::Unauthorized("Authentication credentials were not provided.".into())
    })?;
    let actor = state.services.accounts.authenticate(token)?;
    let granted = granted_level(&actor.user, Some(&actor.profile));
    if !is_allowed(granted, required) {
        debug!(user_id = %actor.user.id, %granted, %required, "Permission denied");
        return Err(IdeagramError::Forbidden(
            "You do not have permission to perform this action.".into(),
        ));
    }
    Ok(actor)
}

/// Route a request to its handler
pub fn dispatch(state: &AppState, req: &ApiRequest) -> Response<Full<Bytes>> {
    if req.method == Method::OPTIONS {
        return response::preflight();
    }

    let segments: Vec<&str> = req.path.split('/').filter(|s| !s.is_empty()).collect();
    match route(state, req, &segments) {
        Ok(Some(response)) => response,
        Ok(None) => response::not_found(&req.path),
        Err(e) => response::error_response(e),
    }
}

fn route(
    state: &AppState,
    req: &ApiRequest,
    segments: &[&str],
) -> Result<Option<Response<Full<Bytes>>>, IdeagramError> {
    use PermissionLevel::{ActiveProfile as ACTIVE, Authenticated as AUTH};

    let response = match (req.method.clone(), segments) {
        (Method::GET, ["health"]) | (Method::GET, ["healthz"]) => health_check(state),

        // ====================================================================
        // Sessions, registration and credential recovery
        // ====================================================================
        (Method::POST, ["api", "auth", "jwt", "login"]) => auth::login(state, req)?,
        (Method::POST, ["api", "auth", "jwt", "refresh"]) => auth::refresh(state, req)?,
        (Method::POST, ["api", "auth", "jwt", "verify"]) => auth::verify(state, req)?,
        (Method::POST, ["api", "user", "register"]) => auth::register(state, req)?,
        (Method::POST, ["api", "user", "password", "reset"]) => auth::password_reset(state, req)?,
        (Method::POST, ["api", "user", "password", "reset", "confirm"]) => {
            auth::password_reset_confirm(state, req)?
        }
        (Method::GET, ["profile", "verification", token]) => auth::verify_email(state, token)?,

        // ====================================================================
        // Profiles, links and follows
        // ====================================================================
        (Method::GET, ["api", "user", "profile"]) => {
            profile::get_own(state, &require(state, req, AUTH)?)?
        }
        (Method::PUT, ["api", "user", "profile"]) => {
            profile::update(state, req, &require(state, req, AUTH)?)?
        }
        (Method::GET, ["api", "user", "profile", username]) => {
            profile::get_by_username(state, &require(state, req, AUTH)?, username)?
        }
        (Method::GET, ["api", "user", "profile", username, "followers"]) => {
            profile::followers(state, &require(state, req, AUTH)?, username)?
        }
        (Method::GET, ["api", "user", "profile", username, "followings"]) => {
            profile::followings(state, &require(state, req, AUTH)?, username)?
        }
        (Method::GET, ["api", "user", "profile", username, "ideas"]) => {
            profile::ideas(state, &require(state, req, AUTH)?, username)?
        }
        (Method::GET, ["api", "user", "links"]) => {
            profile::links(state, &require(state, req, ACTIVE)?)?
        }
        (Method::POST, ["api", "user", "links"]) => {
            profile::add_link(state, req, &require(state, req, ACTIVE)?)?
        }
        (Method::DELETE, ["api", "user", "links", link_id]) => {
            profile::delete_link(state, &require(state, req, ACTIVE)?, link_id)?
        }
        (Method::POST, ["api", "user", "follow", username]) => {
            profile::follow(state, &require(state, req, ACTIVE)?, username)?
        }
        (Method::DELETE, ["api", "user", "follow", username]) => {
            profile::unfollow(state, &require(state, req, ACTIVE)?, username)?
        }

        // ====================================================================
        // Ideas - literal second segments first so ids never shadow them
        // ====================================================================
        (Method::GET, ["api", "idea", "classification", "list"]) => idea::classifications(state)?,
        (Method::GET, ["api", "idea", "organization", "list"]) => idea::organizations(state)?,
        (Method::PUT, ["api", "idea", "evolution", step_id]) => {
            idea::update_evolution(state, req, &require(state, req, ACTIVE)?, step_id)?
        }
        (Method::DELETE, ["api", "idea", "evolution", step_id]) => {
            idea::delete_evolution(state, &require(state, req, ACTIVE)?, step_id)?
        }
        (Method::PUT, ["api", "idea", "financial", step_id]) => {
            idea::update_financial(state, req, &require(state, req, ACTIVE)?, step_id)?
        }
        (Method::DELETE, ["api", "idea", "financial", step_id]) => {
            idea::delete_financial(state, &require(state, req, ACTIVE)?, step_id)?
        }
        (Method::DELETE, ["api", "idea", "comment", comment_id]) => {
            idea::delete_comment(state, &require(state, req, ACTIVE)?, comment_id)?
        }
        (Method::PUT, ["api", "idea", "collaboration", request_id]) => {
            idea::update_collaboration(state, req, &require(state, req, ACTIVE)?, request_id)?
        }
        (Method::DELETE, ["api", "idea", "collaboration", request_id]) => {
            idea::delete_collaboration(state, &require(state, req, ACTIVE)?, request_id)?
        }
        (Method::DELETE, ["api", "idea", "attachment", attachment_id]) => {
            idea::delete_attachment(state, &require(state, req, ACTIVE)?, attachment_id)?
        }

        (Method::POST, ["api", "idea"]) => idea::create(state, req, &require(state, req, ACTIVE)?)?,
        (Method::GET, ["api", "idea", idea_id]) => {
            idea::get(state, &require(state, req, AUTH)?, idea_id)?
        }
        (Method::PUT, ["api", "idea", idea_id]) => {
            idea::update(state, req, &require(state, req, AUTH)?, idea_id)?
        }
        (Method::DELETE, ["api", "idea", idea_id]) => {
            idea::delete(state, &require(state, req, AUTH)?, idea_id)?
        }

        (Method::GET, ["api", "idea", idea_id, "evolution"]) => {
            idea::list_evolution(state, &require(state, req, ACTIVE)?, idea_id)?
        }
        (Method::POST, ["api", "idea", idea_id, "evolution"]) => {
            idea::create_evolution(state, req, &require(state, req, ACTIVE)?, idea_id)?
        }
        (Method::GET, ["api", "idea", idea_id, "financial"]) => {
            idea::list_financial(state, &require(state, req, ACTIVE)?, idea_id)?
        }
        (Method::POST, ["api", "idea", idea_id, "financial"]) => {
            idea::create_financial(state, req, &require(state, req, ACTIVE)?, idea_id)?
        }
        (Method::GET, ["api", "idea", idea_id, "like"]) => {
            idea::likes(state, &require(state, req, AUTH)?, idea_id)?
        }
        (Method::POST, ["api", "idea", idea_id, "like"]) => {
            idea::like(state, &require(state, req, AUTH)?, idea_id)?
        }
        (Method::DELETE, ["api", "idea", idea_id, "like"]) => {
            idea::unlike(state, &require(state, req, AUTH)?, idea_id)?
        }
        (Method::GET, ["api", "idea", idea_id, "comment"]) => {
            idea::comments(state, &require(state, req, ACTIVE)?, idea_id)?
        }
        (Method::POST, ["api", "idea", idea_id, "comment"]) => {
            idea::comment(state, req, &require(state, req, ACTIVE)?, idea_id)?
        }
        (Method::GET, ["api", "idea", idea_id, "collaboration"]) => {
            idea::collaborations(state, &require(state, req, ACTIVE)?, idea_id)?
        }
        (Method::POST, ["api", "idea", idea_id, "collaboration"]) => {
            idea::create_collaboration(state, req, &require(state, req, ACTIVE)?, idea_id)?
        }
        (Method::GET, ["api", "idea", idea_id, "attachment"]) => {
            idea::attachments(state, &require(state, req, ACTIVE)?, idea_id)?
        }
        (Method::POST, ["api", "idea", idea_id, "attachment"]) => {
            idea::add_attachment(state, req, &require(state, req, ACTIVE)?, idea_id)?
        }
        (Method::GET, ["api", "idea", idea_id, "official"]) => {
            idea::official(state, &require(state, req, ACTIVE)?, idea_id)?
        }
        (Method::PUT, ["api", "idea", idea_id, "official"]) => {
            idea::upsert_official(state, req, &require(state, req, ACTIVE)?, idea_id)?
        }
        (Method::GET, ["api", "idea", idea_id, "donation"]) => {
            idea::donations(state, &require(state, req, ACTIVE)?, idea_id)?
        }
        (Method::POST, ["api", "idea", idea_id, "donation"]) => {
            idea::donate(state, req, &require(state, req, ACTIVE)?, idea_id)?
        }

        // ====================================================================
        // Reports
        // ====================================================================
        (Method::POST, ["api", "report", "profile"]) => {
            report::report_profile(state, req, &require(state, req, AUTH)?)?
        }
        (Method::POST, ["api", "report", "idea"]) => {
            report::report_idea(state, req, &require(state, req, AUTH)?)?
        }

        _ => return Ok(None),
    };
    Ok(Some(response))
}

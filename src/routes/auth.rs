//! Session, registration and credential recovery routes

use hyper::StatusCode;
use serde::Deserialize;
use serde_json::json;

use super::response::{created, error_response, ok, text_response, HandlerResult};
use super::ApiRequest;
use crate::server::AppState;
use crate::services::accounts::{LoginInput, PasswordResetConfirmInput, RegisterInput};
use crate::types::IdeagramError;

#[derive(Debug, Deserialize)]
struct RefreshRequest {
    #[serde(default)]
    refresh: String,
}

#[derive(Debug, Deserialize)]
struct VerifyRequest {
    #[serde(default)]
    token: String,
}

#[derive(Debug, Deserialize)]
struct PasswordResetRequest {
    #[serde(default)]
    email: String,
}

/// POST /api/auth/jwt/login/
pub fn login(state: &AppState, req: &ApiRequest) -> HandlerResult {
    let input: LoginInput = req.json()?;
    let tokens = state.services.accounts.login(input)?;
    Ok(ok(&tokens))
}

/// POST /api/auth/jwt/refresh/
pub fn refresh(state: &AppState, req: &ApiRequest) -> HandlerResult {
    let input: RefreshRequest = req.json()?;
    let access = state.services.accounts.refresh(&input.refresh)?;
    Ok(ok(&json!({ "access": access })))
}

/// POST /api/auth/jwt/verify/
pub fn verify(state: &AppState, req: &ApiRequest) -> HandlerResult {
    let input: VerifyRequest = req.json()?;
    state.services.accounts.verify(&input.token)?;
    Ok(ok(&json!({})))
}

/// POST /api/user/register/
pub fn register(state: &AppState, req: &ApiRequest) -> HandlerResult {
    let input: RegisterInput = req.json()?;
    let output = state.services.accounts.register(input)?;
    Ok(created(&output))
}

/// POST /api/user/password/reset/
///
/// Answers the same way whether or not the email is registered.
pub fn password_reset(state: &AppState, req: &ApiRequest) -> HandlerResult {
    let input: PasswordResetRequest = req.json()?;
    state.services.accounts.request_password_reset(&input.email)?;
    Ok(ok(&json!({
        "detail": "If this email is registered a reset code has been sent."
    })))
}

/// POST /api/user/password/reset/confirm/
pub fn password_reset_confirm(state: &AppState, req: &ApiRequest) -> HandlerResult {
    let input: PasswordResetConfirmInput = req.json()?;
    state.services.accounts.confirm_password_reset(input)?;
    Ok(ok(&json!({ "detail": "Password has been changed." })))
}

/// GET /profile/verification/{token}
///
/// Opened from the email client, so it answers in plain text.
pub fn verify_email(state: &AppState, token: &str) -> HandlerResult {
    match state.services.accounts.verify_email(token) {
        Ok(_) => Ok(text_response(
            StatusCode::OK,
            "Your email has been successfully verified",
        )),
        Err(IdeagramError::NotFound(_)) => Ok(text_response(
            StatusCode::NOT_FOUND,
            "Invalid verification URL!",
        )),
        Err(e) => Ok(error_response(e)),
    }
}

//! In-process caches
//!
//! Only short-lived one-time codes live here; nothing is persisted.

pub mod codes;

pub use codes::{spawn_cleanup_task, CodeCheck, CodeStore};

/// Cache key for the verification token issued to an email address
pub fn email_verification_key(email: &str) -> String {
    format!("email_verification__{}", email)
}

/// Cache key mapping a verification token back to its email address
pub fn email_verification_token_key(token: &str) -> String {
    format!("email_verification_token__{}", token)
}

/// Cache key for a password reset code
pub fn password_reset_key(email: &str) -> String {
    format!("password_reset__{}", email)
}

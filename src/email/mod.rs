//! Transactional email
//!
//! Messages are rendered on the request path, queued, and delivered by a
//! background task. Requests never wait for delivery.

pub mod dispatcher;
pub mod mailer;

pub use dispatcher::{EmailDispatcher, EmailJob, EmailWorker};
pub use mailer::{LogMailer, Mailer, MemoryMailer, OutgoingEmail};

/// Kind of email, stored with each record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    EmailVerification,
    PasswordReset,
    Notification,
}

impl EmailKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailVerification => "email_verification",
            Self::PasswordReset => "password_reset",
            Self::Notification => "notification",
        }
    }
}

/// Subject and HTML body of the account activation email
pub fn render_verification(username: &str, url: &str) -> (String, String) {
    (
        "Activate your account".to_string(),
        format!(
            "<p>Hi {},</p><p>Confirm your email address to activate your Ideagram account:</p>\
             <p><a href=\"{url}\">{url}</a></p>",
            username,
            url = url
        ),
    )
}

/// Subject and HTML body of the password reset email
pub fn render_password_reset(username: &str, code: &str) -> (String, String) {
    (
        "Change Password".to_string(),
        format!(
            "<p>Hi {},</p><p>Your password reset code is <strong>{}</strong>.</p>\
             <p>If you did not ask for it you can ignore this email.</p>",
            username, code
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_verification_contains_link() {
        let (subject, body) = render_verification("alice", "http://x/profile/verification/abc");
        assert_eq!(subject, "Activate your account");
        assert!(body.contains("alice"));
        assert!(body.contains("http://x/profile/verification/abc"));
    }

    #[test]
    fn test_render_reset_contains_code() {
        let (_, body) = render_password_reset("bob", "123456");
        assert!(body.contains("123456"));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(EmailKind::EmailVerification.as_str(), "email_verification");
        assert_eq!(EmailKind::PasswordReset.as_str(), "password_reset");
    }
}

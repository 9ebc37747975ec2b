//! Input validation rules
//!
//! Validators collect every problem per field before failing, so a client
//! gets all messages for a request at once.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{FieldErrors, IdeagramError};

pub const GENDER_TYPES: &[&str] = &["male", "female", "other"];
pub const LINK_TYPES: &[&str] = &[
    "github", "gitlab", "telegram", "linkedin", "instagram", "facebook", "twitter",
];
pub const REPORT_REASONS: &[&str] = &[
    "spam",
    "promoting violence",
    "encouragement to commit suicide",
];
pub const COLLABORATION_STATUSES: &[&str] = &["full_time", "part_time", "freelance"];

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]").expect("valid regex"));
static LETTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-zA-Z]").expect("valid regex"));
static SPECIAL_CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[@_!#$%^&*()<>?/\\|}{~:]").expect("valid regex"));
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));

/// Accumulates field errors
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Record `message` unless `ok`
    pub fn check(&mut self, field: &str, ok: bool, message: impl Into<String>) {
        if !ok {
            self.add(field, message);
        }
    }

    pub fn required(&mut self, field: &str, value: &str) {
        self.check(field, !value.trim().is_empty(), "This field may not be blank.");
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        self.check(
            field,
            value.chars().count() <= max,
            format!("Ensure this field has no more than {} characters.", max),
        );
    }

    pub fn choice(&mut self, field: &str, value: &str, allowed: &[&str]) {
        self.check(
            field,
            allowed.contains(&value),
            format!("\"{}\" is not a valid choice.", value),
        );
    }

    pub fn date(&mut self, field: &str, value: &str) {
        self.check(
            field,
            chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
            "Date has wrong format. Use YYYY-MM-DD.",
        );
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), IdeagramError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(IdeagramError::Validation(self.errors))
        }
    }
}

/// Lowercase and trim an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(v: &mut Validator, field: &str, email: &str) {
    if email.trim().is_empty() {
        v.add(field, "Users must have an email address");
        return;
    }
    v.max_len(field, email, 255);
    v.check(field, EMAIL.is_match(email.trim()), "Enter a valid email address.");
}

/// Password must hold a digit, a letter, a special char and be 8+ long
pub fn validate_password(v: &mut Validator, field: &str, password: &str) {
    v.max_len(field, password, 256);
    v.check(field, NUMBER.is_match(password), "Value must include number");
    v.check(field, LETTER.is_match(password), "Value must include letter");
    v.check(
        field,
        SPECIAL_CHAR.is_match(password),
        "Value must include special char",
    );
    v.check(
        field,
        password.chars().count() >= 8,
        "Ensure this field has at least 8 characters.",
    );
}

pub fn validate_username(v: &mut Validator, field: &str, username: &str) {
    v.required(field, username);
    v.max_len(field, username, 128);
    v.check(
        field,
        !SPECIAL_CHAR.is_match(username),
        "Value must not include special char",
    );
}

/// http(s) URL with a host, at most 500 chars
pub fn validate_url(v: &mut Validator, field: &str, link: &str) {
    v.max_len(field, link, 500);
    let ok = match url::Url::parse(link) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some(),
        Err(_) => false,
    };
    v.check(field, ok, "Enter a valid URL.");
}

/// First forbidden word found as a case-insensitive substring of `text`
///
/// No tokenization: "assassin" matches "ass".
pub fn find_forbidden_word<'a>(text: &str, words: &'a [String]) -> Option<&'a str> {
    let lowered = text.to_lowercase();
    words
        .iter()
        .map(|w| w.as_str())
        .find(|w| !w.is_empty() && lowered.contains(&w.to_lowercase()))
}

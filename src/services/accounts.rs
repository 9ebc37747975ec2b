//! Account service - registration, sessions and credential recovery

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth::{hash_password, verify_password, JwtValidator, TokenPair, TokenType};
use crate::cache::{self, CodeCheck, CodeStore};
use crate::config::EmailArgs;
use crate::db::models::{new_id, Profile, User};
use crate::db::{profiles, users, Database};
use crate::email::{self, EmailDispatcher, EmailJob, EmailKind};
use crate::types::IdeagramError;
use crate::validation::{normalize_email, validate_email, validate_password, validate_username, Validator};

use super::events::{DomainEvent, EventBus};
use super::Actor;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterOutput {
    pub email: String,
    pub token: TokenPair,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetConfirmInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub password: String,
}

/// Account service for identity and session logic
pub struct AccountService {
    db: Database,
    events: Arc<EventBus>,
    jwt: Arc<JwtValidator>,
    codes: Arc<CodeStore>,
    emails: EmailDispatcher,
    config: EmailArgs,
}

impl AccountService {
    pub fn new(
        db: Database,
        events: Arc<EventBus>,
        jwt: Arc<JwtValidator>,
        codes: Arc<CodeStore>,
        emails: EmailDispatcher,
        config: EmailArgs,
    ) -> Self {
        Self {
            db,
            events,
            jwt,
            codes,
            emails,
            config,
        }
    }

    // =========================================================================
    // Registration & sessions
    // =========================================================================

    /// Create a user and its profile, then queue the verification email
    pub fn register(&self, input: RegisterInput) -> Result<RegisterOutput, IdeagramError> {
        let email = normalize_email(&input.email);
        let username = input.username.trim().to_string();

        let mut v = Validator::new();
        validate_email(&mut v, "email", &email);
        validate_username(&mut v, "username", &username);
        if input.password.is_empty() {
            v.add("password", "This field may not be blank.");
        } else {
            validate_password(&mut v, "password", &input.password);
        }
        v.finish()?;

        let password_hash = hash_password(&input.password)?;
        let user_id = new_id();
        let profile_id = new_id();

        let (user, profile) = self.db.transaction(|conn| {
            let mut v = Validator::new();
            v.check("email", !users::email_exists(conn, &email)?, "email Already Taken");
            v.check(
                "username",
                !profiles::username_exists(conn, &username)?,
                "profile with this username already exists.",
            );
            v.finish()?;

            let user = users::insert_user(conn, &user_id, &email, &password_hash, false)?;
            let profile = profiles::insert_profile(conn, &profile_id, &user_id, &username)?;
            Ok((user, profile))
        })?;

        info!(user_id = %user.id, username = %profile.username, "User registered");
        self.events.emit(DomainEvent::UserRegistered {
            user_id: user.id.clone(),
            email: user.email.clone(),
            username: profile.username.clone(),
        });

        self.send_verification_email(&user, &profile);

        Ok(RegisterOutput {
            email: user.email,
            token: self.jwt.generate_pair(&user.id)?,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }

    /// Exchange username and password for a token pair
    pub fn login(&self, input: LoginInput) -> Result<TokenPair, IdeagramError> {
        let no_account =
            || IdeagramError::Unauthorized("No active account found with given information.".into());

        let user = self.db.with_conn(|conn| {
            let profile = match profiles::get_profile_by_username(conn, input.username.trim())? {
                Some(p) if p.is_profile_active() => p,
                _ => return Ok(None),
            };
            users::get_user(conn, &profile.user_id)
        })?;
        let user = user.ok_or_else(no_account)?;

        if !user.is_active || !verify_password(&input.password, &user.password_hash)? {
            return Err(IdeagramError::Unauthorized("Invalid username/password.".into()));
        }

        debug!(user_id = %user.id, "Login succeeded");
        self.jwt.generate_pair(&user.id)
    }

    /// New access token from a refresh token
    pub fn refresh(&self, refresh_token: &str) -> Result<String, IdeagramError> {
        self.jwt.refresh_access_token(refresh_token)
    }

    /// Check that a token of either type is valid
    pub fn verify(&self, token: &str) -> Result<(), IdeagramError> {
        let result = self.jwt.verify_token(token);
        if result.valid {
            Ok(())
        } else {
            Err(IdeagramError::Unauthorized(
                result.error.unwrap_or_else(|| "Token is invalid or expired".into()),
            ))
        }
    }

    /// Resolve an access token to the calling user and profile
    pub fn authenticate(&self, token: &str) -> Result<Actor, IdeagramError> {
        let claims = self.jwt.verify_typed(token, TokenType::Access)?;
        self.db.with_conn(|conn| {
            let user = users::get_user(conn, &claims.user_id)?
                .ok_or_else(|| IdeagramError::Unauthorized("User not found".into()))?;
            let profile = profiles::get_profile_by_user(conn, &user.id)?
                .ok_or_else(|| IdeagramError::Unauthorized("User has no profile".into()))?;
            Ok(Actor { user, profile })
        })
    }

    // =========================================================================
    // Email verification
    // =========================================================================

    /// Issue (or reuse) a verification token and queue the email
    pub fn send_verification_email(&self, user: &User, profile: &Profile) -> bool {
        let ttl = Duration::from_secs(self.config.email_verify_expire_minutes * 60);
        let email_key = cache::email_verification_key(&user.email);

        let token = match self.codes.get(&email_key) {
            Some(token) => token,
            None => {
                let token = hex::encode(rand::thread_rng().gen::<[u8; 16]>());
                self.codes.set(&email_key, &token, ttl);
                self.codes
                    .set(&cache::email_verification_token_key(&token), &user.email, ttl);
                token
            }
        };

        let url = format!("{}{}", self.config.email_verify_url, token);
        let (subject, content) = email::render_verification(&profile.username, &url);
        self.emails.enqueue(EmailJob {
            user_id: user.id.clone(),
            to: user.email.clone(),
            kind: EmailKind::EmailVerification,
            subject,
            content,
        })
    }

    /// Mark the address behind `token` as verified, returns that address
    pub fn verify_email(&self, token: &str) -> Result<String, IdeagramError> {
        let token_key = cache::email_verification_token_key(token);
        let email = self
            .codes
            .get(&token_key)
            .ok_or_else(|| IdeagramError::NotFound("Verification link is invalid or expired".into()))?;

        let updated = self.db.with_conn(|conn| users::mark_email_verified(conn, &email))?;
        self.codes.delete(&token_key);
        self.codes.delete(&cache::email_verification_key(&email));

        if updated == 0 {
            return Err(IdeagramError::NotFound("User not found".into()));
        }

        info!(email = %email, "Email verified");
        self.events.emit(DomainEvent::EmailVerified {
            email: email.clone(),
        });
        Ok(email)
    }

    // =========================================================================
    // Password reset
    // =========================================================================

    /// Queue a reset code for `email`
    ///
    /// Unknown addresses succeed silently.
    pub fn request_password_reset(&self, email: &str) -> Result<(), IdeagramError> {
        let email = normalize_email(email);
        let mut v = Validator::new();
        validate_email(&mut v, "email", &email);
        v.finish()?;

        let found = self.db.with_conn(|conn| {
            let Some(user) = users::get_user_by_email(conn, &email)? else {
                return Ok(None);
            };
            let profile = profiles::get_profile_by_user(conn, &user.id)?;
            Ok(Some((user, profile)))
        })?;

        let Some((user, profile)) = found else {
            debug!(email = %email, "Password reset requested for unknown email");
            return Ok(());
        };

        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
        self.codes.set_with_attempts(
            &cache::password_reset_key(&email),
            &code,
            Duration::from_secs(self.config.password_reset_expire_minutes * 60),
            self.config.password_reset_max_attempts,
        );

        let username = profile.map(|p| p.username).unwrap_or_else(|| user.email.clone());
        let (subject, content) = email::render_password_reset(&username, &code);
        self.emails.enqueue(EmailJob {
            user_id: user.id,
            to: email,
            kind: EmailKind::PasswordReset,
            subject,
            content,
        });
        Ok(())
    }

    /// Set a new password if `code` matches the issued reset code
    pub fn confirm_password_reset(&self, input: PasswordResetConfirmInput) -> Result<(), IdeagramError> {
        let email = normalize_email(&input.email);

        let mut v = Validator::new();
        validate_email(&mut v, "email", &email);
        v.required("code", &input.code);
        validate_password(&mut v, "password", &input.password);
        v.finish()?;

        let key = cache::password_reset_key(&email);
        match self.codes.check_code(&key, input.code.trim()) {
            CodeCheck::Valid => {}
            CodeCheck::Invalid { remaining } => {
                return Err(IdeagramError::field(
                    "code",
                    format!("Invalid code, {} attempts remaining", remaining),
                ));
            }
            CodeCheck::Missing => {
                return Err(IdeagramError::field("code", "Code is invalid or expired"));
            }
        }

        let password_hash = hash_password(&input.password)?;
        let user_id = self.db.transaction(|conn| {
            let user = users::get_user_by_email(conn, &email)?
                .ok_or_else(|| IdeagramError::NotFound("User not found".into()))?;
            users::set_password_hash(conn, &user.id, &password_hash)?;
            Ok(user.id)
        })?;
        self.codes.delete(&key);

        info!(user_id = %user_id, "Password reset");
        self.events.emit(DomainEvent::PasswordChanged { user_id });
        Ok(())
    }
}

//! Configuration for Ideagram
//!
//! CLI arguments and environment variable handling using clap.
//! Every setting can come from the command line, the environment or a `.env` file.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::types::IdeagramError;

pub const DEFAULT_IDEA_MAX_REPORT_COUNT: i64 = 10;
pub const DEFAULT_MAX_EVOLUTIONARY_STEPS_COUNT: i32 = 20;
pub const DEFAULT_MAX_FINANCIAL_STEPS_COUNT: i32 = 20;
pub const DEFAULT_MAX_ATTACHMENTS_COUNT: i64 = 5;
pub const DEFAULT_EMAIL_VERIFY_EXPIRE_MINUTES: u64 = 60;
pub const DEFAULT_PASSWORD_RESET_EXPIRE_MINUTES: u64 = 10;
pub const DEFAULT_PASSWORD_RESET_MAX_ATTEMPTS: u32 = 3;

/// Ideagram - share ideas, follow people, fund what you believe in
#[derive(Parser, Debug, Clone)]
#[command(name = "ideagram")]
#[command(about = "Ideagram social idea platform API server")]
pub struct Args {
    /// Command to run (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8000")]
    pub listen: SocketAddr,

    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "ideagram.db")]
    pub database_path: PathBuf,

    /// Directory for uploaded attachments
    #[arg(long, env = "MEDIA_DIR", default_value = "media")]
    pub media_dir: PathBuf,

    /// Enable development mode (insecure default JWT secret)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// JWT secret for token signing (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// Access token lifetime in seconds
    #[arg(long, env = "JWT_ACCESS_EXPIRY_SECONDS", default_value = "3600")]
    pub jwt_access_expiry_seconds: u64,

    /// Refresh token lifetime in seconds
    #[arg(long, env = "JWT_REFRESH_EXPIRY_SECONDS", default_value = "604800")]
    pub jwt_refresh_expiry_seconds: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum accepted request body in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value = "10485760")]
    pub max_body_bytes: usize,

    /// Content limits
    #[command(flatten)]
    pub limits: LimitArgs,

    /// Outgoing email configuration
    #[command(flatten)]
    pub email: EmailArgs,
}

/// Limits on user generated content
#[derive(Parser, Debug, Clone)]
pub struct LimitArgs {
    /// Unchecked reports an idea may collect before it is deactivated
    #[arg(long, env = "IDEA_MAX_REPORT_COUNT", default_value_t = DEFAULT_IDEA_MAX_REPORT_COUNT)]
    pub idea_max_report_count: i64,

    /// Highest allowed evolution step priority
    #[arg(long, env = "MAX_EVOLUTIONARY_STEPS_COUNT", default_value_t = DEFAULT_MAX_EVOLUTIONARY_STEPS_COUNT)]
    pub max_evolutionary_steps_count: i32,

    /// Highest allowed financial step priority
    #[arg(long, env = "MAX_FINANCIAL_STEPS_COUNT", default_value_t = DEFAULT_MAX_FINANCIAL_STEPS_COUNT)]
    pub max_financial_steps_count: i32,

    /// Attachments allowed per idea
    #[arg(long, env = "MAX_ATTACHMENTS_COUNT", default_value_t = DEFAULT_MAX_ATTACHMENTS_COUNT)]
    pub max_attachments_count: i64,
}

impl Default for LimitArgs {
    fn default() -> Self {
        Self {
            idea_max_report_count: DEFAULT_IDEA_MAX_REPORT_COUNT,
            max_evolutionary_steps_count: DEFAULT_MAX_EVOLUTIONARY_STEPS_COUNT,
            max_financial_steps_count: DEFAULT_MAX_FINANCIAL_STEPS_COUNT,
            max_attachments_count: DEFAULT_MAX_ATTACHMENTS_COUNT,
        }
    }
}

/// Outgoing email configuration
#[derive(Parser, Debug, Clone)]
pub struct EmailArgs {
    /// Sender address for outgoing mail
    #[arg(long, env = "EMAIL_SENDER", default_value = "noreply@ideagram.local")]
    pub email_sender: String,

    /// Prefix of the link sent in verification emails (token is appended)
    #[arg(
        long,
        env = "EMAIL_VERIFY_URL",
        default_value = "http://localhost:8000/profile/verification/"
    )]
    pub email_verify_url: String,

    /// Verification token lifetime in minutes
    #[arg(long, env = "EMAIL_VERIFY_EXPIRE_MINUTES", default_value_t = DEFAULT_EMAIL_VERIFY_EXPIRE_MINUTES)]
    pub email_verify_expire_minutes: u64,

    /// Password reset code lifetime in minutes
    #[arg(long, env = "PASSWORD_RESET_EXPIRE_MINUTES", default_value_t = DEFAULT_PASSWORD_RESET_EXPIRE_MINUTES)]
    pub password_reset_expire_minutes: u64,

    /// Wrong guesses allowed before a reset code is discarded
    #[arg(long, env = "PASSWORD_RESET_MAX_ATTEMPTS", default_value_t = DEFAULT_PASSWORD_RESET_MAX_ATTEMPTS)]
    pub password_reset_max_attempts: u32,

    /// Capacity of the outgoing email queue
    #[arg(long, env = "EMAIL_QUEUE_SIZE", default_value = "256")]
    pub email_queue_size: usize,
}

impl Default for EmailArgs {
    fn default() -> Self {
        Self {
            email_sender: "noreply@ideagram.local".to_string(),
            email_verify_url: "http://localhost:8000/profile/verification/".to_string(),
            email_verify_expire_minutes: DEFAULT_EMAIL_VERIFY_EXPIRE_MINUTES,
            password_reset_expire_minutes: DEFAULT_PASSWORD_RESET_EXPIRE_MINUTES,
            password_reset_max_attempts: DEFAULT_PASSWORD_RESET_MAX_ATTEMPTS,
            email_queue_size: 256,
        }
    }
}

/// Top level commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP API server
    Serve,
    /// Create or upgrade the database schema and exit
    Migrate,
    /// Manage the forbidden word list used by idea moderation
    ForbiddenWords {
        #[command(subcommand)]
        action: WordAction,
    },
    /// Manage idea classifications
    Classifications {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage organizations referenced by official information
    Organizations {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Ban a profile by username, or lift the ban
    BanProfile {
        username: String,
        #[arg(long)]
        lift: bool,
    },
    /// Ban an idea by id, or lift the ban
    BanIdea {
        id: String,
        #[arg(long)]
        lift: bool,
    },
}

/// Forbidden word actions
#[derive(Subcommand, Debug, Clone)]
pub enum WordAction {
    Add { word: String },
    Remove { word: String },
    List,
}

/// Catalog actions
#[derive(Subcommand, Debug, Clone)]
pub enum CatalogAction {
    Add { name: String },
    List,
}

impl Args {
    /// Get effective JWT secret (uses default in dev mode)
    pub fn jwt_secret(&self) -> Result<String, IdeagramError> {
        match (&self.jwt_secret, self.dev_mode) {
            (Some(secret), _) => Ok(secret.clone()),
            (None, true) => Ok("dev-only-insecure-secret-do-not-deploy-0123456789".to_string()),
            (None, false) => Err(IdeagramError::Config(
                "JWT_SECRET is required in production mode".into(),
            )),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode && self.jwt_secret.is_none() {
            return Err("JWT_SECRET is required in production mode".to_string());
        }

        if self.jwt_access_expiry_seconds == 0 || self.jwt_refresh_expiry_seconds == 0 {
            return Err("JWT expiry must be greater than zero".to_string());
        }

        if self.jwt_access_expiry_seconds > self.jwt_refresh_expiry_seconds {
            return Err(
                "JWT_ACCESS_EXPIRY_SECONDS must not exceed JWT_REFRESH_EXPIRY_SECONDS".to_string(),
            );
        }

        if self.limits.max_attachments_count < 0 {
            return Err("MAX_ATTACHMENTS_COUNT must not be negative".to_string());
        }

        if self.email.password_reset_max_attempts == 0 {
            return Err("PASSWORD_RESET_MAX_ATTEMPTS must be at least 1".to_string());
        }

        Ok(())
    }
}

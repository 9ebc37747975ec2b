//! Service layer for Ideagram
//!
//! Services hold the business rules between HTTP handlers and repositories:
//! - Input validation
//! - Ownership and visibility checks
//! - Counter maintenance
//! - Event emission
//! - Transaction boundaries
//!
//! ## Architecture
//!
//! ```text
//! HTTP Handlers (thin)
//!     ↓
//! Service Layer (business logic)
//!     ↓
//! Repository Layer (db/*.rs)
//!     ↓
//! SQLite Database
//! ```
//!
//! Each write runs in one `Database::transaction`. Repository calls inside it
//! share that connection; services never open a second connection while one
//! is held.

pub mod events;
pub mod accounts;
pub mod profiles;
pub mod social;
pub mod ideas;
pub mod steps;
pub mod engagement;
pub mod collaboration;
pub mod attachments;
pub mod funding;
pub mod reports;
pub mod moderation;

pub use events::{spawn_logging_listener, DomainEvent, EventBus, EventListener};
pub use accounts::AccountService;
pub use profiles::ProfileService;
pub use social::SocialService;
pub use ideas::IdeaService;
pub use steps::StepService;
pub use engagement::EngagementService;
pub use collaboration::CollaborationService;
pub use attachments::AttachmentService;
pub use funding::FundingService;
pub use reports::ReportService;
pub use moderation::ModerationService;

use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::JwtValidator;
use crate::cache::CodeStore;
use crate::config::{Args, EmailArgs, LimitArgs};
use crate::db::models::{Profile, User};
use crate::db::Database;
use crate::email::EmailDispatcher;

/// Tunables shared by the services
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub limits: LimitArgs,
    pub email: EmailArgs,
    pub media_dir: PathBuf,
}

impl ServiceConfig {
    pub fn from_args(args: &Args) -> Self {
        Self {
            limits: args.limits.clone(),
            email: args.email.clone(),
            media_dir: args.media_dir.clone(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            limits: LimitArgs::default(),
            email: EmailArgs::default(),
            media_dir: PathBuf::from("media"),
        }
    }
}

/// Authenticated caller with their profile
#[derive(Debug, Clone)]
pub struct Actor {
    pub user: User,
    pub profile: Profile,
}

impl Actor {
    pub fn profile_id(&self) -> &str {
        &self.profile.id
    }
}

/// Service container for dependency injection
///
/// Holds all services with the shared database. Pass this to the router
/// for handler access.
pub struct Services {
    pub accounts: Arc<AccountService>,
    pub profiles: Arc<ProfileService>,
    pub social: Arc<SocialService>,
    pub ideas: Arc<IdeaService>,
    pub steps: Arc<StepService>,
    pub engagement: Arc<EngagementService>,
    pub collaboration: Arc<CollaborationService>,
    pub attachments: Arc<AttachmentService>,
    pub funding: Arc<FundingService>,
    pub reports: Arc<ReportService>,
    pub moderation: Arc<ModerationService>,
    pub events: Arc<EventBus>,
    pub db: Database,
}

impl Services {
    /// Create all services with a shared database
    pub fn new(
        db: Database,
        jwt: JwtValidator,
        codes: Arc<CodeStore>,
        emails: EmailDispatcher,
        config: ServiceConfig,
    ) -> Self {
        let events = Arc::new(EventBus::new());
        let jwt = Arc::new(jwt);

        Self {
            accounts: Arc::new(AccountService::new(
                db.clone(),
                events.clone(),
                jwt,
                codes,
                emails,
                config.email.clone(),
            )),
            profiles: Arc::new(ProfileService::new(db.clone(), events.clone())),
            social: Arc::new(SocialService::new(db.clone(), events.clone())),
            ideas: Arc::new(IdeaService::new(
                db.clone(),
                events.clone(),
                config.media_dir.clone(),
            )),
            steps: Arc::new(StepService::new(db.clone(), events.clone(), config.limits.clone())),
            engagement: Arc::new(EngagementService::new(db.clone(), events.clone())),
            collaboration: Arc::new(CollaborationService::new(db.clone(), events.clone())),
            attachments: Arc::new(AttachmentService::new(
                db.clone(),
                events.clone(),
                config.media_dir.clone(),
                config.limits.max_attachments_count,
            )),
            funding: Arc::new(FundingService::new(db.clone(), events.clone())),
            reports: Arc::new(ReportService::new(
                db.clone(),
                events.clone(),
                config.limits.idea_max_report_count,
            )),
            moderation: Arc::new(ModerationService::new(db.clone())),
            events,
            db,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixtures shared by the service tests

    use super::*;
    use crate::db::{profiles, users};
    use crate::email::{EmailWorker, MemoryMailer};

    pub struct Harness {
        pub services: Services,
        pub worker: EmailWorker,
        pub mailer: Arc<MemoryMailer>,
        pub codes: Arc<CodeStore>,
        pub media: tempfile::TempDir,
    }

    pub fn harness() -> Harness {
        let db = Database::open_in_memory().unwrap();
        let mailer = Arc::new(MemoryMailer::new());
        let (dispatcher, worker) =
            EmailDispatcher::channel(64, db.clone(), mailer.clone(), "noreply@ideagram.test");
        let codes = Arc::new(CodeStore::new());
        let media = tempfile::tempdir().unwrap();
        let config = ServiceConfig {
            media_dir: media.path().to_path_buf(),
            ..ServiceConfig::default()
        };
        let services = Services::new(db, JwtValidator::new_dev(), codes.clone(), dispatcher, config);
        Harness {
            services,
            worker,
            mailer,
            codes,
            media,
        }
    }

    /// Insert a verified user with an active profile
    pub fn actor(services: &Services, username: &str) -> Actor {
        let user_id = crate::db::models::new_id();
        let profile_id = crate::db::models::new_id();
        services
            .db
            .transaction(|conn| {
                let email = format!("{}@ideagram.test", username);
                users::insert_user(conn, &user_id, &email, "unused", false)?;
                users::mark_email_verified(conn, &email)?;
                profiles::insert_profile(conn, &profile_id, &user_id, username)?;
                Ok(())
            })
            .unwrap();
        reload(services, &user_id)
    }

    /// Fresh copy of an actor's rows
    pub fn reload(services: &Services, user_id: &str) -> Actor {
        services
            .db
            .with_conn(|conn| {
                let user = users::get_user(conn, user_id)?.unwrap();
                let profile = profiles::get_profile_by_user(conn, user_id)?.unwrap();
                Ok(Actor { user, profile })
            })
            .unwrap()
    }
}

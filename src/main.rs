//! Ideagram - share ideas, follow people, fund what you believe in

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ideagram::{
    auth::JwtValidator,
    cache::{self, CodeStore},
    config::{Args, CatalogAction, Command, WordAction},
    db::{catalog, schema, Database},
    email::{EmailDispatcher, LogMailer},
    server::{self, AppState},
    services::{self, ModerationService, ServiceConfig, Services},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ideagram={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = Database::open(&args.database_path)
        .with_context(|| format!("opening database {:?}", args.database_path))?;

    match args.command.clone().unwrap_or(Command::Serve) {
        Command::Serve => serve(args, db).await,
        Command::Migrate => {
            let version = db.with_conn(schema::get_schema_version)?;
            info!("Database schema at version {}", version);
            Ok(())
        }
        Command::ForbiddenWords { action } => forbidden_words(db, action),
        Command::BanProfile { username, lift } => {
            ModerationService::new(db).set_profile_banned(&username, !lift)?;
            Ok(())
        }
        Command::BanIdea { id, lift } => {
            ModerationService::new(db).set_idea_banned(&id, !lift)?;
            Ok(())
        }
        Command::Classifications { action } => match action {
            CatalogAction::Add { name } => {
                let row = db.transaction(|conn| catalog::create_classification(conn, name.trim()))?;
                println!("{}\t{}", row.id, row.title);
                Ok(())
            }
            CatalogAction::List => {
                for row in db.with_conn(catalog::list_classifications)? {
                    println!("{}\t{}", row.id, row.title);
                }
                Ok(())
            }
        },
        Command::Organizations { action } => match action {
            CatalogAction::Add { name } => {
                let row = db.transaction(|conn| catalog::create_organization(conn, name.trim()))?;
                println!("{}\t{}", row.id, row.name);
                Ok(())
            }
            CatalogAction::List => {
                for row in db.with_conn(catalog::list_organizations)? {
                    println!("{}\t{}", row.id, row.name);
                }
                Ok(())
            }
        },
    }
}

fn forbidden_words(db: Database, action: WordAction) -> anyhow::Result<()> {
    let moderation = ModerationService::new(db);
    match action {
        WordAction::Add { word } => moderation.add_word(&word)?,
        WordAction::Remove { word } => {
            if !moderation.remove_word(&word)? {
                println!("'{}' was not on the list", word);
            }
        }
        WordAction::List => {
            for word in moderation.list_words()? {
                println!("{}", word);
            }
        }
    }
    Ok(())
}

async fn serve(args: Args, db: Database) -> anyhow::Result<()> {
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Ideagram API");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Database: {:?}", args.database_path);
    info!("Media: {:?}", args.media_dir);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("Idea report threshold: {}", args.limits.idea_max_report_count);
    info!("======================================");

    let jwt = JwtValidator::new(
        args.jwt_secret()?,
        args.jwt_access_expiry_seconds,
        args.jwt_refresh_expiry_seconds,
    )?;

    let codes = Arc::new(CodeStore::new());
    cache::spawn_cleanup_task(Arc::clone(&codes), Duration::from_secs(60));

    let (emails, worker) = EmailDispatcher::channel(
        args.email.email_queue_size,
        db.clone(),
        Arc::new(LogMailer),
        args.email.email_sender.clone(),
    );
    worker.spawn();

    let services = Services::new(db, jwt, codes, emails, ServiceConfig::from_args(&args));
    services::spawn_logging_listener(Arc::clone(&services.events));

    let state = Arc::new(AppState::new(args, services));

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutting down...");
    };

    tokio::select! {
        result = server::run(state) => {
            if let Err(e) = result {
                error!("Server error: {:?}", e);
                std::process::exit(1);
            }
        }
        _ = shutdown => {}
    }

    Ok(())
}

//! Shared fixtures for the integration tests
//!
//! Builds the full application state over an in-memory database and drives
//! it through the router, without a socket.

#![allow(dead_code)]

use std::sync::Arc;

use clap::Parser;
use http_body_util::BodyExt;
use hyper::{Method, StatusCode};
use serde_json::{json, Value};

use ideagram::auth::JwtValidator;
use ideagram::cache::{self, CodeStore};
use ideagram::config::Args;
use ideagram::db::Database;
use ideagram::email::{EmailDispatcher, EmailWorker, MemoryMailer};
use ideagram::routes::{dispatch, ApiRequest};
use ideagram::server::AppState;
use ideagram::services::{ServiceConfig, Services};

pub const PASSWORD: &str = "S3cure!pass";

pub struct TestApp {
    pub state: AppState,
    pub worker: EmailWorker,
    pub mailer: Arc<MemoryMailer>,
    pub codes: Arc<CodeStore>,
    pub media: tempfile::TempDir,
}

/// Status and decoded body of a routed request
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

pub fn app() -> TestApp {
    let args = Args::try_parse_from(["ideagram", "--dev-mode"]).expect("args parse");
    let db = Database::open_in_memory().expect("in-memory database");
    let mailer = Arc::new(MemoryMailer::new());
    let (dispatcher, worker) =
        EmailDispatcher::channel(64, db.clone(), mailer.clone(), "noreply@ideagram.test");
    let codes = Arc::new(CodeStore::new());
    let media = tempfile::tempdir().expect("temp dir");
    let config = ServiceConfig {
        media_dir: media.path().to_path_buf(),
        ..ServiceConfig::from_args(&args)
    };
    let services = Services::new(db, JwtValidator::new_dev(), codes.clone(), dispatcher, config);

    TestApp {
        state: AppState::new(args, services),
        worker,
        mailer,
        codes,
        media,
    }
}

impl TestApp {
    pub fn call(&self, req: ApiRequest) -> Reply {
        let response = dispatch(&self.state, &req);
        let status = response.status();
        let bytes = tokio_test::block_on(response.into_body().collect())
            .expect("body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Reply { status, body }
    }

    pub fn get(&self, path: &str, token: &str) -> Reply {
        self.call(ApiRequest::new(Method::GET, path).with_bearer(token))
    }

    pub fn post(&self, path: &str, token: &str, body: Value) -> Reply {
        self.call(ApiRequest::new(Method::POST, path).with_bearer(token).with_json(&body))
    }

    pub fn put(&self, path: &str, token: &str, body: Value) -> Reply {
        self.call(ApiRequest::new(Method::PUT, path).with_bearer(token).with_json(&body))
    }

    pub fn delete(&self, path: &str, token: &str) -> Reply {
        self.call(ApiRequest::new(Method::DELETE, path).with_bearer(token))
    }

    /// Deliver every queued email
    pub fn flush_emails(&mut self) -> usize {
        tokio_test::block_on(self.worker.process_pending())
    }

    /// Register through the API, returns the access token
    pub fn register(&self, username: &str) -> String {
        let reply = self.call(ApiRequest::new(Method::POST, "/api/user/register/").with_json(&json!({
            "email": format!("{}@ideagram.test", username),
            "username": username,
            "password": PASSWORD,
        })));
        assert_eq!(reply.status, StatusCode::CREATED, "register {}: {}", username, reply.body);
        reply.body["token"]["access"]
            .as_str()
            .expect("access token")
            .to_string()
    }

    /// Follow the emailed verification link
    pub fn verify(&self, username: &str) {
        let email = format!("{}@ideagram.test", username);
        let token = self
            .codes
            .get(&cache::email_verification_key(&email))
            .expect("verification token issued");
        let reply = self.call(ApiRequest::new(
            Method::GET,
            format!("/profile/verification/{}", token),
        ));
        assert_eq!(reply.status, StatusCode::OK);
    }

    /// Registered, verified member; returns the access token
    pub fn member(&self, username: &str) -> String {
        let token = self.register(username);
        self.verify(username);
        token
    }

    /// Create an idea through the API, returns its id
    pub fn create_idea(&self, token: &str, title: &str) -> String {
        let reply = self.post("/api/idea/", token, idea_body(title));
        assert_eq!(reply.status, StatusCode::CREATED, "create idea: {}", reply.body);
        reply.body["id"].as_str().expect("idea id").to_string()
    }
}

pub fn idea_body(title: &str) -> Value {
    json!({
        "title": title,
        "goal": "Make the neighbourhood greener",
        "abstract": "Plant trees along every street",
        "description": "Volunteers plant and water saplings each spring.",
        "max_donation": 500,
    })
}

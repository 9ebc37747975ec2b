//! Ideagram - share ideas, follow people, fund what you believe in
//!
//! A JSON API where members publish ideas, follow each other, plan an idea's
//! evolution and finances, collect likes, comments and donations, and report
//! abuse.
//!
//! ## Layers
//!
//! - **Routes**: hyper handlers matching method and path segments
//! - **Services**: validation, ownership, counters and events
//! - **Repositories**: diesel queries over SQLite
//! - **Email**: background delivery queue
//! - **Cache**: one-time verification and reset codes

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod email;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;
pub mod validation;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{IdeagramError, Result};

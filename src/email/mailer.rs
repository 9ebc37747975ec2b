//! Mail transport
//!
//! The platform only needs a seam here: the default transport writes the
//! message to the log, tests capture messages in memory.

use async_trait::async_trait;
use std::sync::Mutex;
use tracing::info;

use crate::types::IdeagramError;

/// A rendered message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    /// HTML body
    pub content: String,
}

/// Delivers rendered emails
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &OutgoingEmail) -> Result<(), IdeagramError>;
}

/// Writes every message to the log instead of delivering it
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &OutgoingEmail) -> Result<(), IdeagramError> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "Email sent"
        );
        Ok(())
    }
}

/// Keeps delivered messages in memory
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages delivered so far
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, message: &OutgoingEmail) -> Result<(), IdeagramError> {
        self.sent
            .lock()
            .map_err(|e| IdeagramError::Internal(format!("Lock poisoned: {}", e)))?
            .push(message.clone());
        Ok(())
    }
}

//! One-time code store
//!
//! In-memory key/value store with TTL used for email verification tokens and
//! password reset codes. Entries may carry a limited number of guesses.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A stored value with expiry and remaining guesses
#[derive(Debug, Clone)]
pub struct CodeEntry {
    pub value: String,
    pub expires_at: Instant,
    /// `None` means unlimited lookups
    pub attempts_left: Option<u32>,
}

impl CodeEntry {
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Outcome of checking a guessed code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeCheck {
    /// Guess matched; the entry stays until the caller deletes it
    Valid,
    /// Guess was wrong, `remaining` tries left (0 means the entry is gone)
    Invalid { remaining: u32 },
    /// Nothing stored or already expired
    Missing,
}

/// Thread-safe TTL store for one-time codes
pub struct CodeStore {
    entries: DashMap<String, CodeEntry>,
}

impl CodeStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Store a value with a TTL
    pub fn set(&self, key: &str, value: &str, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            CodeEntry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
                attempts_left: None,
            },
        );
    }

    /// Store a value that can be guessed at most `attempts` times
    pub fn set_with_attempts(&self, key: &str, value: &str, ttl: Duration, attempts: u32) {
        self.entries.insert(
            key.to_string(),
            CodeEntry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
                attempts_left: Some(attempts),
            },
        );
    }

    /// Get a live value
    pub fn get(&self, key: &str) -> Option<String> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    pub fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Compare a guess with the stored code
    ///
    /// A wrong guess spends one attempt and the entry is dropped once none are
    /// left. A correct guess leaves the entry in place for the caller to
    /// `delete` once the guarded action has gone through.
    pub fn check_code(&self, key: &str, guess: &str) -> CodeCheck {
        let mut entry = match self.entries.get_mut(key) {
            Some(entry) => entry,
            None => return CodeCheck::Missing,
        };

        if entry.is_expired() {
            drop(entry);
            self.entries.remove(key);
            return CodeCheck::Missing;
        }

        if entry.value == guess {
            return CodeCheck::Valid;
        }

        let attempts_left = entry.attempts_left;
        let remaining = match attempts_left {
            Some(left) => {
                let left = left.saturating_sub(1);
                entry.attempts_left = Some(left);
                left
            }
            None => return CodeCheck::Invalid { remaining: u32::MAX },
        };
        drop(entry);

        if remaining == 0 {
            self.entries.remove(key);
            debug!(key = key, "Code discarded after too many attempts");
        }
        CodeCheck::Invalid { remaining }
    }

    /// Remove expired entries, returns how many were dropped
    pub fn cleanup(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(count = removed, "Cleaned up expired codes");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CodeStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodically purge expired codes
pub fn spawn_cleanup_task(store: Arc<CodeStore>, interval: Duration) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let removed = store.cleanup();
            debug!(removed = removed, entries = store.len(), "Code cleanup completed");
        }
    });

    info!("Code store cleanup task started");
}

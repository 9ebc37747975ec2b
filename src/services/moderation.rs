//! Moderation service - forbidden word list and the text gate

use diesel::SqliteConnection;
use tracing::info;

use crate::db::{catalog, ideas, profiles, Database};
use crate::types::IdeagramError;
use crate::validation::{find_forbidden_word, Validator};

pub struct ModerationService {
    db: Database,
}

impl ModerationService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn list_words(&self) -> Result<Vec<String>, IdeagramError> {
        self.db.with_conn(catalog::list_forbidden_words)
    }

    /// Add a word, stored lowercase
    pub fn add_word(&self, word: &str) -> Result<(), IdeagramError> {
        let word = word.trim();
        if word.is_empty() {
            return Err(IdeagramError::field("word", "This field may not be blank."));
        }
        self.db
            .transaction(|conn| catalog::add_forbidden_word(conn, word))?;
        info!(word = %word.to_lowercase(), "Forbidden word added");
        Ok(())
    }

    /// Remove a word, returns false if it was not listed
    pub fn remove_word(&self, word: &str) -> Result<bool, IdeagramError> {
        let removed = self
            .db
            .transaction(|conn| catalog::remove_forbidden_word(conn, word.trim()))?;
        Ok(removed > 0)
    }

    /// Ban or reinstate a profile; a banned profile can neither log in nor be seen
    pub fn set_profile_banned(&self, username: &str, banned: bool) -> Result<(), IdeagramError> {
        let profile_id = self.db.transaction(|conn| {
            let profile = profiles::get_profile_by_username(conn, username.trim())?
                .ok_or_else(|| IdeagramError::NotFound("Profile not found".into()))?;
            profiles::set_banned(conn, &profile.id, banned)?;
            Ok(profile.id)
        })?;
        info!(profile_id = %profile_id, banned, "Profile ban updated");
        Ok(())
    }

    /// Ban or reinstate an idea; banned ideas are hidden from everyone but the owner
    pub fn set_idea_banned(&self, idea_id: &str, banned: bool) -> Result<(), IdeagramError> {
        self.db.transaction(|conn| {
            let idea = ideas::get_idea(conn, idea_id.trim())?
                .ok_or_else(|| IdeagramError::NotFound("No idea found with this uuid!".into()))?;
            ideas::set_banned(conn, &idea.id, banned)
        })?;
        info!(idea_id = %idea_id, banned, "Idea ban updated");
        Ok(())
    }
}

/// Reject any field whose text contains a forbidden word
///
/// Runs on the caller's connection so the check and the write share a
/// transaction.
pub fn ensure_clean(conn: &mut SqliteConnection, fields: &[(&str, &str)]) -> Result<(), IdeagramError> {
    let words = catalog::list_forbidden_words(conn)?;
    if words.is_empty() {
        return Ok(());
    }

    let mut v = Validator::new();
    for (field, text) in fields {
        if let Some(word) = find_forbidden_word(text, &words) {
            v.add(field, format!("This field contains a forbidden word: {}", word));
        }
    }
    v.finish()
}

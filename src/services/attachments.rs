//! Attachment service - files uploaded to an idea
//!
//! Uploads arrive base64 encoded and are written below the media directory
//! as `ideas/<idea id>/<attachment id>_<file name>`. The row stores that
//! relative path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::db::ideas::IdeaCounter;
use crate::db::models::{current_timestamp, new_id, IdeaAttachment};
use crate::db::{engagement, ideas, Database};
use crate::types::IdeagramError;
use crate::validation::Validator;

use super::events::{DomainEvent, EventBus};
use super::ideas::{owned_idea, visible_idea};
use super::Actor;

const ATTACHMENT_NOT_FOUND: &str = "No attachment found with this uuid!";

#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentInput {
    #[serde(default)]
    pub file_name: String,
    /// Base64 encoded file body
    #[serde(default)]
    pub content: String,
}

pub struct AttachmentService {
    db: Database,
    events: Arc<EventBus>,
    media_dir: PathBuf,
    max_attachments: i64,
}

impl AttachmentService {
    pub fn new(db: Database, events: Arc<EventBus>, media_dir: PathBuf, max_attachments: i64) -> Self {
        Self {
            db,
            events,
            media_dir,
            max_attachments,
        }
    }

    pub fn list(&self, actor: &Actor, idea_id: &str) -> Result<Vec<IdeaAttachment>, IdeagramError> {
        self.db.with_conn(|conn| {
            let idea = visible_idea(conn, actor, idea_id)?;
            engagement::list_attachments(conn, &idea.id)
        })
    }

    /// Store a file on an owned idea, up to the configured maximum
    pub fn add(&self, actor: &Actor, idea_id: &str, input: AttachmentInput) -> Result<IdeaAttachment, IdeagramError> {
        let file_name = sanitize_file_name(&input.file_name);
        let mut v = Validator::new();
        v.check("file_name", file_name.is_some(), "Enter a valid file name.");
        v.required("content", &input.content);
        v.finish()?;
        let file_name = file_name.unwrap_or_default();
        let bytes = STANDARD.decode(input.content.trim())?;

        let attachment = self.db.transaction(|conn| {
            let idea = owned_idea(conn, actor, idea_id)?;
            if engagement::count_attachments(conn, &idea.id)? >= self.max_attachments {
                return Err(IdeagramError::Forbidden(
                    "Maximum number of attachment reached!".into(),
                ));
            }

            let id = new_id();
            let relative = format!("ideas/{}/{}_{}", idea.id, id, file_name);
            let attachment = IdeaAttachment {
                id,
                idea_id: idea.id.clone(),
                file: relative,
                created_at: current_timestamp(),
            };

            engagement::insert_attachment(conn, &attachment)?;
            ideas::adjust_counter(conn, &idea.id, IdeaCounter::AttachedFiles, 1)?;
            Ok(attachment)
        })?;

        // The row is committed first; a failed write takes it back out.
        let path = self.media_dir.join(&attachment.file);
        if let Err(e) = write_file(&path, &bytes) {
            if path.exists() {
                remove_file(&path);
            }
            if let Err(undo) = self.db.transaction(|conn| {
                engagement::delete_attachment(conn, &attachment.id)?;
                ideas::adjust_counter(conn, &attachment.idea_id, IdeaCounter::AttachedFiles, -1)
            }) {
                warn!(id = %attachment.id, error = %undo, "Failed to drop attachment row after write error");
            }
            return Err(e);
        }

        debug!(id = %attachment.id, file = %attachment.file, size = bytes.len(), "Attachment stored");
        self.events.emit(DomainEvent::AttachmentAdded {
            idea_id: attachment.idea_id.clone(),
            attachment_id: attachment.id.clone(),
        });
        Ok(attachment)
    }

    pub fn delete(&self, actor: &Actor, attachment_id: &str) -> Result<(), IdeagramError> {
        let file = self.db.transaction(|conn| {
            let not_found = || IdeagramError::NotFound(ATTACHMENT_NOT_FOUND.into());
            let attachment = engagement::get_attachment(conn, attachment_id)?.ok_or_else(not_found)?;
            let idea = owned_idea(conn, actor, &attachment.idea_id).map_err(|_| not_found())?;
            engagement::delete_attachment(conn, &attachment.id)?;
            ideas::adjust_counter(conn, &idea.id, IdeaCounter::AttachedFiles, -1)?;
            Ok(attachment.file)
        })?;

        remove_file(&self.media_dir.join(file));
        Ok(())
    }
}

/// Final path component of an uploaded name, if it is usable
fn sanitize_file_name(name: &str) -> Option<String> {
    let base = Path::new(name.trim()).file_name()?.to_str()?;
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') || cleaned.chars().count() > 200 {
        return None;
    }
    Some(cleaned)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), IdeagramError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

fn remove_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!(path = ?path, error = %e, "Failed to remove attachment file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ideas::IdeaInput;
    use crate::services::testing::{actor, harness};
    use crate::services::Services;

    fn idea(services: &Services, owner: &Actor) -> String {
        services
            .ideas
            .create(
                owner,
                IdeaInput {
                    classification: vec![],
                    title: "Rain barrels".into(),
                    goal: "Collect rain".into(),
                    abstract_text: "Barrels on roofs".into(),
                    description: "Details".into(),
                    image: None,
                    max_donation: 0,
                    show_likes: true,
                    show_views: true,
                    show_comments: true,
                },
            )
            .unwrap()
            .id
    }

    fn upload(name: &str) -> AttachmentInput {
        AttachmentInput {
            file_name: name.into(),
            content: STANDARD.encode(b"plan contents"),
        }
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_file_name("my plan.pdf").as_deref(), Some("my_plan.pdf"));
        assert_eq!(sanitize_file_name(".."), None);
        assert_eq!(sanitize_file_name(""), None);
    }

    #[test]
    fn test_add_writes_file_and_counts() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        let idea_id = idea(&h.services, &alice);

        let attachment = h
            .services
            .attachments
            .add(&alice, &idea_id, upload("plan.txt"))
            .unwrap();
        let path = h.media.path().join(&attachment.file);
        assert_eq!(std::fs::read(&path).unwrap(), b"plan contents");

        let stored = h
            .services
            .db
            .with_conn(|conn| ideas::get_idea(conn, &idea_id))
            .unwrap()
            .unwrap();
        assert_eq!(stored.attached_files_count, 1);

        h.services.attachments.delete(&alice, &attachment.id).unwrap();
        assert!(!path.exists());
        assert!(h.services.attachments.list(&alice, &idea_id).unwrap().is_empty());
    }

    #[test]
    fn test_failed_write_leaves_no_row() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        let idea_id = idea(&h.services, &alice);

        // a regular file where the media directory should be
        let blocked = h.media.path().join("not-a-dir");
        std::fs::write(&blocked, b"x").unwrap();
        let service = AttachmentService::new(
            h.services.db.clone(),
            Arc::clone(&h.services.events),
            blocked,
            5,
        );

        assert!(service.add(&alice, &idea_id, upload("plan.txt")).is_err());
        assert!(service.list(&alice, &idea_id).unwrap().is_empty());
        let stored = h
            .services
            .db
            .with_conn(|conn| ideas::get_idea(conn, &idea_id))
            .unwrap()
            .unwrap();
        assert_eq!(stored.attached_files_count, 0);
    }

    #[test]
    fn test_limit_reached() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        let idea_id = idea(&h.services, &alice);

        for i in 0..5 {
            h.services
                .attachments
                .add(&alice, &idea_id, upload(&format!("file{}.txt", i)))
                .unwrap();
        }
        let err = h
            .services
            .attachments
            .add(&alice, &idea_id, upload("extra.txt"))
            .unwrap_err();
        assert!(matches!(err, IdeagramError::Forbidden(ref m) if m == "Maximum number of attachment reached!"));
    }

    #[test]
    fn test_bad_base64_rejected() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        let idea_id = idea(&h.services, &alice);

        let err = h
            .services
            .attachments
            .add(
                &alice,
                &idea_id,
                AttachmentInput {
                    file_name: "a.txt".into(),
                    content: "***".into(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, IdeagramError::Validation(_)));
    }
}

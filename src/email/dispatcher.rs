//! Background email queue
//!
//! Producers push jobs onto a bounded mpsc channel with `try_send`, so a
//! full or closed queue never blocks a request. A single worker drains the
//! queue: it records the email, hands it to the mailer, then flags the
//! record as sent. Database writes run on the blocking pool.

use std::sync::Arc;

use diesel::SqliteConnection;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::mailer::{Mailer, OutgoingEmail};
use super::EmailKind;
use crate::db::{emails, Database};
use crate::types::IdeagramError;

/// Email queued for delivery
#[derive(Debug, Clone)]
pub struct EmailJob {
    pub user_id: String,
    pub to: String,
    pub kind: EmailKind,
    pub subject: String,
    pub content: String,
}

/// Producer side of the queue
#[derive(Clone)]
pub struct EmailDispatcher {
    tx: mpsc::Sender<EmailJob>,
}

/// Consumer side of the queue
pub struct EmailWorker {
    rx: mpsc::Receiver<EmailJob>,
    db: Database,
    mailer: Arc<dyn Mailer>,
    from: String,
}

impl EmailDispatcher {
    /// Create a queue with the given capacity
    pub fn channel(
        capacity: usize,
        db: Database,
        mailer: Arc<dyn Mailer>,
        from: impl Into<String>,
    ) -> (Self, EmailWorker) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self { tx },
            EmailWorker {
                rx,
                db,
                mailer,
                from: from.into(),
            },
        )
    }

    /// Queue a job without waiting; returns false if it was dropped
    pub fn enqueue(&self, job: EmailJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(job)) => {
                warn!(to = %job.to, kind = job.kind.as_str(), "Email queue full, dropping email");
                false
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                warn!(to = %job.to, kind = job.kind.as_str(), "Email worker stopped, dropping email");
                false
            }
        }
    }
}

impl EmailWorker {
    /// Spawn the worker onto the current runtime
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Process jobs until every dispatcher is dropped
    pub async fn run(mut self) {
        info!("Email worker started");
        while let Some(job) = self.rx.recv().await {
            self.process(job).await;
        }
        debug!("Email queue closed, stopping worker");
    }

    /// Process everything already queued, returns how many jobs ran
    pub async fn process_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(job) = self.rx.try_recv() {
            self.process(job).await;
            count += 1;
        }
        count
    }

    async fn process(&self, job: EmailJob) {
        if let Err(e) = self.deliver(&job).await {
            error!(to = %job.to, kind = job.kind.as_str(), error = %e, "Email delivery failed");
        }
    }

    async fn deliver(&self, job: &EmailJob) -> Result<(), IdeagramError> {
        let record = {
            let job = job.clone();
            run_blocking(&self.db, move |conn| {
                emails::record_email(conn, &job.user_id, job.kind.as_str(), &job.subject, &job.content)
            })
            .await?
        };

        let message = OutgoingEmail {
            from: self.from.clone(),
            to: job.to.clone(),
            subject: job.subject.clone(),
            content: job.content.clone(),
        };
        self.mailer.send(&message).await?;

        run_blocking(&self.db, move |conn| emails::mark_sent(conn, &record.id)).await?;
        debug!(to = %job.to, kind = job.kind.as_str(), "Email delivered");
        Ok(())
    }
}

async fn run_blocking<T, F>(db: &Database, f: F) -> Result<T, IdeagramError>
where
    F: FnOnce(&mut SqliteConnection) -> Result<T, IdeagramError> + Send + 'static,
    T: Send + 'static,
{
    let db = db.clone();
    tokio::task::spawn_blocking(move || db.with_conn(f))
        .await
        .map_err(|e| IdeagramError::Internal(format!("Email record task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::new_id;
    use crate::db::users;
    use crate::email::MemoryMailer;

    #[tokio::test]
    async fn test_job_is_recorded_and_sent() {
        let db = Database::open_in_memory().unwrap();
        let user_id = new_id();
        db.with_conn(|conn| users::insert_user(conn, &user_id, "a@b.com", "hash", false))
            .unwrap();

        let mailer = Arc::new(MemoryMailer::new());
        let (dispatcher, mut worker) =
            EmailDispatcher::channel(4, db.clone(), mailer.clone(), "noreply@test");

        assert!(dispatcher.enqueue(EmailJob {
            user_id: user_id.clone(),
            to: "a@b.com".into(),
            kind: EmailKind::Notification,
            subject: "Hello".into(),
            content: "<p>hi</p>".into(),
        }));
        assert_eq!(worker.process_pending().await, 1);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "noreply@test");

        let records = db.with_conn(|conn| emails::list_for_user(conn, &user_id)).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].1);
        assert_eq!(records[0].0.email_type, "notification");
    }

    #[tokio::test]
    async fn test_spawned_worker_drains_queue() {
        let db = Database::open_in_memory().unwrap();
        let user_id = new_id();
        db.with_conn(|conn| users::insert_user(conn, &user_id, "c@d.com", "hash", false))
            .unwrap();

        let mailer = Arc::new(MemoryMailer::new());
        let (dispatcher, worker) =
            EmailDispatcher::channel(4, db.clone(), mailer.clone(), "noreply@test");
        let handle = worker.spawn();

        for subject in ["one", "two"] {
            assert!(dispatcher.enqueue(EmailJob {
                user_id: user_id.clone(),
                to: "c@d.com".into(),
                kind: EmailKind::Notification,
                subject: subject.into(),
                content: "c".into(),
            }));
        }
        drop(dispatcher);
        handle.await.unwrap();

        assert_eq!(mailer.sent().len(), 2);
        let records = db.with_conn(|conn| emails::list_for_user(conn, &user_id)).unwrap();
        assert!(records.iter().all(|(_, sent)| *sent));
    }

    #[test]
    fn test_full_queue_drops() {
        let db = Database::open_in_memory().unwrap();
        let (dispatcher, _worker) =
            EmailDispatcher::channel(1, db, Arc::new(MemoryMailer::new()), "noreply@test");
        let job = EmailJob {
            user_id: "u".into(),
            to: "a@b.com".into(),
            kind: EmailKind::Notification,
            subject: "s".into(),
            content: "c".into(),
        };
        assert!(dispatcher.enqueue(job.clone()));
        assert!(!dispatcher.enqueue(job));
    }
}

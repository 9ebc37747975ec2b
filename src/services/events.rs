//! Event system for domain operations
//!
//! Services emit an event after each successful write. Listeners can use
//! them for audit logging or notifications.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, trace};

/// Domain events emitted by services
#[derive(Debug, Clone)]
pub enum DomainEvent {
    // Account events
    UserRegistered {
        user_id: String,
        email: String,
        username: String,
    },
    EmailVerified {
        email: String,
    },
    PasswordChanged {
        user_id: String,
    },

    // Profile events
    ProfileUpdated {
        profile_id: String,
    },
    Followed {
        follower_id: String,
        followee_id: String,
    },
    Unfollowed {
        follower_id: String,
        followee_id: String,
    },

    // Idea events
    IdeaCreated {
        id: String,
        profile_id: String,
        title: String,
    },
    IdeaUpdated {
        id: String,
    },
    IdeaDeleted {
        id: String,
    },
    IdeaDeactivated {
        id: String,
        unchecked_reports: i64,
    },
    StepsCreated {
        idea_id: String,
        kind: &'static str,
        count: usize,
    },
    IdeaLiked {
        idea_id: String,
        profile_id: String,
    },
    CommentAdded {
        idea_id: String,
        comment_id: String,
    },
    CollaborationRequested {
        idea_id: String,
        request_id: String,
    },
    AttachmentAdded {
        idea_id: String,
        attachment_id: String,
    },
    DonationReceived {
        idea_id: String,
        amount: i64,
    },

    // Moderation events
    ProfileReported {
        profile_id: String,
        reason: String,
    },
    IdeaReported {
        idea_id: String,
        reason: String,
    },
}

/// Trait for event listeners
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: &DomainEvent);
}

/// Event bus for broadcasting domain events
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a new event bus with default capacity
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all subscribers
    pub fn emit(&self, event: DomainEvent) {
        trace!(event = ?event, "Emitting domain event");
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Logging event listener for audit trails
pub struct LoggingEventListener;

impl EventListener for LoggingEventListener {
    fn on_event(&self, event: &DomainEvent) {
        match event {
            DomainEvent::UserRegistered { user_id, username, .. } => {
                info!(user_id = %user_id, username = %username, "User registered");
            }
            DomainEvent::IdeaCreated { id, title, .. } => {
                debug!(id = %id, title = %title, "Idea created");
            }
            DomainEvent::IdeaDeactivated {
                id,
                unchecked_reports,
            } => {
                info!(id = %id, reports = unchecked_reports, "Idea deactivated by reports");
            }
            DomainEvent::Followed {
                follower_id,
                followee_id,
            } => {
                debug!(follower = %follower_id, followee = %followee_id, "Profile followed");
            }
            DomainEvent::DonationReceived { idea_id, amount } => {
                info!(idea_id = %idea_id, amount = amount, "Donation received");
            }
            _ => {
                trace!(event = ?event, "Domain event");
            }
        }
    }
}

/// Spawn a background task that logs all events
pub fn spawn_logging_listener(event_bus: Arc<EventBus>) -> tokio::task::JoinHandle<()> {
    let mut receiver = event_bus.subscribe();
    let listener = LoggingEventListener;

    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => listener.on_event(&event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    debug!(skipped = n, "Event listener lagged, skipped events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event bus closed, stopping listener");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_event_bus_emit_receive() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();

        bus.emit(DomainEvent::IdeaCreated {
            id: "idea-1".into(),
            profile_id: "p-1".into(),
            title: "Solar kiosk".into(),
        });

        let event = timeout(Duration::from_millis(100), receiver.recv())
            .await
            .expect("timeout")
            .expect("receive error");

        match event {
            DomainEvent::IdeaCreated { id, title, .. } => {
                assert_eq!(id, "idea-1");
                assert_eq!(title, "Solar kiosk");
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn test_event_bus_no_subscribers() {
        let bus = EventBus::new();
        bus.emit(DomainEvent::IdeaDeleted { id: "x".into() });
        assert_eq!(bus.subscriber_count(), 0);
    }
}

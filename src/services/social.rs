//! Social service - follow and unfollow
//!
//! The join row and both denormalized counters change in one transaction.
//! Duplicate follows are caught by the `(profile_id, following_id)` unique
//! constraint rather than a read-then-insert check.

use std::sync::Arc;

use tracing::debug;

use crate::db::models::Following;
use crate::db::{followings, profiles, Database};
use crate::types::IdeagramError;

use super::events::{DomainEvent, EventBus};
use super::Actor;

pub struct SocialService {
    db: Database,
    events: Arc<EventBus>,
}

impl SocialService {
    pub fn new(db: Database, events: Arc<EventBus>) -> Self {
        Self { db, events }
    }

    /// Follow the profile named `username`
    pub fn follow(&self, actor: &Actor, username: &str) -> Result<Following, IdeagramError> {
        let following = self.db.transaction(|conn| {
            let target = profiles::get_profile_by_username(conn, username)?
                .ok_or_else(|| IdeagramError::NotFound("Profile not found".into()))?;
            if target.id == actor.profile.id {
                return Err(IdeagramError::field("username", "You can not follow yourself."));
            }

            let row = followings::insert_following(conn, &actor.profile.id, &target.id).map_err(
                |e| match e {
                    IdeagramError::Conflict(_) => {
                        IdeagramError::Conflict("You already follow this profile.".into())
                    }
                    other => other,
                },
            )?;
            followings::adjust_follow_counters(conn, &actor.profile.id, &target.id, 1)?;
            Ok(row)
        })?;

        debug!(follower = %following.profile_id, followee = %following.following_id, "Followed");
        self.events.emit(DomainEvent::Followed {
            follower_id: following.profile_id.clone(),
            followee_id: following.following_id.clone(),
        });
        Ok(following)
    }

    /// Stop following the profile named `username`
    pub fn unfollow(&self, actor: &Actor, username: &str) -> Result<(), IdeagramError> {
        let followee_id = self.db.transaction(|conn| {
            let target = profiles::get_profile_by_username(conn, username)?
                .ok_or_else(|| IdeagramError::NotFound("Profile not found".into()))?;

            let removed = followings::delete_following(conn, &actor.profile.id, &target.id)?;
            if removed == 0 {
                return Err(IdeagramError::NotFound("You do not follow this profile.".into()));
            }
            followings::adjust_follow_counters(conn, &actor.profile.id, &target.id, -1)?;
            Ok(target.id)
        })?;

        self.events.emit(DomainEvent::Unfollowed {
            follower_id: actor.profile.id.clone(),
            followee_id,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{actor, harness, reload};

    #[test]
    fn test_follow_updates_counters_once() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        let bob = actor(&h.services, "bob");

        h.services.social.follow(&alice, "bob").unwrap();

        let alice_after = reload(&h.services, &alice.user.id);
        let bob_after = reload(&h.services, &bob.user.id);
        assert_eq!(alice_after.profile.following_count, 1);
        assert_eq!(bob_after.profile.follower_count, 1);

        let rows = h
            .services
            .db
            .with_conn(|conn| followings::find_pair(conn, &alice.profile.id, &bob.profile.id))
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_duplicate_follow_conflicts_and_keeps_counters() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        let bob = actor(&h.services, "bob");

        h.services.social.follow(&alice, "bob").unwrap();
        let err = h.services.social.follow(&alice, "bob").unwrap_err();
        assert!(matches!(err, IdeagramError::Conflict(_)));

        assert_eq!(reload(&h.services, &alice.user.id).profile.following_count, 1);
        assert_eq!(reload(&h.services, &bob.user.id).profile.follower_count, 1);
    }

    #[test]
    fn test_follow_missing_or_self() {
        let h = harness();
        let alice = actor(&h.services, "alice");

        assert!(matches!(
            h.services.social.follow(&alice, "ghost"),
            Err(IdeagramError::NotFound(_))
        ));
        assert!(matches!(
            h.services.social.follow(&alice, "alice"),
            Err(IdeagramError::Validation(_))
        ));
        assert_eq!(reload(&h.services, &alice.user.id).profile.following_count, 0);
    }

    #[test]
    fn test_unfollow_decrements() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        let bob = actor(&h.services, "bob");

        h.services.social.follow(&alice, "bob").unwrap();
        h.services.social.unfollow(&alice, "bob").unwrap();

        assert_eq!(reload(&h.services, &alice.user.id).profile.following_count, 0);
        assert_eq!(reload(&h.services, &bob.user.id).profile.follower_count, 0);
        assert!(matches!(
            h.services.social.unfollow(&alice, "bob"),
            Err(IdeagramError::NotFound(_))
        ));
    }
}

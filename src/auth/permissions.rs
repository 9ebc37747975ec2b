//! Permission levels for API access
//!
//! A caller is granted one level from its account state; each route names
//! the level it requires.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::models::{Profile, User};

/// Permission levels, ordered from least to most trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum PermissionLevel {
    /// No credentials
    #[default]
    Public = 0,
    /// Valid access token for an existing user
    Authenticated = 1,
    /// Verified, active user whose profile is active and not banned
    ActiveProfile = 2,
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionLevel::Public => write!(f, "PUBLIC"),
            PermissionLevel::Authenticated => write!(f, "AUTHENTICATED"),
            PermissionLevel::ActiveProfile => write!(f, "ACTIVE_PROFILE"),
        }
    }
}

/// Level granted to an authenticated user with (maybe) a profile
pub fn granted_level(user: &User, profile: Option<&Profile>) -> PermissionLevel {
    match profile {
        Some(p) if user.is_user_active() && p.is_profile_active() => PermissionLevel::ActiveProfile,
        _ => PermissionLevel::Authenticated,
    }
}

/// Check if `granted` satisfies `required`
pub fn is_allowed(granted: PermissionLevel, required: PermissionLevel) -> bool {
    granted >= required
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(active: bool, verified: bool) -> User {
        User {
            id: "u1".into(),
            email: "a@b.com".into(),
            password_hash: String::new(),
            is_active: active,
            is_admin: false,
            is_email_verified: verified,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn profile(active: bool, banned: bool) -> Profile {
        Profile {
            id: "p1".into(),
            user_id: "u1".into(),
            username: "alice".into(),
            first_name: None,
            last_name: None,
            birth_date: None,
            gender: "other".into(),
            bio: None,
            address_id: None,
            profile_image: None,
            follower_count: 0,
            following_count: 0,
            idea_count: 0,
            is_public: true,
            is_active: active,
            is_banned: banned,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_active_profile_requires_verified_email() {
        let p = profile(true, false);
        assert_eq!(granted_level(&user(true, true), Some(&p)), PermissionLevel::ActiveProfile);
        assert_eq!(granted_level(&user(true, false), Some(&p)), PermissionLevel::Authenticated);
        assert_eq!(granted_level(&user(false, true), Some(&p)), PermissionLevel::Authenticated);
    }

    #[test]
    fn test_banned_profile_is_not_active() {
        let banned = profile(true, true);
        assert_eq!(granted_level(&user(true, true), Some(&banned)), PermissionLevel::Authenticated);
        assert_eq!(granted_level(&user(true, true), None), PermissionLevel::Authenticated);
    }

    #[test]
    fn test_ordering() {
        assert!(is_allowed(PermissionLevel::ActiveProfile, PermissionLevel::Authenticated));
        assert!(!is_allowed(PermissionLevel::Public, PermissionLevel::Authenticated));
        assert!(is_allowed(PermissionLevel::Public, PermissionLevel::Public));
    }
}

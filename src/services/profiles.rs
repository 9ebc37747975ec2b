//! Profile service - own profile, public profiles, links and lists

use std::sync::Arc;

use diesel::SqliteConnection;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::{hash_password, verify_password};
use crate::db::models::{
    current_timestamp, new_id, Address, AddressChangeset, Profile, ProfileChangeset, ProfileLink,
};
use crate::db::{followings, ideas as idea_repo, profiles, users, Database};
use crate::types::IdeagramError;
use crate::validation::{validate_password, validate_url, Validator, GENDER_TYPES, LINK_TYPES};

use super::events::{DomainEvent, EventBus};
use super::ideas::{build_idea_view, IdeaView};
use super::Actor;

/// Links needed, beyond names, address and birth date, for a complete profile
const COMPLETE_PROFILE_MIN_LINKS: i64 = 3;

/// Full profile as shown to its owner or a permitted viewer
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub gender: String,
    pub bio: Option<String>,
    pub address: Option<Address>,
    pub profile_image: Option<String>,
    pub follower_count: i32,
    pub following_count: i32,
    pub idea_count: i32,
    pub is_public: bool,
    pub is_profile_complete: bool,
    pub links: Vec<ProfileLink>,
    pub created_at: String,
}

/// Short profile entry for follower lists
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub id: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image: Option<String>,
}

impl From<Profile> for ProfileSummary {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            username: p.username,
            first_name: p.first_name,
            last_name: p.last_name,
            profile_image: p.profile_image,
        }
    }
}

/// Partial update of the caller's profile
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub is_public: Option<bool>,
    pub address: Option<AddressChangeset>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkInput {
    #[serde(rename = "type", default)]
    pub link_type: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub priority: i32,
}

/// Profile service
pub struct ProfileService {
    db: Database,
    events: Arc<EventBus>,
}

impl ProfileService {
    pub fn new(db: Database, events: Arc<EventBus>) -> Self {
        Self { db, events }
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// The caller's own profile, email included
    pub fn get_own(&self, actor: &Actor) -> Result<ProfileView, IdeagramError> {
        self.db.with_conn(|conn| {
            let profile = load_profile(conn, actor.profile_id())?;
            let mut view = build_view(conn, profile)?;
            view.email = Some(actor.user.email.clone());
            Ok(view)
        })
    }

    /// Another profile by username, forbidden unless visible or the caller's own
    pub fn get_by_username(&self, actor: &Actor, username: &str) -> Result<ProfileView, IdeagramError> {
        self.db.with_conn(|conn| {
            let profile = viewable_profile(conn, actor, username)?;
            build_view(conn, profile)
        })
    }

    pub fn followers(&self, actor: &Actor, username: &str) -> Result<Vec<ProfileSummary>, IdeagramError> {
        self.db.with_conn(|conn| {
            let profile = viewable_profile(conn, actor, username)?;
            let ids = followings::follower_ids(conn, &profile.id)?;
            summaries(conn, &ids)
        })
    }

    pub fn followings(&self, actor: &Actor, username: &str) -> Result<Vec<ProfileSummary>, IdeagramError> {
        self.db.with_conn(|conn| {
            let profile = viewable_profile(conn, actor, username)?;
            let ids = followings::following_ids(conn, &profile.id)?;
            summaries(conn, &ids)
        })
    }

    /// Ideas of a profile; other viewers only see active, non-banned ones
    pub fn ideas(&self, actor: &Actor, username: &str) -> Result<Vec<IdeaView>, IdeagramError> {
        self.db.with_conn(|conn| {
            let profile = viewable_profile(conn, actor, username)?;
            let is_owner = profile.id == actor.profile.id;
            idea_repo::list_ideas_by_profile(conn, &profile.id)?
                .into_iter()
                .filter(|idea| is_owner || (idea.is_active && !idea.is_banned))
                .map(|idea| build_idea_view(conn, idea, is_owner))
                .collect()
        })
    }

    // =========================================================================
    // Write Operations
    // =========================================================================

    /// Apply a partial update, including nested address and password change
    ///
    /// A wrong `old_password` fails before anything is written.
    pub fn update(&self, actor: &Actor, input: ProfileUpdate) -> Result<ProfileView, IdeagramError> {
        if let (Some(old), Some(_)) = (&input.old_password, &input.new_password) {
            if !verify_password(old, &actor.user.password_hash)? {
                return Err(IdeagramError::InvalidPassword);
            }
        }

        let mut v = Validator::new();
        if let Some(first_name) = &input.first_name {
            v.max_len("first_name", first_name, 128);
        }
        if let Some(last_name) = &input.last_name {
            v.max_len("last_name", last_name, 128);
        }
        if let Some(birth_date) = &input.birth_date {
            v.date("birth_date", birth_date);
        }
        if let Some(gender) = &input.gender {
            v.choice("gender", gender, GENDER_TYPES);
        }
        if let Some(bio) = &input.bio {
            v.max_len("bio", bio, 512);
        }
        if input.new_password.is_some() && input.old_password.is_none() {
            v.add("old_password", "This field is required.");
        }
        if input.old_password.is_some() && input.new_password.is_none() {
            v.add("new_password", "This field is required.");
        }
        if let Some(new_password) = &input.new_password {
            validate_password(&mut v, "new_password", new_password);
        }
        v.finish()?;

        let new_hash = input.new_password.as_deref().map(hash_password).transpose()?;

        let view = self.db.transaction(|conn| {
            let profile = load_profile(conn, actor.profile_id())?;
            let mut changes = ProfileChangeset {
                first_name: input.first_name.clone(),
                last_name: input.last_name.clone(),
                birth_date: input.birth_date.clone(),
                gender: input.gender.clone(),
                bio: input.bio.clone(),
                profile_image: input.profile_image.clone(),
                is_public: input.is_public,
                updated_at: current_timestamp(),
                ..Default::default()
            };

            if let Some(address) = input.address.as_ref().filter(|a| !a.is_empty()) {
                match &profile.address_id {
                    Some(address_id) => profiles::update_address(conn, address_id, address)?,
                    None => {
                        let row = Address {
                            id: new_id(),
                            country: address.country.clone(),
                            state: address.state.clone(),
                            city: address.city.clone(),
                            address: address.address.clone(),
                            zip_code: address.zip_code.clone(),
                        };
                        profiles::insert_address(conn, &row)?;
                        changes.address_id = Some(row.id);
                    }
                }
            }

            let profile = profiles::update_profile(conn, &profile.id, &changes)?;
            if let Some(hash) = &new_hash {
                users::set_password_hash(conn, &actor.user.id, hash)?;
            }

            let mut view = build_view(conn, profile)?;
            view.email = Some(actor.user.email.clone());
            Ok(view)
        })?;

        if new_hash.is_some() {
            self.events.emit(DomainEvent::PasswordChanged {
                user_id: actor.user.id.clone(),
            });
        }
        self.events.emit(DomainEvent::ProfileUpdated {
            profile_id: view.id.clone(),
        });
        Ok(view)
    }

    // =========================================================================
    // Links
    // =========================================================================

    pub fn links(&self, actor: &Actor) -> Result<Vec<ProfileLink>, IdeagramError> {
        self.db
            .with_conn(|conn| profiles::list_links(conn, actor.profile_id()))
    }

    pub fn add_link(&self, actor: &Actor, input: LinkInput) -> Result<ProfileLink, IdeagramError> {
        let mut v = Validator::new();
        v.choice("type", &input.link_type, LINK_TYPES);
        validate_url(&mut v, "link", &input.link);
        v.check("priority", input.priority >= 0, "Ensure this value is greater than or equal to 0.");
        v.finish()?;

        let link = ProfileLink {
            id: new_id(),
            profile_id: actor.profile.id.clone(),
            link_type: input.link_type,
            link: input.link,
            priority: input.priority,
        };

        self.db
            .transaction(|conn| profiles::insert_link(conn, &link))
            .map_err(|e| match e {
                IdeagramError::Conflict(_) => {
                    IdeagramError::field("type", "A link of this type already exists.")
                }
                other => other,
            })?;

        debug!(profile_id = %link.profile_id, link_type = %link.link_type, "Link added");
        Ok(link)
    }

    pub fn delete_link(&self, actor: &Actor, link_id: &str) -> Result<(), IdeagramError> {
        let removed = self
            .db
            .transaction(|conn| profiles::delete_link(conn, link_id, actor.profile_id()))?;
        if removed == 0 {
            return Err(IdeagramError::NotFound("No link found with this uuid!".into()));
        }
        Ok(())
    }
}

fn load_profile(conn: &mut SqliteConnection, id: &str) -> Result<Profile, IdeagramError> {
    profiles::get_profile(conn, id)?.ok_or_else(|| IdeagramError::NotFound("Profile not found".into()))
}

/// Look up a profile by username, enforcing visibility for other viewers
fn viewable_profile(
    conn: &mut SqliteConnection,
    actor: &Actor,
    username: &str,
) -> Result<Profile, IdeagramError> {
    let profile = profiles::get_profile_by_username(conn, username)?
        .ok_or_else(|| IdeagramError::NotFound("Profile not found".into()))?;
    if profile.id != actor.profile.id && !profile.is_visible() {
        return Err(IdeagramError::Forbidden("This profile is not visible".into()));
    }
    Ok(profile)
}

fn summaries(conn: &mut SqliteConnection, ids: &[String]) -> Result<Vec<ProfileSummary>, IdeagramError> {
    Ok(profiles::list_profiles_by_ids(conn, ids)?
        .into_iter()
        .map(ProfileSummary::from)
        .collect())
}

fn build_view(conn: &mut SqliteConnection, profile: Profile) -> Result<ProfileView, IdeagramError> {
    let address = match &profile.address_id {
        Some(id) => profiles::get_address(conn, id)?,
        None => None,
    };
    let links = profiles::list_links(conn, &profile.id)?;
    let link_count = links.len() as i64;

    let is_profile_complete = profile.first_name.as_deref().is_some_and(|s| !s.is_empty())
        && profile.last_name.as_deref().is_some_and(|s| !s.is_empty())
        && profile.birth_date.is_some()
        && address
            .as_ref()
            .is_some_and(|a| a.state.is_some() && a.city.is_some())
        && link_count > COMPLETE_PROFILE_MIN_LINKS;

    Ok(ProfileView {
        id: profile.id,
        username: profile.username,
        email: None,
        first_name: profile.first_name,
        last_name: profile.last_name,
        birth_date: profile.birth_date,
        gender: profile.gender,
        bio: profile.bio,
        address,
        profile_image: profile.profile_image,
        follower_count: profile.follower_count,
        following_count: profile.following_count,
        idea_count: profile.idea_count,
        is_public: profile.is_public,
        is_profile_complete,
        links,
        created_at: profile.created_at,
    })
}

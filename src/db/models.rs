//! Diesel model definitions for database tables
//!
//! - Queryable structs: for SELECT queries (field order follows the table)
//! - Insertable structs: for INSERT queries
//! - AsChangeset structs: partial updates, `None` fields are left untouched

use std::fmt;

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::diesel_schema::*;

// ============================================================================
// Timestamp Helpers (SQLite stores timestamps as TEXT)
// ============================================================================

/// Get current UTC timestamp as ISO 8601 string for SQLite TEXT columns
pub fn current_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Get current UTC date as YYYY-MM-DD
pub fn current_date() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// Generate a new primary key
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub is_email_verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn is_staff(&self) -> bool {
        self.is_admin
    }

    /// Active and has confirmed their email address
    pub fn is_user_active(&self) -> bool {
        self.is_active && self.is_email_verified
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub is_active: bool,
    pub is_admin: bool,
    pub is_email_verified: bool,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

// ============================================================================
// Profiles
// ============================================================================

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize, Deserialize, PartialEq)]
#[diesel(table_name = addresses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Address {
    #[serde(skip)]
    pub id: String,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, Default, AsChangeset, Deserialize)]
#[diesel(table_name = addresses)]
pub struct AddressChangeset {
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub zip_code: Option<String>,
}

impl AddressChangeset {
    pub fn is_empty(&self) -> bool {
        self.country.is_none()
            && self.state.is_none()
            && self.city.is_none()
            && self.address.is_none()
            && self.zip_code.is_none()
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub gender: String,
    pub bio: Option<String>,
    pub address_id: Option<String>,
    pub profile_image: Option<String>,
    pub follower_count: i32,
    pub following_count: i32,
    pub idea_count: i32,
    pub is_public: bool,
    pub is_active: bool,
    pub is_banned: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Profile {
    /// Public, active and not banned
    pub fn is_visible(&self) -> bool {
        self.is_public && self.is_active && !self.is_banned
    }

    pub fn is_profile_active(&self) -> bool {
        self.is_active && !self.is_banned
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub username: &'a str,
    pub gender: &'a str,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = profiles)]
pub struct ProfileChangeset {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub bio: Option<String>,
    pub address_id: Option<String>,
    pub profile_image: Option<String>,
    pub is_public: Option<bool>,
    pub updated_at: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = profile_links)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProfileLink {
    pub id: String,
    pub profile_id: String,
    #[serde(rename = "type")]
    pub link_type: String,
    pub link: String,
    pub priority: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = followings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Following {
    pub id: String,
    pub profile_id: String,
    pub following_id: String,
    pub date: String,
}

// ============================================================================
// Ideas
// ============================================================================

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize, Deserialize, PartialEq)]
#[diesel(table_name = classifications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Classification {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = ideas)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Idea {
    pub id: String,
    pub profile_id: String,
    pub title: String,
    pub goal: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub description: String,
    pub image: Option<String>,
    pub attached_files_count: i32,
    pub views_count: i32,
    pub likes_count: i32,
    pub comments_count: i32,
    pub max_donation: i64,
    pub total_donation: i64,
    pub is_active: bool,
    pub is_banned: bool,
    pub show_likes: bool,
    pub show_views: bool,
    pub show_comments: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ideas)]
pub struct NewIdea<'a> {
    pub id: &'a str,
    pub profile_id: &'a str,
    pub title: &'a str,
    pub goal: &'a str,
    pub abstract_text: &'a str,
    pub description: &'a str,
    pub image: Option<&'a str>,
    pub max_donation: i64,
    pub show_likes: bool,
    pub show_views: bool,
    pub show_comments: bool,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = ideas)]
pub struct IdeaChangeset {
    pub title: Option<String>,
    pub goal: Option<String>,
    pub abstract_text: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub max_donation: Option<i64>,
    pub show_likes: Option<bool>,
    pub show_views: Option<bool>,
    pub show_comments: Option<bool>,
    pub updated_at: String,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = idea_classifications)]
pub struct IdeaClassification {
    pub idea_id: String,
    pub classification_id: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = evolution_steps)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EvolutionStep {
    pub id: String,
    #[serde(rename = "idea")]
    pub idea_id: String,
    pub title: String,
    pub finish_date: Option<String>,
    pub description: String,
    pub priority: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = evolution_steps)]
pub struct EvolutionStepChangeset {
    pub title: Option<String>,
    pub finish_date: Option<String>,
    pub description: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = financial_steps)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FinancialStep {
    pub id: String,
    #[serde(rename = "idea")]
    pub idea_id: String,
    pub title: String,
    pub cost: i64,
    pub unit: String,
    pub description: String,
    pub priority: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = financial_steps)]
pub struct FinancialStepChangeset {
    pub title: Option<String>,
    pub cost: Option<i64>,
    pub unit: Option<String>,
    pub description: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = idea_likes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct IdeaLike {
    pub id: String,
    pub idea_id: String,
    pub profile_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = idea_comments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct IdeaComment {
    pub id: String,
    #[serde(rename = "idea")]
    pub idea_id: String,
    #[serde(rename = "profile")]
    pub profile_id: String,
    pub comment: String,
    pub date: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = collaboration_requests)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CollaborationRequest {
    pub id: String,
    #[serde(rename = "idea")]
    pub idea_id: String,
    pub title: String,
    pub status: String,
    pub skills: String,
    pub age: Option<i32>,
    pub education: Option<String>,
    pub description: Option<String>,
    pub salary: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = collaboration_requests)]
pub struct CollaborationRequestChangeset {
    pub title: Option<String>,
    pub status: Option<String>,
    pub skills: Option<String>,
    pub age: Option<i32>,
    pub education: Option<String>,
    pub description: Option<String>,
    pub salary: Option<i64>,
    pub updated_at: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = idea_attachments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct IdeaAttachment {
    pub id: String,
    #[serde(skip)]
    pub idea_id: String,
    pub file: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize, Deserialize, PartialEq)]
#[diesel(table_name = organizations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Organization {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = official_informations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OfficialInformation {
    pub id: String,
    #[serde(rename = "idea")]
    pub idea_id: String,
    #[serde(rename = "organization")]
    pub organization_id: Option<String>,
    pub registration_number: Option<String>,
    pub registered_at: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = official_informations)]
pub struct OfficialInformationChangeset {
    pub organization_id: Option<String>,
    pub registration_number: Option<String>,
    pub registered_at: Option<String>,
    pub description: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = donations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Donation {
    pub id: String,
    #[serde(rename = "idea")]
    pub idea_id: String,
    #[serde(rename = "profile")]
    pub profile_id: String,
    pub amount: i64,
    pub message: Option<String>,
    pub date: String,
}

// ============================================================================
// Moderation
// ============================================================================

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = forbidden_words)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ForbiddenWord {
    pub id: String,
    pub word: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = profile_reports)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProfileReport {
    pub id: String,
    pub profile_id: String,
    pub reporter_id: String,
    pub report_reason: String,
    pub description: Option<String>,
    pub is_checked: bool,
    pub date: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = idea_reports)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct IdeaReport {
    pub id: String,
    pub idea_id: String,
    pub reporter_id: String,
    pub report_reason: String,
    pub description: Option<String>,
    pub is_checked: bool,
    pub date: String,
}

// ============================================================================
// Emails
// ============================================================================

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = emails)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Email {
    pub id: String,
    pub email_type: String,
    pub subject: String,
    pub content: String,
    pub date: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = sent_emails)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SentEmail {
    pub id: String,
    pub email_id: String,
    pub user_id: String,
    pub is_sent: bool,
}

//! Outgoing email records

use diesel::prelude::*;

use super::diesel_schema::{emails, sent_emails};
use super::models::{current_timestamp, new_id, Email, SentEmail};
use crate::types::IdeagramError;

/// Store an email and its recipient row in one go, returns the recipient row
pub fn record_email(
    conn: &mut SqliteConnection,
    user_id: &str,
    email_type: &str,
    subject: &str,
    content: &str,
) -> Result<SentEmail, IdeagramError> {
    let email = Email {
        id: new_id(),
        email_type: email_type.to_string(),
        subject: subject.to_string(),
        content: content.to_string(),
        date: current_timestamp(),
    };
    diesel::insert_into(emails::table)
        .values(&email)
        .execute(conn)?;

    let sent = SentEmail {
        id: new_id(),
        email_id: email.id,
        user_id: user_id.to_string(),
        is_sent: false,
    };
    diesel::insert_into(sent_emails::table)
        .values(&sent)
        .execute(conn)?;

    Ok(sent)
}

pub fn mark_sent(conn: &mut SqliteConnection, sent_email_id: &str) -> Result<(), IdeagramError> {
    diesel::update(sent_emails::table.find(sent_email_id))
        .set(sent_emails::is_sent.eq(true))
        .execute(conn)?;
    Ok(())
}

/// Emails addressed to a user with their delivery flag
pub fn list_for_user(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Vec<(Email, bool)>, IdeagramError> {
    let sent: Vec<SentEmail> = sent_emails::table
        .filter(sent_emails::user_id.eq(user_id))
        .load::<SentEmail>(conn)?;

    let mut out = Vec::with_capacity(sent.len());
    for row in sent {
        let email = emails::table.find(&row.email_id).first::<Email>(conn)?;
        out.push((email, row.is_sent));
    }
    out.sort_by(|a, b| a.0.date.cmp(&b.0.date));
    Ok(out)
}

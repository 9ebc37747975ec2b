//! Report service - abuse reports with automatic idea deactivation
//!
//! Once the unchecked reports on an idea exceed the configured threshold the
//! idea is switched inactive in the same transaction as the last report.
//! Nothing switches it back.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::db::models::{current_timestamp, new_id, IdeaReport, ProfileReport};
use crate::db::{ideas, profiles, reports, Database};
use crate::types::IdeagramError;
use crate::validation::{Validator, REPORT_REASONS};

use super::events::{DomainEvent, EventBus};
use super::Actor;

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileReportInput {
    #[serde(default)]
    pub profile_username: String,
    #[serde(default, alias = "report_reason")]
    pub report_reasons: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdeaReportInput {
    #[serde(default)]
    pub idea: String,
    #[serde(default, alias = "report_reason")]
    pub report_reasons: String,
    pub description: Option<String>,
}

pub struct ReportService {
    db: Database,
    events: Arc<EventBus>,
    max_report_count: i64,
}

impl ReportService {
    pub fn new(db: Database, events: Arc<EventBus>, max_report_count: i64) -> Self {
        Self {
            db,
            events,
            max_report_count,
        }
    }

    pub fn report_profile(&self, actor: &Actor, input: ProfileReportInput) -> Result<ProfileReport, IdeagramError> {
        let reason = validate_reason(&input.report_reasons, input.description.as_deref())?;

        let report = self.db.transaction(|conn| {
            let profile = profiles::get_profile_by_username(conn, input.profile_username.trim())?
                .ok_or_else(|| {
                    IdeagramError::field("profile_username", "profile_username doesn't exists")
                })?;
            let report = ProfileReport {
                id: new_id(),
                profile_id: profile.id,
                reporter_id: actor.profile.id.clone(),
                report_reason: reason,
                description: input.description,
                is_checked: false,
                date: current_timestamp(),
            };
            reports::insert_profile_report(conn, &report)?;
            Ok(report)
        })?;

        self.events.emit(DomainEvent::ProfileReported {
            profile_id: report.profile_id.clone(),
            reason: report.report_reason.clone(),
        });
        Ok(report)
    }

    /// File a report and deactivate the idea once reports exceed the limit
    pub fn report_idea(&self, actor: &Actor, input: IdeaReportInput) -> Result<IdeaReport, IdeagramError> {
        let reason = validate_reason(&input.report_reasons, input.description.as_deref())?;

        let (report, deactivated) = self.db.transaction(|conn| {
            let idea = ideas::get_idea(conn, input.idea.trim())?
                .ok_or_else(|| IdeagramError::field("idea", "idea doesn't exists"))?;
            let report = IdeaReport {
                id: new_id(),
                idea_id: idea.id.clone(),
                reporter_id: actor.profile.id.clone(),
                report_reason: reason,
                description: input.description,
                is_checked: false,
                date: current_timestamp(),
            };
            reports::insert_idea_report(conn, &report)?;

            let unchecked = reports::count_unchecked_idea_reports(conn, &idea.id)?;
            let deactivated = if idea.is_active && unchecked > self.max_report_count {
                ideas::set_active(conn, &idea.id, false)?;
                Some(unchecked)
            } else {
                None
            };
            Ok((report, deactivated))
        })?;

        self.events.emit(DomainEvent::IdeaReported {
            idea_id: report.idea_id.clone(),
            reason: report.report_reason.clone(),
        });
        if let Some(unchecked_reports) = deactivated {
            info!(idea_id = %report.idea_id, reports = unchecked_reports, "Idea deactivated");
            self.events.emit(DomainEvent::IdeaDeactivated {
                id: report.idea_id.clone(),
                unchecked_reports,
            });
        }
        Ok(report)
    }
}

/// Normalized reason, with description length checked alongside
fn validate_reason(reason: &str, description: Option<&str>) -> Result<String, IdeagramError> {
    let reason = reason.trim().to_lowercase();
    let mut v = Validator::new();
    v.choice("report_reasons", &reason, REPORT_REASONS);
    if let Some(description) = description {
        v.max_len("description", description, 1000);
    }
    v.finish()?;
    Ok(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ideas::IdeaInput;
    use crate::services::testing::{actor, harness};

    #[test]
    fn test_profile_report_requires_existing_username() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        actor(&h.services, "bob");

        let err = h
            .services
            .reports
            .report_profile(
                &alice,
                ProfileReportInput {
                    profile_username: "ghost".into(),
                    report_reasons: "spam".into(),
                    description: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, IdeagramError::Validation(ref f) if f.contains_key("profile_username")));

        let report = h
            .services
            .reports
            .report_profile(
                &alice,
                ProfileReportInput {
                    profile_username: "bob".into(),
                    report_reasons: "Spam".into(),
                    description: Some("ads everywhere".into()),
                },
            )
            .unwrap();
        assert_eq!(report.report_reason, "spam");
        assert!(!report.is_checked);
    }

    #[test]
    fn test_invalid_reason() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        let err = h
            .services
            .reports
            .report_idea(
                &alice,
                IdeaReportInput {
                    idea: "whatever".into(),
                    report_reasons: "boring".into(),
                    description: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, IdeagramError::Validation(ref f) if f.contains_key("report_reasons")));
    }

    #[test]
    fn test_reports_beyond_threshold_deactivate_idea() {
        let h = harness();
        let owner = actor(&h.services, "owner");
        let reporter = actor(&h.services, "reporter");
        let idea = h
            .services
            .ideas
            .create(
                &owner,
                IdeaInput {
                    classification: vec![],
                    title: "Night market".into(),
                    goal: "Open late".into(),
                    abstract_text: "Food stalls".into(),
                    description: "Details".into(),
                    image: None,
                    max_donation: 0,
                    show_likes: true,
                    show_views: true,
                    show_comments: true,
                },
            )
            .unwrap();

        let report = || {
            h.services.reports.report_idea(
                &reporter,
                IdeaReportInput {
                    idea: idea.id.clone(),
                    report_reasons: "spam".into(),
                    description: None,
                },
            )
        };
        let is_active = || {
            h.services
                .db
                .with_conn(|conn| ideas::get_idea(conn, &idea.id))
                .unwrap()
                .unwrap()
                .is_active
        };

        // Default threshold is 10: the eleventh report flips the flag
        for _ in 0..10 {
            report().unwrap();
        }
        assert!(is_active());
        report().unwrap();
        assert!(!is_active());

        assert!(matches!(
            h.services.ideas.get(&reporter, &idea.id),
            Err(IdeagramError::NotFound(_))
        ));
    }

    #[test]
    fn test_report_missing_idea() {
        let h = harness();
        let alice = actor(&h.services, "alice");
        let err = h
            .services
            .reports
            .report_idea(
                &alice,
                IdeaReportInput {
                    idea: "nope".into(),
                    report_reasons: "spam".into(),
                    description: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, IdeagramError::Validation(ref f) if f.contains_key("idea")));
    }
}

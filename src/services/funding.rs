//! Funding service - official registration details and donations

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::db::models::{
    current_timestamp, new_id, Donation, OfficialInformation, OfficialInformationChangeset,
};
use crate::db::{catalog, collaboration, engagement, ideas, Database};
use crate::types::IdeagramError;
use crate::validation::Validator;

use super::events::{DomainEvent, EventBus};
use super::ideas::{owned_idea, visible_idea};
use super::Actor;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfficialInput {
    pub organization: Option<String>,
    pub registration_number: Option<String>,
    pub registered_at: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DonationInput {
    #[serde(default)]
    pub amount: i64,
    pub message: Option<String>,
}

pub struct FundingService {
    db: Database,
    events: Arc<EventBus>,
}

impl FundingService {
    pub fn new(db: Database, events: Arc<EventBus>) -> Self {
        Self { db, events }
    }

    // =========================================================================
    // Official information
    // =========================================================================

    pub fn official(&self, actor: &Actor, idea_id: &str) -> Result<OfficialInformation, IdeagramError> {
        self.db.with_conn(|conn| {
            let idea = visible_idea(conn, actor, idea_id)?;
            collaboration::get_official(conn, &idea.id)?.ok_or_else(|| {
                IdeagramError::NotFound("No official information for this idea".into())
            })
        })
    }

    /// Create or update the single official record of an owned idea
    pub fn upsert_official(
        &self,
        actor: &Actor,
        idea_id: &str,
        input: OfficialInput,
    ) -> Result<OfficialInformation, IdeagramError> {
        let mut v = Validator::new();
        if let Some(registered_at) = &input.registered_at {
            v.date("registered_at", registered_at);
        }
        if let Some(number) = &input.registration_number {
            v.max_len("registration_number", number, 100);
        }
        v.finish()?;

        self.db.transaction(|conn| {
            let idea = owned_idea(conn, actor, idea_id)?;
            if let Some(organization) = &input.organization {
                if catalog::get_organization(conn, organization)?.is_none() {
                    return Err(IdeagramError::field(
                        "organization",
                        format!("Invalid pk \"{}\" - object does not exist.", organization),
                    ));
                }
            }

            let now = current_timestamp();
            match collaboration::get_official(conn, &idea.id)? {
                Some(_) => {
                    let changes = OfficialInformationChangeset {
                        organization_id: input.organization,
                        registration_number: input.registration_number,
                        registered_at: input.registered_at,
                        description: input.description,
                        updated_at: now,
                    };
                    collaboration::update_official(conn, &idea.id, &changes)
                }
                None => {
                    let info = OfficialInformation {
                        id: new_id(),
                        idea_id: idea.id.clone(),
                        organization_id: input.organization,
                        registration_number: input.registration_number,
                        registered_at: input.registered_at,
                        description: input.description,
                        created_at: now.clone(),
                        updated_at: now,
                    };
                    collaboration::insert_official(conn, &info)?;
                    Ok(info)
                }
            }
        })
    }

    // =========================================================================
    // Donations
    // =========================================================================

    pub fn donations(&self, actor: &Actor, idea_id: &str) -> Result<Vec<Donation>, IdeagramError> {
        self.db.with_conn(|conn| {
            let idea = visible_idea(conn, actor, idea_id)?;
            engagement::list_donations(conn, &idea.id)
        })
    }

    /// Record a donation and raise `total_donation`
    ///
    /// The idea must be active. A positive `max_donation` caps the total.
    pub fn donate(&self, actor: &Actor, idea_id: &str, input: DonationInput) -> Result<Donation, IdeagramError> {
        let mut v = Validator::new();
        v.check("amount", input.amount > 0, "Ensure this value is greater than 0.");
        if let Some(message) = &input.message {
            v.max_len("message", message, 500);
        }
        v.finish()?;

        let donation = self.db.transaction(|conn| {
            let idea = visible_idea(conn, actor, idea_id)?;
            if !idea.is_active {
                return Err(IdeagramError::Forbidden(
                    "This idea does not accept donations".into(),
                ));
            }
            let Some(total) = idea.total_donation.checked_add(input.amount) else {
                return Err(IdeagramError::field("amount", "Ensure this value is a valid amount."));
            };
            if idea.max_donation > 0 && total > idea.max_donation {
                return Err(IdeagramError::field(
                    "amount",
                    format!(
                        "Donation exceeds the requested amount, {} left",
                        idea.max_donation - idea.total_donation
                    ),
                ));
            }

            let donation = Donation {
                id: new_id(),
                idea_id: idea.id.clone(),
                profile_id: actor.profile.id.clone(),
                amount: input.amount,
                message: input.message,
                date: current_timestamp(),
            };
            engagement::insert_donation(conn, &donation)?;
            ideas::add_donation_total(conn, &idea.id, donation.amount)?;
            Ok(donation)
        })?;

        info!(idea_id = %donation.idea_id, amount = donation.amount, "Donation recorded");
        self.events.emit(DomainEvent::DonationReceived {
            idea_id: donation.idea_id.clone(),
            amount: donation.amount,
        });
        Ok(donation)
    }
}

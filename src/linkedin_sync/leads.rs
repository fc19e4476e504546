// src/linkedin_sync/leads.rs
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    aborts_fan_out, interrupted, text_or, LinkedInSync, SyncError, SyncOutcome, NOT_CONFIGURED,
};
use crate::linkedin_api::models::{RemoteAnswer, RemoteLeadForm, RemoteLeadResponse};
use crate::linkedin_api::LinkedInClient;
use crate::store::{Campaign, Lead, LeadContact, SyncStore};

const NO_STORED_CAMPAIGNS: &str =
    "No LinkedIn campaigns stored yet. Sync campaigns first, then sync leads.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContactField {
    FirstName,
    LastName,
    Email,
    Phone,
    Company,
    JobTitle,
}

/// Question identifiers LinkedIn uses for the standard contact questions.
const CONTACT_FIELDS: &[(&str, ContactField)] = &[
    ("firstName", ContactField::FirstName),
    ("lastName", ContactField::LastName),
    ("emailAddress", ContactField::Email),
    ("phoneNumber", ContactField::Phone),
    ("company", ContactField::Company),
    ("jobTitle", ContactField::JobTitle),
];

fn contact_field(question_id: &str) -> Option<ContactField> {
    CONTACT_FIELDS
        .iter()
        .find(|(id, _)| *id == question_id)
        .map(|(_, field)| *field)
}

/// Lift the known contact answers out of a lead's answer list. Unknown questions are ignored.
pub fn extract_contact(answers: &[RemoteAnswer]) -> LeadContact {
    let mut contact = LeadContact::default();

    for answer in answers {
        let Some(field) = answer.question_id.as_deref().and_then(contact_field) else {
            continue;
        };
        let value = answer.answer_text();
        let slot = match field {
            ContactField::FirstName => &mut contact.first_name,
            ContactField::LastName => &mut contact.last_name,
            ContactField::Email => &mut contact.email,
            ContactField::Phone => &mut contact.phone,
            ContactField::Company => &mut contact.company,
            ContactField::JobTitle => &mut contact.job_title,
        };
        *slot = value;
    }

    contact
}

/// Map a remote lead response to a local row. `None` when the remote id is missing.
pub fn lead_record(
    owner_id: &str,
    campaign: &Campaign,
    form: &RemoteLeadForm,
    remote: &RemoteLeadResponse,
    now: DateTime<Utc>,
) -> Option<Lead> {
    let remote_lead_id = remote.id.clone()?;

    let structured_responses =
        serde_json::to_string(&remote.responses).unwrap_or_else(|_| "[]".to_string());
    let submitted_at = remote
        .submitted_at
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or(now);

    Some(Lead {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        remote_lead_id,
        campaign_local_id: campaign.id.clone(),
        remote_campaign_id: campaign.remote_campaign_id.clone(),
        form_name: text_or(form.name.as_deref(), "Unnamed Form"),
        structured_responses,
        submitted_at,
        contact: extract_contact(&remote.responses),
        last_synced_at: now,
    })
}

#[derive(Debug, Default)]
struct LeadTally {
    stored: usize,
    fetched: usize,
    failed_fetches: usize,
}

impl<S: SyncStore> LinkedInSync<S> {
    pub async fn sync_leads(&self, owner_id: &str) -> Result<SyncOutcome, SyncError> {
        let Some(client) = self.client()? else {
            info!(pipeline = "leads", stage = "token", "LinkedIn not configured, skipping");
            return Ok(SyncOutcome::skipped(NOT_CONFIGURED));
        };

        let campaigns = self.store.campaigns(owner_id).await?;
        if campaigns.is_empty() {
            info!(pipeline = "leads", stage = "precondition", "no stored campaigns");
            return Ok(SyncOutcome::skipped(NO_STORED_CAMPAIGNS));
        }

        let mut tally = LeadTally::default();

        for campaign in &campaigns {
            let forms = match client.lead_forms(&campaign.remote_campaign_id).await {
                Ok(forms) => forms,
                Err(e) if aborts_fan_out(&e) => {
                    warn!(
                        pipeline = "leads",
                        stage = "forms",
                        remote_campaign_id = %campaign.remote_campaign_id,
                        error = %e,
                        stored = tally.stored,
                        "aborting lead sync"
                    );
                    return Err(interrupted(tally.stored, e));
                }
                Err(e) => {
                    tally.failed_fetches += 1;
                    warn!(
                        pipeline = "leads",
                        stage = "forms",
                        remote_campaign_id = %campaign.remote_campaign_id,
                        error = %e,
                        "failed to fetch lead forms for campaign"
                    );
                    continue;
                }
            };

            for form in &forms {
                self.sync_form(&client, owner_id, campaign, form, &mut tally)
                    .await?;
            }
        }

        info!(
            pipeline = "leads",
            stage = "complete",
            count = tally.stored,
            fetched = tally.fetched,
            campaigns = campaigns.len(),
            failed_fetches = tally.failed_fetches,
            "lead sync finished"
        );

        let mut message = format!(
            "Synced {} LinkedIn leads from {} campaigns",
            tally.stored,
            campaigns.len()
        );
        if tally.failed_fetches > 0 {
            message.push_str(&format!(
                " ({} campaigns or forms could not be fetched)",
                tally.failed_fetches
            ));
        }

        Ok(SyncOutcome::synced(tally.stored, message).with_total(tally.fetched))
    }

    /// Fetch and store one form's leads. Only fan-out aborting errors propagate.
    async fn sync_form(
        &self,
        client: &LinkedInClient,
        owner_id: &str,
        campaign: &Campaign,
        form: &RemoteLeadForm,
        tally: &mut LeadTally,
    ) -> Result<(), SyncError> {
        let Some(form_id) = form.id.as_deref() else {
            warn!(
                pipeline = "leads",
                stage = "map",
                remote_campaign_id = %campaign.remote_campaign_id,
                "lead form without id skipped"
            );
            return Ok(());
        };

        let responses = match client.lead_responses(form_id).await {
            Ok(responses) => responses,
            Err(e) if aborts_fan_out(&e) => {
                warn!(
                    pipeline = "leads",
                    stage = "responses",
                    remote_form_id = form_id,
                    error = %e,
                    stored = tally.stored,
                    "aborting lead sync"
                );
                return Err(interrupted(tally.stored, e));
            }
            Err(e) => {
                tally.failed_fetches += 1;
                warn!(
                    pipeline = "leads",
                    stage = "responses",
                    remote_form_id = form_id,
                    error = %e,
                    "failed to fetch lead responses for form"
                );
                return Ok(());
            }
        };

        tally.fetched += responses.len();
        let now = Utc::now();

        for remote in &responses {
            let Some(lead) = lead_record(owner_id, campaign, form, remote, now) else {
                warn!(
                    pipeline = "leads",
                    stage = "map",
                    remote_form_id = form_id,
                    "lead response without id skipped"
                );
                continue;
            };

            match self.store.upsert_lead(&lead).await {
                Ok(()) => tally.stored += 1,
                Err(e) => warn!(
                    pipeline = "leads",
                    stage = "upsert",
                    remote_lead_id = %lead.remote_lead_id,
                    error = %e,
                    "failed to store lead"
                ),
            }
        }

        Ok(())
    }
}

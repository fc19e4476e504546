// src/linkedin_sync/campaigns.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    aborts_fan_out, interrupted, text_or, LinkedInSync, SyncError, SyncOutcome, NOT_CONFIGURED,
};
use crate::linkedin_api::client::account_urn;
use crate::linkedin_api::models::{RemoteBudget, RemoteCampaign};
use crate::linkedin_api::LinkedInError;
use crate::store::{AdAccount, Campaign, SyncStore};

const DEFAULT_STATUS: &str = "DRAFT";
const DEFAULT_TYPE: &str = "SPONSORED_CONTENT";
const DEFAULT_OBJECTIVE: &str = "LEAD_GENERATION";
const DEFAULT_CURRENCY: &str = "USD";

const NO_STORED_ACCOUNTS: &str =
    "No LinkedIn ad accounts stored yet. Sync ad accounts first, then sync campaigns.";

/// Campaign fields sent by the frontend for `create-campaign`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignData {
    pub name: String,
    /// Remote ad account id, without the URN prefix.
    pub account_id: String,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub campaign_type: Option<String>,
    pub objective_type: Option<String>,
    pub daily_budget: Option<f64>,
    pub currency: Option<String>,
}

impl CampaignData {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("campaignData.name is required".to_string());
        }
        if self.account_id.trim().is_empty() {
            return Err("campaignData.accountId is required".to_string());
        }
        if matches!(self.daily_budget, Some(amount) if amount <= 0.0 || !amount.is_finite()) {
            return Err("campaignData.dailyBudget must be a positive amount".to_string());
        }
        Ok(())
    }

    /// Body for the LinkedIn campaign creation endpoint.
    pub fn to_remote_payload(&self) -> Value {
        let mut payload = json!({
            "name": self.name.trim(),
            "account": account_urn(self.account_id.trim()),
            "status": text_or(self.status.as_deref(), DEFAULT_STATUS),
            "type": text_or(self.campaign_type.as_deref(), DEFAULT_TYPE),
            "objectiveType": text_or(self.objective_type.as_deref(), DEFAULT_OBJECTIVE),
        });

        if let Some(amount) = self.daily_budget {
            payload["dailyBudget"] = json!({
                "amount": format!("{:.2}", amount),
                "currencyCode": text_or(self.currency.as_deref(), DEFAULT_CURRENCY),
            });
        }

        payload
    }

    /// Fill whatever the creation response left out from what was requested.
    fn complete(&self, mut remote: RemoteCampaign) -> RemoteCampaign {
        remote.name = remote.name.or_else(|| Some(self.name.trim().to_string()));
        remote.status = remote.status.or_else(|| self.status.clone());
        remote.campaign_type = remote.campaign_type.or_else(|| self.campaign_type.clone());
        remote.objective_type = remote.objective_type.or_else(|| self.objective_type.clone());
        remote.daily_budget = remote.daily_budget.or_else(|| {
            self.daily_budget.map(|amount| RemoteBudget {
                amount: Some(amount),
                currency_code: self.currency.clone(),
            })
        });
        remote
    }
}

/// Map a remote campaign to a local row. `None` when the remote id is missing.
pub fn campaign_record(
    owner_id: &str,
    remote: &RemoteCampaign,
    now: DateTime<Utc>,
) -> Option<Campaign> {
    let remote_campaign_id = remote.id.clone()?;

    let budget = remote.daily_budget.as_ref().or(remote.total_budget.as_ref());
    let created_at = remote
        .change_audit_stamps
        .as_ref()
        .and_then(|stamps| stamps.created.as_ref())
        .and_then(|created| created.time)
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or(now);

    Some(Campaign {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        remote_campaign_id,
        name: text_or(remote.name.as_deref(), "Unnamed Campaign"),
        status: text_or(remote.status.as_deref(), DEFAULT_STATUS),
        campaign_type: text_or(remote.campaign_type.as_deref(), DEFAULT_TYPE),
        objective_type: text_or(remote.objective_type.as_deref(), DEFAULT_OBJECTIVE),
        budget_amount: budget.and_then(|b| b.amount).unwrap_or(0.0),
        budget_currency: text_or(
            budget.and_then(|b| b.currency_code.as_deref()),
            DEFAULT_CURRENCY,
        ),
        created_at,
        last_synced_at: now,
    })
}

impl<S: SyncStore> LinkedInSync<S> {
    pub async fn sync_campaigns(&self, owner_id: &str) -> Result<SyncOutcome, SyncError> {
        let Some(client) = self.client()? else {
            info!(pipeline = "campaigns", stage = "token", "LinkedIn not configured, skipping");
            return Ok(SyncOutcome::skipped(NOT_CONFIGURED));
        };

        let accounts = self.store.ad_accounts(owner_id).await?;
        if accounts.is_empty() {
            info!(pipeline = "campaigns", stage = "precondition", "no stored ad accounts");
            return Ok(SyncOutcome::skipped(NO_STORED_ACCOUNTS));
        }

        let mut count = 0;
        let mut fetched = 0;
        let mut failed_accounts = 0;

        for account in &accounts {
            match client.campaigns(&account.remote_account_id).await {
                Ok(remote_campaigns) => {
                    fetched += remote_campaigns.len();
                    count += self.store_campaigns(owner_id, account, &remote_campaigns).await;
                }
                Err(e) if aborts_fan_out(&e) => {
                    warn!(
                        pipeline = "campaigns",
                        stage = "fetch",
                        remote_account_id = %account.remote_account_id,
                        error = %e,
                        stored = count,
                        "aborting campaign sync"
                    );
                    return Err(interrupted(count, e));
                }
                Err(e) => {
                    failed_accounts += 1;
                    warn!(
                        pipeline = "campaigns",
                        stage = "fetch",
                        remote_account_id = %account.remote_account_id,
                        error = %e,
                        "failed to fetch campaigns for ad account"
                    );
                }
            }
        }

        info!(
            pipeline = "campaigns",
            stage = "complete",
            count,
            fetched,
            accounts = accounts.len(),
            failed_accounts,
            "campaign sync finished"
        );

        let mut message = format!(
            "Synced {} LinkedIn campaigns from {} ad accounts",
            count,
            accounts.len()
        );
        if failed_accounts > 0 {
            message.push_str(&format!(
                " ({} ad accounts could not be fetched)",
                failed_accounts
            ));
        }

        Ok(SyncOutcome::synced(count, message).with_total(fetched))
    }

    async fn store_campaigns(
        &self,
        owner_id: &str,
        account: &AdAccount,
        remote_campaigns: &[RemoteCampaign],
    ) -> usize {
        let now = Utc::now();
        let mut stored = 0;

        for remote in remote_campaigns {
            let Some(campaign) = campaign_record(owner_id, remote, now) else {
                warn!(
                    pipeline = "campaigns",
                    stage = "map",
                    remote_account_id = %account.remote_account_id,
                    "campaign without id skipped"
                );
                continue;
            };

            match self.store.upsert_campaign(&campaign).await {
                Ok(_) => stored += 1,
                Err(e) => warn!(
                    pipeline = "campaigns",
                    stage = "upsert",
                    remote_campaign_id = %campaign.remote_campaign_id,
                    error = %e,
                    "failed to store campaign"
                ),
            }
        }

        stored
    }

    /// Create a campaign on LinkedIn, then store it locally.
    pub async fn create_campaign(
        &self,
        owner_id: &str,
        data: &CampaignData,
    ) -> Result<SyncOutcome, SyncError> {
        let Some(client) = self.client()? else {
            info!(pipeline = "create_campaign", stage = "token", "LinkedIn not configured, skipping");
            return Ok(SyncOutcome::skipped(NOT_CONFIGURED));
        };

        let created = client.create_campaign(&data.to_remote_payload()).await?;

        // Field parsing is lenient, so this only falls back when the body is not an object.
        let remote: RemoteCampaign = serde_json::from_value(created.clone()).unwrap_or_default();
        let remote = data.complete(remote);

        let campaign = campaign_record(owner_id, &remote, Utc::now()).ok_or_else(|| {
            LinkedInError::Malformed {
                body: format!("campaign creation response has no id: {}", created),
            }
        })?;

        self.store.upsert_campaign(&campaign).await?;

        info!(
            pipeline = "create_campaign",
            stage = "complete",
            remote_campaign_id = %campaign.remote_campaign_id,
            "campaign created"
        );

        Ok(SyncOutcome::synced(
            1,
            format!(
                "Created LinkedIn campaign {} ({})",
                campaign.name, campaign.remote_campaign_id
            ),
        ))
    }
}

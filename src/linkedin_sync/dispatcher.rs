// src/linkedin_sync/dispatcher.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{error, info, warn};

use super::{CampaignData, LinkedInSync, SyncOutcome};
use crate::store::SyncStore;

const AUTH_REQUIRED: &str = "Authentication required to sync LinkedIn data";

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_UNAUTHORIZED: u16 = 401;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    SyncAdAccounts,
    SyncCampaigns,
    SyncLeads,
    CreateCampaign,
}

impl SyncAction {
    pub const ALL: [SyncAction; 4] = [
        SyncAction::SyncAdAccounts,
        SyncAction::SyncCampaigns,
        SyncAction::SyncLeads,
        SyncAction::CreateCampaign,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncAction::SyncAdAccounts => "sync-ad-accounts",
            SyncAction::SyncCampaigns => "sync-campaigns",
            SyncAction::SyncLeads => "sync-leads",
            SyncAction::CreateCampaign => "create-campaign",
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SyncAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| format!("Invalid action: {}", s))
    }
}

/// Body of `POST /api/linkedin-sync`.
///
/// `campaignData` stays raw JSON until the action is known, so a malformed
/// payload is reported as a bad request rather than a body parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub action: String,
    #[serde(default)]
    pub campaign_data: Option<Value>,
}

impl SyncRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            campaign_data: None,
        }
    }

    fn campaign_data(&self) -> Result<CampaignData, String> {
        let raw = self
            .campaign_data
            .clone()
            .filter(|v| !v.is_null())
            .ok_or_else(|| "campaignData is required for create-campaign".to_string())?;
        let data: CampaignData = serde_json::from_value(raw)
            .map_err(|e| format!("Invalid campaignData: {}", e))?;
        data.validate()?;
        Ok(data)
    }
}

/// Outcome plus the HTTP status code it should be served with.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub status: u16,
    pub outcome: SyncOutcome,
}

impl Dispatched {
    fn ok(outcome: SyncOutcome) -> Self {
        Self {
            status: STATUS_OK,
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }

    fn rejected(status: u16, error: impl Into<String>, troubleshooting: impl Into<String>) -> Self {
        Self {
            status,
            outcome: SyncOutcome::failed(error, troubleshooting),
        }
    }
}

fn unauthenticated(action: Option<&str>) -> Dispatched {
    warn!(action = action.unwrap_or("unknown"), "sync request without an authenticated user");
    Dispatched::rejected(
        STATUS_UNAUTHORIZED,
        AUTH_REQUIRED,
        "Sign in again and retry. The request carried no valid session token",
    )
}

fn authenticated(owner_id: Option<&str>) -> Option<&str> {
    owner_id.filter(|id| !id.trim().is_empty())
}

/// Route a raw request body. The caller is checked before the body is parsed,
/// so an anonymous request is 401 whatever it carries.
pub async fn dispatch_body<S: SyncStore>(
    sync: &LinkedInSync<S>,
    owner_id: Option<&str>,
    body: &str,
) -> Dispatched {
    if authenticated(owner_id).is_none() {
        return unauthenticated(None);
    }

    match serde_json::from_str::<SyncRequest>(body) {
        Ok(request) => dispatch(sync, owner_id, &request).await,
        Err(e) => {
            warn!(error = %e, "unreadable sync request body");
            Dispatched::rejected(
                STATUS_BAD_REQUEST,
                format!("Invalid request body: {}", e),
                "Send { \"action\": \"...\", \"campaignData\": {...} } with a string action",
            )
        }
    }
}

/// Route one command for the authenticated owner.
///
/// A missing caller is 401 before the action is even looked at. Unknown
/// actions and unusable `campaignData` are 400, and a failed operation is 500
/// with its troubleshooting hint and the count of rows stored before it failed.
pub async fn dispatch<S: SyncStore>(
    sync: &LinkedInSync<S>,
    owner_id: Option<&str>,
    request: &SyncRequest,
) -> Dispatched {
    let Some(owner_id) = authenticated(owner_id) else {
        return unauthenticated(Some(request.action.as_str()));
    };

    let action = match request.action.parse::<SyncAction>() {
        Ok(action) => action,
        Err(message) => {
            warn!(action = %request.action, "unknown sync action");
            return Dispatched::rejected(
                STATUS_BAD_REQUEST,
                message,
                "Use one of sync-ad-accounts, sync-campaigns, sync-leads or create-campaign",
            );
        }
    };

    info!(action = %action, owner_id, "dispatching LinkedIn sync command");

    let result = match action {
        SyncAction::SyncAdAccounts => sync.sync_ad_accounts(owner_id).await,
        SyncAction::SyncCampaigns => sync.sync_campaigns(owner_id).await,
        SyncAction::SyncLeads => sync.sync_leads(owner_id).await,
        SyncAction::CreateCampaign => match request.campaign_data() {
            Ok(data) => sync.create_campaign(owner_id, &data).await,
            Err(message) => {
                warn!(action = %action, error = %message, "rejected campaignData");
                return Dispatched::rejected(
                    STATUS_BAD_REQUEST,
                    message,
                    "Send campaignData with at least name and accountId",
                );
            }
        },
    };

    match result {
        Ok(outcome) => Dispatched::ok(outcome),
        Err(e) => {
            error!(action = %action, error = %e, stored = e.stored_count(), "LinkedIn sync command failed");
            let mut dispatched =
                Dispatched::rejected(STATUS_INTERNAL_ERROR, e.to_string(), e.troubleshooting());
            dispatched.outcome.count = e.stored_count();
            dispatched
        }
    }
}

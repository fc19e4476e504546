// src/linkedin_sync/accounts.rs
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::{text_or, LinkedInSync, SyncError, SyncOutcome, NOT_CONFIGURED};
use crate::linkedin_api::models::RemoteAdAccount;
use crate::linkedin_api::{LinkedInError, TokenValidator};
use crate::store::{AdAccount, SyncStore};

const NO_ACCOUNTS_RETURNED: &str = "LinkedIn returned no ad accounts. Either this member has no ad accounts, \
the access token was issued without the r_ads scope, or the LinkedIn app has not been approved for \
Marketing Developer Platform access yet.";

const LIMITED_ACCESS: &str = "The LinkedIn access token only has basic access, and the ad account listing is \
unavailable. Ask for Marketing Developer Platform approval and the r_ads scope to sync ad accounts.";

/// Failures that say something about the token rather than the service.
fn is_credential_failure(error: &LinkedInError) -> bool {
    matches!(
        error,
        LinkedInError::Auth { .. } | LinkedInError::Permission { .. } | LinkedInError::RateLimited { .. }
    )
}

/// Map a remote ad account to a local row. `None` when the remote id is missing.
pub fn ad_account_record(
    owner_id: &str,
    remote: &RemoteAdAccount,
    now: DateTime<Utc>,
) -> Option<AdAccount> {
    let remote_account_id = remote.id.clone()?;

    Some(AdAccount {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        remote_account_id,
        display_name: text_or(remote.name.as_deref(), "Unknown Account"),
        account_type: text_or(remote.account_type.as_deref(), "BUSINESS"),
        status: text_or(remote.status.as_deref(), "ENABLED"),
        currency_code: text_or(remote.currency.as_deref(), "USD"),
        updated_at: now,
    })
}

impl<S: SyncStore> LinkedInSync<S> {
    pub async fn sync_ad_accounts(&self, owner_id: &str) -> Result<SyncOutcome, SyncError> {
        let Some(mut client) = self.client()? else {
            info!(pipeline = "ad_accounts", stage = "token", "LinkedIn not configured, skipping");
            return Ok(SyncOutcome::skipped(NOT_CONFIGURED));
        };

        let validation = TokenValidator::new(&client).validate().await;
        if !validation.valid {
            let message = validation
                .error
                .unwrap_or_else(|| "LinkedIn access token validation failed".to_string());
            warn!(pipeline = "ad_accounts", stage = "validation", error = %message, "token rejected");
            return Err(SyncError::TokenRejected(message));
        }
        client.mark_validated(validation.has_elevated_access);

        info!(
            pipeline = "ad_accounts",
            stage = "validation",
            elevated = client.credential().has_elevated_access,
            profile_id = validation.profile_id.as_deref().unwrap_or("unknown"),
            "token accepted"
        );

        let remote_accounts = match client.ad_accounts(self.config.ad_account_page_size).await {
            Ok(accounts) => accounts,
            Err(e) if !client.credential().has_elevated_access && !is_credential_failure(&e) => {
                warn!(
                    pipeline = "ad_accounts",
                    stage = "fetch",
                    error = %e,
                    "ad account listing unavailable with basic access"
                );
                return Ok(SyncOutcome::skipped(LIMITED_ACCESS).with_total(0));
            }
            Err(e) => return Err(e.into()),
        };
        let total = remote_accounts.len();

        if remote_accounts.is_empty() {
            info!(pipeline = "ad_accounts", stage = "fetch", "no ad accounts returned");
            return Ok(SyncOutcome::skipped(NO_ACCOUNTS_RETURNED).with_total(0));
        }

        let now = Utc::now();
        let mut count = 0;

        for remote in &remote_accounts {
            let Some(account) = ad_account_record(owner_id, remote, now) else {
                warn!(pipeline = "ad_accounts", stage = "map", "ad account without id skipped");
                continue;
            };

            match self.store.upsert_ad_account(&account).await {
                Ok(()) => count += 1,
                Err(e) => warn!(
                    pipeline = "ad_accounts",
                    stage = "upsert",
                    remote_account_id = %account.remote_account_id,
                    error = %e,
                    "failed to store ad account"
                ),
            }
        }

        info!(pipeline = "ad_accounts", stage = "complete", count, total, "ad account sync finished");

        Ok(SyncOutcome::synced(
            count,
            format!("Synced {} of {} LinkedIn ad accounts", count, total),
        )
        .with_total(total))
    }
}

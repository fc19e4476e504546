// src/linkedin_sync/mod.rs
//! LinkedIn data sync: ad accounts, campaigns and leads into the local store.
//!
//! Campaign sync reads the ad accounts stored by a previous ad-account sync,
//! and lead sync reads the stored campaigns. The pipelines fan out
//! sequentially, and a failing account, campaign or form is logged and skipped.
//! A 401 or 429 stops the fan-out, and the error carries the rows stored so far.

pub mod accounts;
pub mod campaigns;
pub mod dispatcher;
pub mod error;
pub mod leads;
pub mod outcome;

use std::sync::Arc;

pub use campaigns::CampaignData;
pub use dispatcher::{dispatch, dispatch_body, Dispatched, SyncAction, SyncRequest};
pub use error::SyncError;
pub use outcome::SyncOutcome;

use crate::config::LinkedInConfig;
use crate::linkedin_api::{LinkedInClient, LinkedInError, TokenProvider};
use crate::store::SyncStore;

pub(crate) const NOT_CONFIGURED: &str =
    "LinkedIn integration is not configured. Set LINKEDIN_ACCESS_TOKEN to enable syncing.";

pub struct LinkedInSync<S> {
    config: LinkedInConfig,
    tokens: Arc<dyn TokenProvider>,
    store: S,
}

impl<S: SyncStore> LinkedInSync<S> {
    pub fn new(config: LinkedInConfig, tokens: Arc<dyn TokenProvider>, store: S) -> Self {
        Self {
            config,
            tokens,
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// `None` when no credential is configured.
    fn client(&self) -> Result<Option<LinkedInClient>, SyncError> {
        match self.tokens.token() {
            Some(credential) => Ok(Some(LinkedInClient::new(&self.config, credential)?)),
            None => Ok(None),
        }
    }
}

/// Errors that will repeat for every sibling request, so fan-out stops instead of skipping.
pub(crate) fn aborts_fan_out(error: &LinkedInError) -> bool {
    matches!(
        error,
        LinkedInError::Auth { .. } | LinkedInError::RateLimited { .. }
    )
}

/// Error for a fan-out stopped by `cause`. Rows already written are reported with it.
pub(crate) fn interrupted(stored: usize, cause: LinkedInError) -> SyncError {
    if stored == 0 {
        SyncError::LinkedIn(cause)
    } else {
        SyncError::Interrupted { stored, cause }
    }
}

/// Remote text with blanks treated as missing.
pub(crate) fn text_or(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_or_treats_blank_as_missing() {
        assert_eq!(text_or(Some("  "), "Unnamed Campaign"), "Unnamed Campaign");
        assert_eq!(text_or(None, "USD"), "USD");
        assert_eq!(text_or(Some(" Acme "), "x"), "Acme");
    }
}

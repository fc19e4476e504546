// src/linkedin_sync/error.rs
use thiserror::Error;

use crate::linkedin_api::{LinkedInError, REQUIRED_SCOPES};

/// Operation-level failure. The dispatcher turns these into a 500 outcome.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{0}")]
    TokenRejected(String),

    #[error(transparent)]
    LinkedIn(#[from] LinkedInError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),

    /// Fan-out stopped after some rows were already stored.
    #[error("{cause} (sync stopped after storing {stored} records)")]
    Interrupted {
        stored: usize,
        #[source]
        cause: LinkedInError,
    },
}

impl SyncError {
    /// Rows written before the failure. Only an interrupted fan-out has any.
    pub fn stored_count(&self) -> usize {
        match self {
            SyncError::Interrupted { stored, .. } => *stored,
            _ => 0,
        }
    }

    /// Operator hint separating credential, permission and configuration causes.
    pub fn troubleshooting(&self) -> String {
        match self {
            SyncError::TokenRejected(_) => format!(
                "Re-issue the LinkedIn access token with the {} scopes and make sure the app has Marketing Developer Platform access",
                REQUIRED_SCOPES
            ),
            SyncError::LinkedIn(cause) | SyncError::Interrupted { cause, .. } => linkedin_hint(cause),
            SyncError::Storage(_) => {
                "Storing LinkedIn data failed. Check the database configuration and that migrations ran".to_string()
            }
        }
    }
}

fn linkedin_hint(error: &LinkedInError) -> String {
    match error {
        LinkedInError::Auth { .. } => format!(
            "The LinkedIn access token is invalid or expired. Generate a new token with the {} scopes and update LINKEDIN_ACCESS_TOKEN",
            REQUIRED_SCOPES
        ),
        LinkedInError::Permission { .. } => {
            "The LinkedIn app is not allowed to use this API. Request Marketing Developer Platform approval for the app in the LinkedIn developer portal".to_string()
        }
        LinkedInError::RateLimited { .. } => {
            "LinkedIn rate limit reached. Wait before running the sync again".to_string()
        }
        LinkedInError::Protocol { .. } | LinkedInError::Malformed { .. } => {
            "LinkedIn returned an unexpected response. Check the API base URL and the raw response in the error".to_string()
        }
        LinkedInError::Transport(_) => {
            "Could not reach the LinkedIn API. Check network connectivity and the configured API base URL".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn hints_differ_by_cause() {
        let auth = SyncError::from(LinkedInError::from_status(StatusCode::UNAUTHORIZED, String::new()));
        let perm = SyncError::from(LinkedInError::from_status(StatusCode::FORBIDDEN, String::new()));
        let storage = SyncError::from(anyhow::anyhow!("disk full"));

        assert!(auth.troubleshooting().contains("r_ads"));
        assert!(perm.troubleshooting().contains("approval"));
        assert!(storage.troubleshooting().contains("database"));
        assert_ne!(auth.troubleshooting(), perm.troubleshooting());
    }

    #[test]
    fn rejected_token_hint_names_scopes() {
        let err = SyncError::TokenRejected("bad".into());
        assert!(err.troubleshooting().contains("r_ads_reporting"));
        assert_eq!(err.to_string(), "bad");
    }

    #[test]
    fn interrupted_keeps_count_and_cause_hint() {
        let cause = LinkedInError::from_status(StatusCode::TOO_MANY_REQUESTS, "slow down".into());
        let hint = SyncError::from(LinkedInError::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()))
            .troubleshooting();
        let err = SyncError::Interrupted { stored: 3, cause };

        assert_eq!(err.stored_count(), 3);
        assert!(err.to_string().contains("after storing 3 records"));
        assert_eq!(err.troubleshooting(), hint);
        assert_eq!(SyncError::TokenRejected("x".into()).stored_count(), 0);
    }
}

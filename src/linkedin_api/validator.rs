// src/linkedin_api/validator.rs
//! Two-tier token check: basic identity first, then a one-row read of the
//! Marketing API. The two permissions are granted independently, so each
//! failure gets its own message.

use serde::Serialize;
use tracing::{info, warn};

use super::client::LinkedInClient;
use super::error::LinkedInError;

pub const REQUIRED_SCOPES: &str = "r_ads, r_ads_reporting";

const MARKETING_CHECK_PAGE_SIZE: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct TokenValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    pub has_elevated_access: bool,
}

impl TokenValidation {
    fn rejected(error: String, profile_id: Option<String>) -> Self {
        Self {
            valid: false,
            error: Some(error),
            profile_id,
            has_elevated_access: false,
        }
    }
}

pub struct TokenValidator<'a> {
    client: &'a LinkedInClient,
}

impl<'a> TokenValidator<'a> {
    pub fn new(client: &'a LinkedInClient) -> Self {
        Self { client }
    }

    pub async fn validate(&self) -> TokenValidation {
        let profile = match self.client.identity().await {
            Ok(profile) => profile,
            Err(e) => {
                let detail = match e.status() {
                    Some(status) => format!("identity check failed with HTTP {}", status.as_u16()),
                    None => "identity check failed".to_string(),
                };
                warn!(stage = "identity", error = %e, "LinkedIn token rejected");
                return TokenValidation::rejected(format!("Invalid LinkedIn access token: {}. {}", detail, e), None);
            }
        };

        let profile_id = profile.id;

        match self.client.ad_accounts(MARKETING_CHECK_PAGE_SIZE).await {
            Ok(_) => {
                info!(stage = "marketing_check", elevated = true, "LinkedIn token validated");
                TokenValidation {
                    valid: true,
                    error: None,
                    profile_id,
                    has_elevated_access: true,
                }
            }
            Err(LinkedInError::Auth { body }) => {
                warn!(stage = "marketing_check", status = 401, "token lacks Marketing API scopes");
                TokenValidation::rejected(
                    format!(
                        "LinkedIn access token is missing the required Marketing API scopes ({}). Response: {}",
                        REQUIRED_SCOPES, body
                    ),
                    profile_id,
                )
            }
            Err(LinkedInError::Permission { body }) => {
                warn!(stage = "marketing_check", status = 403, "app not approved for Marketing API");
                TokenValidation::rejected(
                    format!(
                        "LinkedIn app is not approved for Marketing Developer Platform access. Response: {}",
                        body
                    ),
                    profile_id,
                )
            }
            Err(e) => {
                warn!(
                    stage = "marketing_check",
                    error = %e,
                    "Marketing API check degraded; continuing with basic access"
                );
                TokenValidation {
                    valid: true,
                    error: None,
                    profile_id,
                    has_elevated_access: false,
                }
            }
        }
    }
}

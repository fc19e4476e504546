// src/linkedin_api/error.rs
use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced by the LinkedIn REST client. Nothing here is retried.
#[derive(Debug, Error)]
pub enum LinkedInError {
    #[error("LinkedIn access token is invalid or expired (HTTP 401): {body}")]
    Auth { body: String },

    #[error("LinkedIn app lacks permission for this resource (HTTP 403): {body}")]
    Permission { body: String },

    #[error("LinkedIn API rate limit reached (HTTP 429): {body}")]
    RateLimited { body: String },

    #[error("unexpected LinkedIn API response (HTTP {status}): {body}")]
    Protocol { status: StatusCode, body: String },

    #[error("malformed LinkedIn API response: {body}")]
    Malformed { body: String },

    #[error("LinkedIn API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl LinkedInError {
    /// Classify a non-2xx response.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Auth { body },
            StatusCode::FORBIDDEN => Self::Permission { body },
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited { body },
            _ => Self::Protocol { status, body },
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Auth { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Permission { .. } => Some(StatusCode::FORBIDDEN),
            Self::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            Self::Protocol { status, .. } => Some(*status),
            Self::Malformed { .. } => None,
            Self::Transport(e) => e.status(),
        }
    }
}

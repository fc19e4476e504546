// src/web/auth.rs
use anyhow::Result;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // owner id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

pub struct AuthConfig {
    pub jwt_secret: String,
    pub audience: Option<String>,
}

impl AuthConfig {
    pub fn new(jwt_secret: String, audience: Option<String>) -> Self {
        Self {
            jwt_secret,
            audience,
        }
    }
}

/// Caller identified by a verified session token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: Option<String>,
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenVerificationFailed,
    NotConfigured,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let auth_config = match req.guard::<&State<AuthConfig>>().await {
            Outcome::Success(config) => config,
            Outcome::Error((status, _)) => return Outcome::Error((status, AuthError::NotConfigured)),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let token = match req.headers().get_one("Authorization") {
            Some(header) => match header.strip_prefix("Bearer ") {
                Some(token) => token.trim(),
                None => {
                    warn!("Invalid Authorization header format");
                    return Outcome::Error((Status::Unauthorized, AuthError::InvalidToken));
                }
            },
            None => {
                debug!("Missing Authorization header");
                return Outcome::Error((Status::Unauthorized, AuthError::MissingToken));
            }
        };

        match verify_session_token(token, auth_config) {
            Ok(user) => Outcome::Success(user),
            Err(e) => {
                warn!(error = %e, "Token verification failed");
                Outcome::Error((Status::Unauthorized, AuthError::TokenVerificationFailed))
            }
        }
    }
}

/// Verify an HS256 session token and return its subject.
pub fn verify_session_token(token: &str, auth_config: &AuthConfig) -> Result<AuthenticatedUser> {
    let mut validation = Validation::new(Algorithm::HS256);
    match &auth_config.audience {
        Some(audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }

    let decoding_key = DecodingKey::from_secret(auth_config.jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &validation)?;

    if token_data.claims.sub.trim().is_empty() {
        anyhow::bail!("Session token has an empty subject");
    }

    Ok(AuthenticatedUser {
        user_id: token_data.claims.sub,
        email: token_data.claims.email,
    })
}

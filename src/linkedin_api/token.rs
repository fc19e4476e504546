// src/linkedin_api/token.rs
use std::fmt;

pub const ACCESS_TOKEN_ENV: &str = "LINKEDIN_ACCESS_TOKEN";

/// Bearer credential for the LinkedIn API, plus what validation learned about it.
#[derive(Clone)]
pub struct Credential {
    token: String,
    pub validated: bool,
    pub has_elevated_access: bool,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            validated: false,
            has_elevated_access: false,
        }
    }

    pub fn bearer(&self) -> &str {
        &self.token
    }
}

// Never print the token itself.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("validated", &self.validated)
            .field("has_elevated_access", &self.has_elevated_access)
            .finish()
    }
}

/// Source of the LinkedIn credential. `None` means the integration is not configured.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<Credential>;
}

/// Reads the token from the process environment.
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new() -> Self {
        Self::from_var(ACCESS_TOKEN_ENV)
    }

    pub fn from_var(var: &str) -> Self {
        Self {
            var: var.to_string(),
        }
    }
}

impl Default for EnvTokenProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenProvider for EnvTokenProvider {
    fn token(&self) -> Option<Credential> {
        std::env::var(&self.var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Credential::new)
    }
}

/// Fixed token, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider(Option<String>);

impl StaticTokenProvider {
    pub fn new(token: Option<&str>) -> Self {
        Self(token.map(str::to_string))
    }
}

impl TokenProvider for StaticTokenProvider {
    fn token(&self) -> Option<Credential> {
        self.0
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(Credential::new)
    }
}

// src/config.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CONFIG_FILE: &str = "config.yaml";
pub const JWT_SECRET_ENV: &str = "AUTH_JWT_SECRET";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub port: u16,
    pub database_path: PathBuf,
    pub linkedin: LinkedInConfig,
    pub auth: AuthSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            database_path: PathBuf::from("data/recruit_sync.db"),
            linkedin: LinkedInConfig::default(),
            auth: AuthSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinkedInConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Upper bound on ad accounts fetched per sync (single page).
    pub ad_account_page_size: u32,
}

impl Default for LinkedInConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.linkedin.com".to_string(),
            request_timeout_secs: 15,
            ad_account_page_size: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Expected `aud` claim of session tokens; `None` skips the audience check.
    pub audience: Option<String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            audience: Some("authenticated".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: AppConfig,
    #[serde(default)]
    production: AppConfig,
}

impl AppConfig {
    /// Load configuration for the current environment from `config.yaml`, then apply env overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let mut config = Self::load_for(config_path, &environment)?;
        config.apply_env_overrides()?;
        config.database_path = Self::resolve_path(&config.database_path)?;
        Ok(config)
    }

    /// File contents for one environment section, without env overrides.
    pub fn load_for(config_path: &Path, environment: &str) -> Result<Self> {
        if !config_path.exists() {
            info!(
                "{} not found, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        Self::from_yaml(&content, environment)
    }

    fn get_environment() -> String {
        std::env::var("RECRUIT_SYNC_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config.yaml")?;

        Ok(match environment {
            "production" => config_file.production,
            _ => config_file.local,
        })
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var("PORT") {
            self.port = port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid port number"))?;
        }
        if let Ok(path) = std::env::var("DATABASE_PATH") {
            self.database_path = PathBuf::from(path);
        }
        if let Ok(url) = std::env::var("LINKEDIN_API_URL") {
            self.linkedin.api_base_url = url;
        }
        Ok(())
    }

    fn resolve_path(path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            let current_dir = std::env::current_dir().context("Failed to get current directory")?;
            Ok(current_dir.join(path))
        }
    }
}

/// Session token secret. Required to serve HTTP.
pub fn jwt_secret() -> Result<String> {
    std::env::var(JWT_SECRET_ENV)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow::anyhow!("{} environment variable not set", JWT_SECRET_ENV))
}

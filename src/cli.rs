// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::linkedin_api::EnvTokenProvider;
use crate::linkedin_sync::{dispatch, Dispatched, LinkedInSync, SyncRequest};
use crate::store::{SqliteStore, SyncStore};
use crate::web::start_web_server;

#[derive(Parser)]
#[command(name = "recruit-sync")]
#[command(about = "Sync LinkedIn ad accounts, campaigns and leads for the recruitment backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Start the HTTP API server (default)
    Serve,
    /// Run one sync command for an owner and print the outcome as JSON
    Sync {
        /// sync-ad-accounts, sync-campaigns, sync-leads or create-campaign
        action: String,
        #[arg(long)]
        owner: String,
        /// JSON file holding campaignData for create-campaign
        #[arg(long)]
        campaign_file: Option<PathBuf>,
    },
    /// Create the database and run migrations
    InitDb,
}

/// Run a command. Returns the process exit code.
pub async fn handle_command(command: Command, config: AppConfig) -> Result<i32> {
    match command {
        Command::Serve => {
            start_web_server(config).await?;
            Ok(0)
        }
        Command::Sync {
            action,
            owner,
            campaign_file,
        } => {
            let store = SqliteStore::new(&config.database_path).await?;
            let sync = LinkedInSync::new(
                config.linkedin.clone(),
                Arc::new(EnvTokenProvider::new()),
                store,
            );

            let request = build_request(&action, campaign_file.as_deref())?;
            let dispatched = run_sync(&sync, &owner, &request).await;

            println!("{}", serde_json::to_string_pretty(&dispatched.outcome)?);
            Ok(if dispatched.is_success() { 0 } else { 1 })
        }
        Command::InitDb => {
            let store = SqliteStore::new(&config.database_path).await?;
            store.health_check().await?;
            info!("Database ready at {}", config.database_path.display());
            Ok(0)
        }
    }
}

fn build_request(action: &str, campaign_file: Option<&Path>) -> Result<SyncRequest> {
    let mut request = SyncRequest::new(action);

    if let Some(path) = campaign_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let data: Value = serde_json::from_str(&content)
            .with_context(|| format!("{} is not valid JSON", path.display()))?;
        request.campaign_data = Some(data);
    }

    Ok(request)
}

pub async fn run_sync<S: SyncStore>(
    sync: &LinkedInSync<S>,
    owner: &str,
    request: &SyncRequest,
) -> Dispatched {
    info!(action = %request.action, owner_id = owner, "running sync from the command line");
    dispatch(sync, Some(owner), request).await
}

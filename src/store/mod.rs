// src/store/mod.rs
//! Persistence gateway for synced LinkedIn data.

pub mod models;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

pub use models::{AdAccount, Campaign, Lead, LeadContact};
pub use sqlite::SqliteStore;

/// Upsert-capable storage the sync pipelines write through.
///
/// Every upsert is keyed on `(owner_id, remote id)` and keeps the local `id`
/// of an existing row, so re-running a sync never duplicates records.
#[async_trait]
pub trait SyncStore: Send + Sync {
    async fn upsert_ad_account(&self, account: &AdAccount) -> Result<()>;

    async fn ad_accounts(&self, owner_id: &str) -> Result<Vec<AdAccount>>;

    /// Returns the local id of the stored row.
    async fn upsert_campaign(&self, campaign: &Campaign) -> Result<String>;

    async fn campaigns(&self, owner_id: &str) -> Result<Vec<Campaign>>;

    async fn upsert_lead(&self, lead: &Lead) -> Result<()>;

    async fn leads(&self, owner_id: &str) -> Result<Vec<Lead>>;
}

// src/store/sqlite.rs
//! SQLite implementation of the sync store

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

use super::models::{AdAccount, Campaign, Lead};
use super::SyncStore;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database file and run migrations.
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!("Database connection established: {}", database_path.display());

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Private in-memory database, one connection so every query sees the same data.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS linkedin_ad_accounts (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                remote_account_id TEXT NOT NULL,
                display_name TEXT NOT NULL,
                account_type TEXT NOT NULL,
                status TEXT NOT NULL,
                currency_code TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (owner_id, remote_account_id)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS linkedin_campaigns (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                remote_campaign_id TEXT NOT NULL,
                name TEXT NOT NULL,
                status TEXT NOT NULL,
                campaign_type TEXT NOT NULL,
                objective_type TEXT NOT NULL,
                budget_amount REAL NOT NULL DEFAULT 0,
                budget_currency TEXT NOT NULL,
                created_at TEXT NOT NULL,
                last_synced_at TEXT NOT NULL,
                UNIQUE (owner_id, remote_campaign_id)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS linkedin_leads (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                remote_lead_id TEXT NOT NULL,
                campaign_local_id TEXT NOT NULL,
                remote_campaign_id TEXT NOT NULL,
                form_name TEXT NOT NULL,
                structured_responses TEXT NOT NULL,
                submitted_at TEXT NOT NULL,
                first_name TEXT,
                last_name TEXT,
                email TEXT,
                phone TEXT,
                company TEXT,
                job_title TEXT,
                last_synced_at TEXT NOT NULL,
                UNIQUE (owner_id, remote_lead_id)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_campaigns_owner ON linkedin_campaigns(owner_id);")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_leads_campaign ON linkedin_leads(campaign_local_id);")
            .execute(&self.pool)
            .await?;

        info!("Database migrations completed");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

#[async_trait]
impl SyncStore for SqliteStore {
    async fn upsert_ad_account(&self, account: &AdAccount) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO linkedin_ad_accounts
                (id, owner_id, remote_account_id, display_name, account_type, status, currency_code, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (owner_id, remote_account_id) DO UPDATE SET
                display_name = excluded.display_name,
                account_type = excluded.account_type,
                status = excluded.status,
                currency_code = excluded.currency_code,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&account.id)
        .bind(&account.owner_id)
        .bind(&account.remote_account_id)
        .bind(&account.display_name)
        .bind(&account.account_type)
        .bind(&account.status)
        .bind(&account.currency_code)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert ad account {}", account.remote_account_id))?;

        Ok(())
    }

    async fn ad_accounts(&self, owner_id: &str) -> Result<Vec<AdAccount>> {
        let accounts = sqlx::query_as::<_, AdAccount>(
            r#"
            SELECT id, owner_id, remote_account_id, display_name, account_type, status, currency_code, updated_at
            FROM linkedin_ad_accounts
            WHERE owner_id = ?
            ORDER BY remote_account_id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load ad accounts")?;

        Ok(accounts)
    }

    async fn upsert_campaign(&self, campaign: &Campaign) -> Result<String> {
        // created_at is kept from the first insert.
        let id = sqlx::query_scalar::<_, String>(
            r#"
            INSERT INTO linkedin_campaigns
                (id, owner_id, remote_campaign_id, name, status, campaign_type, objective_type,
                 budget_amount, budget_currency, created_at, last_synced_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (owner_id, remote_campaign_id) DO UPDATE SET
                name = excluded.name,
                status = excluded.status,
                campaign_type = excluded.campaign_type,
                objective_type = excluded.objective_type,
                budget_amount = excluded.budget_amount,
                budget_currency = excluded.budget_currency,
                last_synced_at = excluded.last_synced_at
            RETURNING id
            "#,
        )
        .bind(&campaign.id)
        .bind(&campaign.owner_id)
        .bind(&campaign.remote_campaign_id)
        .bind(&campaign.name)
        .bind(&campaign.status)
        .bind(&campaign.campaign_type)
        .bind(&campaign.objective_type)
        .bind(campaign.budget_amount)
        .bind(&campaign.budget_currency)
        .bind(campaign.created_at)
        .bind(campaign.last_synced_at)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert campaign {}", campaign.remote_campaign_id))?;

        Ok(id)
    }

    async fn campaigns(&self, owner_id: &str) -> Result<Vec<Campaign>> {
        let campaigns = sqlx::query_as::<_, Campaign>(
            r#"
            SELECT id, owner_id, remote_campaign_id, name, status, campaign_type, objective_type,
                   budget_amount, budget_currency, created_at, last_synced_at
            FROM linkedin_campaigns
            WHERE owner_id = ?
            ORDER BY remote_campaign_id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load campaigns")?;

        Ok(campaigns)
    }

    async fn upsert_lead(&self, lead: &Lead) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO linkedin_leads
                (id, owner_id, remote_lead_id, campaign_local_id, remote_campaign_id, form_name,
                 structured_responses, submitted_at, first_name, last_name, email, phone, company,
                 job_title, last_synced_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (owner_id, remote_lead_id) DO UPDATE SET
                campaign_local_id = excluded.campaign_local_id,
                remote_campaign_id = excluded.remote_campaign_id,
                form_name = excluded.form_name,
                structured_responses = excluded.structured_responses,
                submitted_at = excluded.submitted_at,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                email = excluded.email,
                phone = excluded.phone,
                company = excluded.company,
                job_title = excluded.job_title,
                last_synced_at = excluded.last_synced_at
            "#,
        )
        .bind(&lead.id)
        .bind(&lead.owner_id)
        .bind(&lead.remote_lead_id)
        .bind(&lead.campaign_local_id)
        .bind(&lead.remote_campaign_id)
        .bind(&lead.form_name)
        .bind(&lead.structured_responses)
        .bind(lead.submitted_at)
        .bind(&lead.contact.first_name)
        .bind(&lead.contact.last_name)
        .bind(&lead.contact.email)
        .bind(&lead.contact.phone)
        .bind(&lead.contact.company)
        .bind(&lead.contact.job_title)
        .bind(lead.last_synced_at)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert lead {}", lead.remote_lead_id))?;

        Ok(())
    }

    async fn leads(&self, owner_id: &str) -> Result<Vec<Lead>> {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT id, owner_id, remote_lead_id, campaign_local_id, remote_campaign_id, form_name,
                   structured_responses, submitted_at, first_name, last_name, email, phone, company,
                   job_title, last_synced_at
            FROM linkedin_leads
            WHERE owner_id = ?
            ORDER BY submitted_at ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load leads")?;

        Ok(leads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LeadContact;
    use chrono::{TimeZone, Utc};

    fn account(owner: &str, remote: &str, name: &str) -> AdAccount {
        AdAccount {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner.to_string(),
            remote_account_id: remote.to_string(),
            display_name: name.to_string(),
            account_type: "BUSINESS".to_string(),
            status: "ACTIVE".to_string(),
            currency_code: "USD".to_string(),
            updated_at: Utc::now(),
        }
    }

    fn campaign(owner: &str, remote: &str) -> Campaign {
        Campaign {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner.to_string(),
            remote_campaign_id: remote.to_string(),
            name: "Senior Rust Engineer".to_string(),
            status: "ACTIVE".to_string(),
            campaign_type: "SPONSORED_CONTENT".to_string(),
            objective_type: "LEAD_GENERATION".to_string(),
            budget_amount: 75.0,
            budget_currency: "EUR".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            last_synced_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn ad_account_upsert_updates_in_place() {
        let store = SqliteStore::in_memory().await.unwrap();
        let first = account("owner-1", "501", "Old name");

        store.upsert_ad_account(&first).await.unwrap();
        store
            .upsert_ad_account(&account("owner-1", "501", "New name"))
            .await
            .unwrap();

        let rows = store.ad_accounts("owner-1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, first.id);
        assert_eq!(rows[0].display_name, "New name");
    }

    #[tokio::test]
    async fn owners_are_isolated() {
        let store = SqliteStore::in_memory().await.unwrap();

        store.upsert_ad_account(&account("owner-1", "501", "A")).await.unwrap();
        store.upsert_ad_account(&account("owner-2", "501", "A")).await.unwrap();

        assert_eq!(store.ad_accounts("owner-1").await.unwrap().len(), 1);
        assert_eq!(store.ad_accounts("owner-2").await.unwrap().len(), 1);
        assert!(store.ad_accounts("owner-3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn campaign_upsert_returns_stable_id_and_keeps_created_at() {
        let store = SqliteStore::in_memory().await.unwrap();
        let original = campaign("owner-1", "9001");

        let first_id = store.upsert_campaign(&original).await.unwrap();

        let mut resynced = campaign("owner-1", "9001");
        resynced.status = "PAUSED".to_string();
        resynced.created_at = Utc::now();
        let second_id = store.upsert_campaign(&resynced).await.unwrap();

        assert_eq!(first_id, original.id);
        assert_eq!(second_id, first_id);

        let rows = store.campaigns("owner-1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, "PAUSED");
        assert_eq!(rows[0].created_at, original.created_at);
    }

    #[tokio::test]
    async fn lead_contact_round_trips_through_flattened_columns() {
        let store = SqliteStore::in_memory().await.unwrap();
        let lead = Lead {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: "owner-1".to_string(),
            remote_lead_id: "lead-1".to_string(),
            campaign_local_id: "c-local".to_string(),
            remote_campaign_id: "9001".to_string(),
            form_name: "Apply now".to_string(),
            structured_responses: "[]".to_string(),
            submitted_at: Utc.with_ymd_and_hms(2024, 5, 2, 12, 30, 0).unwrap(),
            contact: LeadContact {
                email: Some("a@b.com".to_string()),
                job_title: Some("CTO".to_string()),
                ..LeadContact::default()
            },
            last_synced_at: Utc::now(),
        };

        store.upsert_lead(&lead).await.unwrap();
        store.upsert_lead(&lead).await.unwrap();

        let rows = store.leads("owner-1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].contact, lead.contact);
        assert_eq!(rows[0].submitted_at, lead.submitted_at);
    }

    #[tokio::test]
    async fn file_database_is_created_with_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sync.db");

        let store = SqliteStore::new(&path).await.unwrap();
        store.health_check().await.unwrap();
        assert!(path.exists());
    }
}

// src/store/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AdAccount {
    pub id: String,
    pub owner_id: String,
    pub remote_account_id: String,
    pub display_name: String,
    pub account_type: String,
    pub status: String,
    pub currency_code: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Campaign {
    pub id: String,
    pub owner_id: String,
    pub remote_campaign_id: String,
    pub name: String,
    pub status: String,
    pub campaign_type: String,
    pub objective_type: String,
    pub budget_amount: f64,
    pub budget_currency: String,
    pub created_at: DateTime<Utc>,
    pub last_synced_at: DateTime<Utc>,
}

/// Contact fields lifted out of a lead's generic answer list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeadContact {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lead {
    pub id: String,
    pub owner_id: String,
    pub remote_lead_id: String,
    pub campaign_local_id: String,
    pub remote_campaign_id: String,
    pub form_name: String,
    /// Full answer list as JSON text.
    pub structured_responses: String,
    pub submitted_at: DateTime<Utc>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub contact: LeadContact,
    pub last_synced_at: DateTime<Utc>,
}

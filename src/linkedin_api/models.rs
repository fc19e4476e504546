// src/linkedin_api/models.rs
//! Remote payloads returned by the LinkedIn Marketing API.
//!
//! Every field is optional: LinkedIn omits fields freely depending on the
//! app's access tier, and mapping to local records applies the defaults.
//! Listing pages are decoded element by element (see [`Elements::decode`]),
//! so one unreadable row never fails its siblings.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Collection wrapper used by every listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Elements<T> {
    #[serde(default = "Vec::new")]
    pub elements: Vec<T>,
}

impl Elements<Value> {
    /// Decode each raw element on its own. Returns the readable rows and the number dropped.
    pub fn decode<T: DeserializeOwned>(self) -> (Vec<T>, usize) {
        let total = self.elements.len();
        let rows: Vec<T> = self
            .elements
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|element| serde_json::from_value(element).ok())
            .collect();
        let dropped = total - rows.len();
        (rows, dropped)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProfile {
    #[serde(default, deserialize_with = "remote_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub localized_first_name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub localized_last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAdAccount {
    #[serde(default, deserialize_with = "remote_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "text")]
    pub account_type: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCampaign {
    #[serde(default, deserialize_with = "remote_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub status: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "text")]
    pub campaign_type: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub objective_type: Option<String>,
    #[serde(default, deserialize_with = "nested")]
    pub daily_budget: Option<RemoteBudget>,
    #[serde(default, deserialize_with = "nested")]
    pub total_budget: Option<RemoteBudget>,
    #[serde(default, deserialize_with = "nested")]
    pub change_audit_stamps: Option<AuditStamps>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBudget {
    #[serde(default, deserialize_with = "decimal")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "text")]
    pub currency_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditStamps {
    #[serde(default, deserialize_with = "nested")]
    pub created: Option<AuditStamp>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditStamp {
    /// Epoch milliseconds.
    #[serde(default, deserialize_with = "millis")]
    pub time: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteLeadForm {
    #[serde(default, deserialize_with = "remote_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteLeadResponse {
    #[serde(default, deserialize_with = "remote_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "list")]
    pub responses: Vec<RemoteAnswer>,
    /// Epoch milliseconds.
    #[serde(default, deserialize_with = "millis")]
    pub submitted_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAnswer {
    #[serde(
        default,
        deserialize_with = "text",
        skip_serializing_if = "Option::is_none"
    )]
    pub question_id: Option<String>,
    #[serde(default)]
    pub answer: Value,
}

impl RemoteAnswer {
    /// Answer as text; non-string answers keep their JSON form.
    pub fn answer_text(&self) -> Option<String> {
        match &self.answer {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

// Field deserializers below never fail: a value of the wrong JSON type reads
// as missing, so the mapping defaults apply instead of rejecting the record.

/// LinkedIn ids come back as numbers on some endpoints and strings on others.
fn remote_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Budget amounts are decimal strings ("50.00") but tolerate plain numbers.
fn decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    })
}

fn millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn nested<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .filter(Value::is_object)
        .and_then(|v| serde_json::from_value(v).ok()))
}

/// Entries that are not objects are dropped.
fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        _ => Vec::new(),
    })
}

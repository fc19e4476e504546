// src/linkedin_sync/outcome.rs
use serde::{Deserialize, Serialize};

/// Response envelope returned by every sync command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub success: bool,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub troubleshooting: Option<String>,
}

impl SyncOutcome {
    pub fn synced(count: usize, message: impl Into<String>) -> Self {
        Self {
            success: true,
            count,
            total: None,
            message: Some(message.into()),
            error: None,
            troubleshooting: None,
        }
    }

    /// Nothing to do: not configured, precursor data missing, or an empty remote result.
    pub fn skipped(message: impl Into<String>) -> Self {
        Self::synced(0, message)
    }

    pub fn failed(error: impl Into<String>, troubleshooting: impl Into<String>) -> Self {
        Self {
            success: false,
            count: 0,
            total: None,
            message: None,
            error: Some(error.into()),
            troubleshooting: Some(troubleshooting.into()),
        }
    }

    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }
}

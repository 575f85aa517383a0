use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Payload accepted by `set`. Both fields may be omitted by the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreationInput {
    #[serde(default)]
    pub prompts: Option<Vec<String>>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A prompt set paired with its generated image.
///
/// `created_at` is only ever filled in from the backing table, so a staged
/// entry always has `None` here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creation {
    pub prompts: Vec<String>,
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<FixedOffset>>,
}

impl Creation {
    /// Missing prompts become an empty list, a missing image stays `None`.
    pub fn staged(input: CreationInput) -> Self {
        Self { prompts: input.prompts.unwrap_or_default(), image: input.image, created_at: None }
    }

    pub fn is_committed(&self) -> bool { self.created_at.is_some() }
}

/// One row as read from or confirmed by the backing table.
#[derive(Debug, Clone, PartialEq)]
pub struct CreationRecord {
    pub creation_id: String,
    pub creation: Creation,
}

/// One row of a commit batch.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRow {
    pub creation_id: String,
    pub prompts: Vec<String>,
    pub image: Option<String>,
}

impl PendingRow {
    pub fn from_staged(creation_id: &str, creation: &Creation) -> Self {
        Self { creation_id: creation_id.to_string(), prompts: creation.prompts.clone(), image: creation.image.clone() }
    }
}

/// Outcome of the construction-time load of committed rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadStatus {
    Loaded { rows: usize },
    Failed { reason: String },
}

/// Entries written by a successful commit, keyed by creation id.
/// Empty when there was nothing staged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CommitReport {
    pub committed: HashMap<String, Creation>,
}

impl CommitReport {
    pub fn len(&self) -> usize { self.committed.len() }

    pub fn is_empty(&self) -> bool { self.committed.is_empty() }
}

use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::domain::{CommitReport, Creation, CreationInput, LoadStatus, PendingRow};
use super::errors::{RepositoryError, StoreError};
use super::repository::CreationRepository;

/// Timeouts for the two calls the store makes to its repository.
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    pub load_timeout: Duration,
    pub commit_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { load_timeout: Duration::from_secs(10), commit_timeout: Duration::from_secs(30) }
    }
}

impl From<&configs::StoreConfig> for StoreOptions {
    fn from(cfg: &configs::StoreConfig) -> Self {
        Self { load_timeout: cfg.load_timeout(), commit_timeout: cfg.commit_timeout() }
    }
}

#[derive(Default)]
struct StoreState {
    committed: HashMap<String, Creation>,
    staging: HashMap<String, Creation>,
}

/// Staged writes over the durable `creations` table.
///
/// Reads see `staging` first, then `committed`. Only `commit` writes to the
/// repository, and it holds the write lock for the whole upsert so concurrent
/// `set`/`delete` calls wait instead of landing between the upsert and the
/// clear.
pub struct StagedStore {
    repo: Arc<dyn CreationRepository>,
    state: RwLock<StoreState>,
    load_status: LoadStatus,
    options: StoreOptions,
}

async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => Err(RepositoryError::Timeout(limit)),
    }
}

impl StagedStore {
    /// Load every committed row. A failed load leaves `committed` empty and is
    /// reported through `load_status`, never as an error.
    #[instrument(skip_all)]
    pub async fn initialize(repo: Arc<dyn CreationRepository>, options: StoreOptions) -> Self {
        let mut committed = HashMap::new();
        let load_status = match bounded(options.load_timeout, repo.select_all()).await {
            Ok(rows) => {
                for row in rows {
                    committed.insert(row.creation_id, row.creation);
                }
                info!(event = "store_loaded", rows = committed.len(), "committed creations loaded");
                LoadStatus::Loaded { rows: committed.len() }
            }
            Err(e) => {
                warn!(event = "store_load_failed", error = %e, "starting with empty committed set");
                LoadStatus::Failed { reason: e.to_string() }
            }
        };

        Self {
            repo,
            state: RwLock::new(StoreState { committed, staging: HashMap::new() }),
            load_status,
            options,
        }
    }

    pub fn load_status(&self) -> &LoadStatus { &self.load_status }

    /// Stage `input` under `creation_id`, replacing any staged value.
    pub async fn set(&self, creation_id: &str, input: CreationInput) -> Result<(), StoreError> {
        models::creation::validate_creation_id(creation_id).map_err(|e| StoreError::Validation(e.to_string()))?;
        let creation = Creation::staged(input);
        let mut state = self.state.write().await;
        let replaced = state.staging.insert(creation_id.to_string(), creation).is_some();
        debug!(event = "creation_staged", creation_id, replaced, "creation staged");
        Ok(())
    }

    pub async fn get(&self, creation_id: &str) -> Option<Creation> {
        let state = self.state.read().await;
        state
            .staging
            .get(creation_id)
            .or_else(|| state.committed.get(creation_id))
            .cloned()
    }

    /// Drop a staged entry. Committed entries are untouched.
    pub async fn delete(&self, creation_id: &str) {
        let mut state = self.state.write().await;
        if state.staging.remove(creation_id).is_some() {
            debug!(event = "creation_unstaged", creation_id, "staged creation removed");
        }
    }

    /// Copy of the pending entries.
    pub async fn snapshot(&self) -> HashMap<String, Creation> {
        self.state.read().await.staging.clone()
    }

    /// Copy of the last known durable state.
    pub async fn history(&self) -> HashMap<String, Creation> {
        self.state.read().await.committed.clone()
    }

    /// Upsert everything staged in one batch. On success the confirmed rows are
    /// merged into `committed`, staging is cleared and the staged entries are
    /// returned. On failure nothing changes.
    #[instrument(skip(self))]
    pub async fn commit(&self) -> Result<CommitReport, StoreError> {
        let mut state = self.state.write().await;
        if state.staging.is_empty() {
            debug!(event = "commit_noop", "nothing staged");
            return Ok(CommitReport::default());
        }

        let batch: Vec<PendingRow> = state
            .staging
            .iter()
            .map(|(id, c)| PendingRow::from_staged(id, c))
            .collect();
        let sent = batch.len();

        let written = match bounded(self.options.commit_timeout, self.repo.upsert_many(batch)).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(event = "commit_failed", error = %e, staged = sent, "staging kept for retry");
                return Err(StoreError::CommitFailed(e.to_string()));
            }
        };

        if written.len() != sent {
            warn!(sent, confirmed = written.len(), "backing store confirmed a different row count");
        }
        let confirmed = written.len();
        for row in written {
            state.committed.insert(row.creation_id, row.creation);
        }
        let committed = std::mem::take(&mut state.staging);
        info!(event = "commit_succeeded", rows = sent, confirmed, "staged creations committed");
        Ok(CommitReport { committed })
    }

    /// Discard everything staged.
    pub async fn rollback(&self) {
        let mut state = self.state.write().await;
        let dropped = state.staging.len();
        state.staging.clear();
        info!(event = "staging_rolled_back", dropped, "staging discarded");
    }
}

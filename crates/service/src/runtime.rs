//! Runtime wiring helpers
//!
//! Builds the process-wide `StagedStore` from configuration so binary crates
//! only deal with `service::runtime::build_store`.

use std::sync::Arc;

use tracing::{info, warn};

use crate::creations::repo::migrating::{MigratingRepository, SchemaMigration};
use crate::creations::repo::seaorm::SeaOrmCreationRepository;
use crate::creations::repository::CreationRepository;
use crate::creations::{StagedStore, StoreOptions};

/// Connect to Postgres, apply migrations if enabled, and load the store.
///
/// The pool is created lazily, so an unreachable database does not stop
/// startup. A failed migration is retried before every backing-store call
/// until it succeeds; meanwhile the store starts with an empty committed set.
pub async fn build_store(cfg: &configs::AppConfig) -> anyhow::Result<Arc<StagedStore>> {
    let db = models::db::connect_lazy_with_config(&cfg.database).await?;

    let repo = SeaOrmCreationRepository { db };
    let repo: Arc<dyn CreationRepository> = if !cfg.database.auto_migrate {
        Arc::new(repo)
    } else {
        match repo.apply().await {
            Ok(()) => {
                info!(event = "migrations_applied", "database schema up to date");
                Arc::new(repo)
            }
            Err(e) => {
                warn!(
                    event = "migrations_failed",
                    error = %e,
                    "schema not migrated; retrying before each load or commit until it succeeds"
                );
                Arc::new(MigratingRepository::new(repo))
            }
        }
    };
    let store = StagedStore::initialize(repo, StoreOptions::from(&cfg.store)).await;
    Ok(Arc::new(store))
}

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::creations::domain::{CreationRecord, PendingRow};
use crate::creations::errors::RepositoryError;
use crate::creations::repository::CreationRepository;

/// Brings the backing table's schema up to date.
#[async_trait]
pub trait SchemaMigration: Send + Sync {
    async fn apply(&self) -> Result<(), RepositoryError>;
}

/// Wraps a repository whose schema could not be migrated at startup and
/// retries the migration before each write until one succeeds.
pub struct MigratingRepository<R> {
    inner: R,
    migrated: Mutex<bool>,
}

impl<R> MigratingRepository<R>
where
    R: CreationRepository + SchemaMigration,
{
    pub fn new(inner: R) -> Self {
        Self { inner, migrated: Mutex::new(false) }
    }

    pub fn inner(&self) -> &R { &self.inner }

    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        let mut migrated = self.migrated.lock().await;
        if *migrated {
            return Ok(());
        }
        match self.inner.apply().await {
            Ok(()) => {
                info!(event = "migrations_applied", "database schema up to date after retry");
                *migrated = true;
                Ok(())
            }
            Err(e) => {
                warn!(event = "migrations_failed", error = %e, "schema still not migrated");
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<R> CreationRepository for MigratingRepository<R>
where
    R: CreationRepository + SchemaMigration,
{
    async fn select_all(&self) -> Result<Vec<CreationRecord>, RepositoryError> {
        self.ensure_schema().await?;
        self.inner.select_all().await
    }

    async fn upsert_many(&self, rows: Vec<PendingRow>) -> Result<Vec<CreationRecord>, RepositoryError> {
        self.ensure_schema().await?;
        self.inner.upsert_many(rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::creations::repository::mock::MockCreationRepository;

    #[derive(Default)]
    struct FlakySchema {
        repo: MockCreationRepository,
        down: AtomicBool,
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl SchemaMigration for FlakySchema {
        async fn apply(&self) -> Result<(), RepositoryError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.down.load(Ordering::SeqCst) {
                return Err(RepositoryError::Unavailable("connection refused".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CreationRepository for FlakySchema {
        async fn select_all(&self) -> Result<Vec<CreationRecord>, RepositoryError> {
            self.repo.select_all().await
        }

        async fn upsert_many(&self, rows: Vec<PendingRow>) -> Result<Vec<CreationRecord>, RepositoryError> {
            self.repo.upsert_many(rows).await
        }
    }

    fn row(id: &str) -> PendingRow {
        PendingRow { creation_id: id.into(), prompts: vec!["cat".into()], image: None }
    }

    #[tokio::test]
    async fn write_retries_migration_until_it_succeeds() -> anyhow::Result<()> {
        let schema = FlakySchema::default();
        schema.down.store(true, Ordering::SeqCst);
        let repo = MigratingRepository::new(schema);

        let err = repo.upsert_many(vec![row("a")]).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Unavailable(_)));
        assert_eq!(repo.inner().repo.upsert_calls(), 0);

        repo.inner().down.store(false, Ordering::SeqCst);
        let written = repo.upsert_many(vec![row("a")]).await?;
        assert_eq!(written.len(), 1);
        assert_eq!(repo.inner().attempts.load(Ordering::SeqCst), 2);

        // once migrated, later writes go straight through
        repo.upsert_many(vec![row("b")]).await?;
        assert_eq!(repo.inner().attempts.load(Ordering::SeqCst), 2);
        assert_eq!(repo.inner().repo.upsert_calls(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn reads_wait_for_the_schema_too() {
        let schema = FlakySchema::default();
        schema.down.store(true, Ordering::SeqCst);
        let repo = MigratingRepository::new(schema);

        assert!(repo.select_all().await.is_err());
        assert_eq!(repo.inner().repo.select_calls(), 0);
    }
}

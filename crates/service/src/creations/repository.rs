use async_trait::async_trait;

use super::domain::{CreationRecord, PendingRow};
use super::errors::RepositoryError;

/// Repository abstraction for the durable `creations` table.
#[async_trait]
pub trait CreationRepository: Send + Sync {
    /// Every stored row.
    async fn select_all(&self) -> Result<Vec<CreationRecord>, RepositoryError>;
    /// Write the whole batch in one statement, last write wins per key, and
    /// return the rows as stored. All-or-nothing.
    async fn upsert_many(&self, rows: Vec<PendingRow>) -> Result<Vec<CreationRecord>, RepositoryError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard, PoisonError};
    use std::time::Duration;

    use chrono::Utc;

    use crate::creations::domain::Creation;

    #[derive(Default)]
    pub struct MockCreationRepository {
        rows: Mutex<HashMap<String, Creation>>,  // key: creation_id
        batches: Mutex<Vec<Vec<PendingRow>>>,    // every upsert received
        select_calls: AtomicUsize,
        upsert_calls: AtomicUsize,
        fail_select: AtomicBool,
        fail_upsert: AtomicBool,
        delay: Mutex<Option<Duration>>,
    }

    fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
        m.lock().unwrap_or_else(PoisonError::into_inner)
    }

    impl MockCreationRepository {
        /// Pre-populate the table; rows get a `created_at` of now.
        pub fn with_rows<I>(rows: I) -> Self
        where
            I: IntoIterator<Item = (String, Vec<String>, Option<String>)>,
        {
            let repo = Self::default();
            {
                let mut table = lock(&repo.rows);
                for (id, prompts, image) in rows {
                    table.insert(id, Creation { prompts, image, created_at: Some(Utc::now().into()) });
                }
            }
            repo
        }

        pub fn fail_select(&self, fail: bool) { self.fail_select.store(fail, Ordering::SeqCst); }

        pub fn fail_upsert(&self, fail: bool) { self.fail_upsert.store(fail, Ordering::SeqCst); }

        /// Make every call sleep first; used to exercise store timeouts.
        pub fn delay_calls(&self, delay: Option<Duration>) { *lock(&self.delay) = delay; }

        pub fn select_calls(&self) -> usize { self.select_calls.load(Ordering::SeqCst) }

        pub fn upsert_calls(&self) -> usize { self.upsert_calls.load(Ordering::SeqCst) }

        pub fn batches(&self) -> Vec<Vec<PendingRow>> { lock(&self.batches).clone() }

        pub fn stored(&self, creation_id: &str) -> Option<Creation> { lock(&self.rows).get(creation_id).cloned() }

        async fn maybe_sleep(&self) {
            let delay = *lock(&self.delay);
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
        }
    }

    #[async_trait]
    impl CreationRepository for MockCreationRepository {
        async fn select_all(&self) -> Result<Vec<CreationRecord>, RepositoryError> {
            self.select_calls.fetch_add(1, Ordering::SeqCst);
            self.maybe_sleep().await;
            if self.fail_select.load(Ordering::SeqCst) {
                return Err(RepositoryError::Unavailable("mock select failure".into()));
            }
            let rows = lock(&self.rows);
            Ok(rows
                .iter()
                .map(|(id, c)| CreationRecord { creation_id: id.clone(), creation: c.clone() })
                .collect())
        }

        async fn upsert_many(&self, rows: Vec<PendingRow>) -> Result<Vec<CreationRecord>, RepositoryError> {
            self.upsert_calls.fetch_add(1, Ordering::SeqCst);
            lock(&self.batches).push(rows.clone());
            self.maybe_sleep().await;
            if self.fail_upsert.load(Ordering::SeqCst) {
                return Err(RepositoryError::Rejected("mock upsert failure".into()));
            }
            let mut table = lock(&self.rows);
            let mut written = Vec::with_capacity(rows.len());
            for row in rows {
                let created_at = table
                    .get(&row.creation_id)
                    .and_then(|c| c.created_at)
                    .unwrap_or_else(|| Utc::now().into());
                let creation = Creation { prompts: row.prompts, image: row.image, created_at: Some(created_at) };
                table.insert(row.creation_id.clone(), creation.clone());
                written.push(CreationRecord { creation_id: row.creation_id, creation });
            }
            Ok(written)
        }
    }
}

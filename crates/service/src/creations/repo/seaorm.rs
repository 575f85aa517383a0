use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tracing::warn;

use super::migrating::SchemaMigration;
use crate::creations::domain::{Creation, CreationRecord, PendingRow};
use crate::creations::errors::RepositoryError;
use crate::creations::repository::CreationRepository;

pub struct SeaOrmCreationRepository {
    pub db: DatabaseConnection,
}

fn to_record(m: models::creation::Model) -> Result<CreationRecord, RepositoryError> {
    let prompts = m.prompt_list()?;
    Ok(CreationRecord {
        creation_id: m.creation_id,
        creation: Creation { prompts, image: m.image_base64, created_at: Some(m.created_at) },
    })
}

#[async_trait::async_trait]
impl CreationRepository for SeaOrmCreationRepository {
    async fn select_all(&self) -> Result<Vec<CreationRecord>, RepositoryError> {
        let rows = models::creation::select_all(&self.db).await?;
        // rows written by other clients may not decode; keep the usable ones
        Ok(rows
            .into_iter()
            .filter_map(|m| {
                let creation_id = m.creation_id.clone();
                match to_record(m) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!(%creation_id, error = %e, "skipping malformed creation row");
                        None
                    }
                }
            })
            .collect())
    }

    async fn upsert_many(&self, rows: Vec<PendingRow>) -> Result<Vec<CreationRecord>, RepositoryError> {
        let rows = rows
            .into_iter()
            .map(|r| models::creation::NewCreation { creation_id: r.creation_id, prompts: r.prompts, image_base64: r.image })
            .collect();
        let written = models::creation::upsert_many(&self.db, rows).await?;
        written.into_iter().map(to_record).collect()
    }
}

#[async_trait::async_trait]
impl SchemaMigration for SeaOrmCreationRepository {
    async fn apply(&self) -> Result<(), RepositoryError> {
        migration::Migrator::up(&self.db, None)
            .await
            .map_err(|e| RepositoryError::Unavailable(format!("migrations: {e}")))
    }
}

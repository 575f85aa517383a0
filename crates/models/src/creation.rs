use sea_orm::{entity::prelude::*, sea_query::OnConflict, ConnectionTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "creations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub creation_id: String,
    pub prompts: Json,
    #[sea_orm(column_type = "Text", nullable)]
    pub image_base64: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decode the `prompts` column; rows written by other clients may hold
    /// anything JSON.
    pub fn prompt_list(&self) -> Result<Vec<String>, errors::ModelError> {
        match &self.prompts {
            Json::Null => Ok(Vec::new()),
            other => serde_json::from_value(other.clone()).map_err(|e| errors::ModelError::MalformedRow {
                creation_id: self.creation_id.clone(),
                reason: format!("prompts: {e}"),
            }),
        }
    }
}

/// A row as sent to the database. `created_at` is left to the column default.
#[derive(Clone, Debug, PartialEq)]
pub struct NewCreation {
    pub creation_id: String,
    pub prompts: Vec<String>,
    pub image_base64: Option<String>,
}

impl NewCreation {
    fn into_active_model(self) -> Result<ActiveModel, errors::ModelError> {
        validate_creation_id(&self.creation_id)?;
        let prompts = serde_json::to_value(&self.prompts)
            .map_err(|e| errors::ModelError::Validation(format!("prompts: {e}")))?;
        Ok(ActiveModel {
            creation_id: Set(self.creation_id),
            prompts: Set(prompts),
            image_base64: Set(self.image_base64),
            ..Default::default()
        })
    }
}

pub fn validate_creation_id(id: &str) -> Result<(), errors::ModelError> {
    if id.trim().is_empty() {
        return Err(errors::ModelError::Validation("creation_id required".into()));
    }
    Ok(())
}

/// Read the whole table, oldest first.
pub async fn select_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Insert every row in one statement; existing keys get their prompts and
/// image replaced while keeping their original `created_at`. Returns the rows
/// as stored.
pub async fn upsert_many<C: ConnectionTrait>(db: &C, rows: Vec<NewCreation>) -> Result<Vec<Model>, errors::ModelError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let models = rows
        .into_iter()
        .map(NewCreation::into_active_model)
        .collect::<Result<Vec<_>, _>>()?;

    Entity::insert_many(models)
        .on_conflict(
            OnConflict::column(Column::CreationId)
                .update_columns([Column::Prompts, Column::ImageBase64])
                .to_owned(),
        )
        .exec_with_returning_many(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

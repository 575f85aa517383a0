//! Create `creations` table.
//! One row per committed creation; `created_at` is stamped by the database.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Creations::Table)
                    .if_not_exists()
                    .col(string(Creations::CreationId).primary_key())
                    .col(json_binary(Creations::Prompts))
                    .col(text_null(Creations::ImageBase64))
                    .col(
                        timestamp_with_time_zone(Creations::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // History listings are ordered by creation time
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_creations_created_at")
                    .table(Creations::Table)
                    .col(Creations::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Creations::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Creations {
    Table,
    CreationId,
    Prompts,
    ImageBase64,
    CreatedAt,
}

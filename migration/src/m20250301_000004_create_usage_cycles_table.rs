use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UsageCycles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UsageCycles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UsageCycles::Name).string_len(100).not_null())
                    .col(ColumnDef::new(UsageCycles::Description).text())
                    .col(ColumnDef::new(UsageCycles::StartTime).timestamp().not_null())
                    .col(ColumnDef::new(UsageCycles::EndTime).timestamp().not_null())
                    .col(ColumnDef::new(UsageCycles::TargetCount).integer())
                    .col(
                        ColumnDef::new(UsageCycles::CurrentCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsageCycles::MaxCredentials)
                            .integer()
                            .not_null()
                            .default(10),
                    )
                    .col(
                        ColumnDef::new(UsageCycles::Status)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(UsageCycles::CompletedAt).timestamp())
                    .col(
                        ColumnDef::new(UsageCycles::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(UsageCycles::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_usage_cycles_status_window")
                    .table(UsageCycles::Table)
                    .col(UsageCycles::Status)
                    .col(UsageCycles::StartTime)
                    .col(UsageCycles::EndTime)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UsageCycles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UsageCycles {
    Table,
    Id,
    Name,
    Description,
    StartTime,
    EndTime,
    TargetCount,
    CurrentCount,
    MaxCredentials,
    Status,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}

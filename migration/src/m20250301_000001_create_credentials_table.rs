use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Credentials::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Credentials::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Credentials::Ip)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Credentials::Secret).text().not_null())
                    .col(
                        ColumnDef::new(Credentials::Status)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Credentials::InUse)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Credentials::LastUsedAt).timestamp())
                    .col(ColumnDef::new(Credentials::LastCheckedAt).timestamp())
                    .col(
                        ColumnDef::new(Credentials::UseCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Credentials::ValidUntil).timestamp())
                    .col(ColumnDef::new(Credentials::ErrorMessage).text())
                    .col(
                        ColumnDef::new(Credentials::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Credentials::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 出借查询走 status + in_use
        manager
            .create_index(
                Index::create()
                    .name("idx_credentials_status_in_use")
                    .table(Credentials::Table)
                    .col(Credentials::Status)
                    .col(Credentials::InUse)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_credentials_last_used_at")
                    .table(Credentials::Table)
                    .col(Credentials::LastUsedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_credentials_valid_until")
                    .table(Credentials::Table)
                    .col(Credentials::ValidUntil)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Credentials::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Credentials {
    Table,
    Id,
    Ip,
    Secret,
    Status,
    InUse,
    LastUsedAt,
    LastCheckedAt,
    UseCount,
    ValidUntil,
    ErrorMessage,
    CreatedAt,
    UpdatedAt,
}

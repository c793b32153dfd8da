use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CredentialLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CredentialLogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CredentialLogs::CredentialId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CredentialLogs::Action)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CredentialLogs::Status)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(CredentialLogs::Message).text())
                    .col(
                        ColumnDef::new(CredentialLogs::CreatedAt)
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
                    .name("idx_credential_logs_credential_created")
                    .table(CredentialLogs::Table)
                    .col(CredentialLogs::CredentialId)
                    .col(CredentialLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CredentialLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CredentialLogs {
    Table,
    Id,
    CredentialId,
    Action,
    Status,
    Message,
    CreatedAt,
}

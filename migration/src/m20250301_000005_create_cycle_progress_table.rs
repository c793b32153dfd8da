use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CycleProgress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CycleProgress::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CycleProgress::CycleId).integer().not_null())
                    .col(
                        ColumnDef::new(CycleProgress::CredentialId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CycleProgress::UsedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CycleProgress::Success)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(CycleProgress::ErrorMessage).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cycle_progress_cycle_id")
                            .from(CycleProgress::Table, CycleProgress::CycleId)
                            .to(UsageCycles::Table, UsageCycles::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cycle_progress_cycle_used_at")
                    .table(CycleProgress::Table)
                    .col(CycleProgress::CycleId)
                    .col(CycleProgress::UsedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CycleProgress::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CycleProgress {
    Table,
    Id,
    CycleId,
    CredentialId,
    UsedAt,
    Success,
    ErrorMessage,
}

#[derive(DeriveIden)]
enum UsageCycles {
    Table,
    Id,
}

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    // 未设置 DATABASE_URL 时请先导出，例如 DATABASE_URL=sqlite://data/cookie_pool.db?mode=rwc
    cli::run_cli(migration::Migrator).await;
}

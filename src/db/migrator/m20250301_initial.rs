use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CompanyCache::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CompanyCache::CompanyNumber)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CompanyCache::RecordJson).text().not_null())
                    .col(
                        ColumnDef::new(CompanyCache::FetchedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CompanyCache::ExpiresAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OfficerCache::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OfficerCache::CompanyNumber)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OfficerCache::OfficersJson).text().not_null())
                    .col(
                        ColumnDef::new(OfficerCache::TotalResults)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OfficerCache::ActiveCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OfficerCache::ResignedCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OfficerCache::FetchedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(OfficerCache::ExpiresAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SearchSnapshots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SearchSnapshots::Token)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SearchSnapshots::FiltersJson)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SearchSnapshots::ItemsJson).text().not_null())
                    .col(
                        ColumnDef::new(SearchSnapshots::CreatedAt)
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
                    .name("idx_search_snapshots_created_at")
                    .table(SearchSnapshots::Table)
                    .col(SearchSnapshots::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SearchSnapshots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OfficerCache::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CompanyCache::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CompanyCache {
    Table,
    CompanyNumber,
    RecordJson,
    FetchedAt,
    ExpiresAt,
}

#[derive(DeriveIden)]
enum OfficerCache {
    Table,
    CompanyNumber,
    OfficersJson,
    TotalResults,
    ActiveCount,
    ResignedCount,
    FetchedAt,
    ExpiresAt,
}

#[derive(DeriveIden)]
enum SearchSnapshots {
    Table,
    Token,
    FiltersJson,
    ItemsJson,
    CreatedAt,
}

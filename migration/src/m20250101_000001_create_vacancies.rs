// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vacancies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vacancies::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vacancies::Header).text().not_null())
                    .col(ColumnDef::new(Vacancies::Content).text().not_null())
                    .col(ColumnDef::new(Vacancies::Url).text().not_null())
                    .col(ColumnDef::new(Vacancies::Source).string().not_null())
                    .col(
                        ColumnDef::new(Vacancies::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一站点的同一URL只记录一次
        manager
            .create_index(
                Index::create()
                    .name("idx_vacancies_source_url")
                    .table(Vacancies::Table)
                    .col(Vacancies::Source)
                    .col(Vacancies::Url)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_vacancies_source_url")
                    .table(Vacancies::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Vacancies::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Vacancies {
    Table,
    Id,
    Header,
    Content,
    Url,
    Source,
    CreatedAt,
}

//! Migration to add the passport table.
//!
//! The unique index on (provider, identifier) is what keeps concurrent
//! first logins for the same external account from creating duplicate
//! members; the application recovers from the violation by re-reading.

use sea_orm_migration::prelude::*;

use crate::m20260801_120000_add_member_table::Member;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Passport::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Passport::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Passport::MemberId).string().not_null())
                    .col(ColumnDef::new(Passport::Provider).string().not_null())
                    .col(ColumnDef::new(Passport::Identifier).string().not_null())
                    .col(
                        ColumnDef::new(Passport::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_passport_member")
                            .from(Passport::Table, Passport::MemberId)
                            .to(Member::Table, Member::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_passport_provider_identifier_unique")
                    .table(Passport::Table)
                    .col(Passport::Provider)
                    .col(Passport::Identifier)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_passport_member_id")
                    .table(Passport::Table)
                    .col(Passport::MemberId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_passport_member_id").to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_passport_provider_identifier_unique")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Passport::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Passport {
    Table,
    Id,
    MemberId,
    Provider,
    Identifier,
    CreatedAt,
}

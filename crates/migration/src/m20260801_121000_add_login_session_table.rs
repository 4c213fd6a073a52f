//! Migration to add the login session table.

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
                    .table(LoginSession::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoginSession::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LoginSession::Token)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(LoginSession::MemberId).string().not_null())
                    .col(
                        ColumnDef::new(LoginSession::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_login_session_member")
                            .from(LoginSession::Table, LoginSession::MemberId)
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
                    .name("idx_login_session_member_id")
                    .table(LoginSession::Table)
                    .col(LoginSession::MemberId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_login_session_member_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LoginSession::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LoginSession {
    Table,
    Id,
    Token,
    MemberId,
    CreatedAt,
}

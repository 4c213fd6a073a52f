//! Passport store.
//!
//! A passport binds one (provider, identifier) pair to one member. The pair
//! is unique at the storage layer, which is what makes first-login
//! find-or-create safe when several requests race on the same external
//! account, possibly from different processes.

use crate::entity::{member, passport};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, SqlErr, TransactionTrait,
};
use std::sync::Arc;
use time::OffsetDateTime;

/// Service for resolving and creating passports and their owning members.
pub struct PassportService {
    db: Arc<DatabaseConnection>,
}

impl PassportService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the member holding a passport for (provider, identifier).
    #[tracing::instrument(skip(self))]
    pub async fn find_member(
        &self,
        provider: &str,
        identifier: &str,
    ) -> Result<Option<member::Model>, DbErr> {
        let passport = passport::Entity::find()
            .filter(passport::Column::Provider.eq(provider))
            .filter(passport::Column::Identifier.eq(identifier))
            .one(self.db.as_ref())
            .await?;

        match passport {
            Some(p) => {
                member::Entity::find_by_id(&p.member_id)
                    .one(self.db.as_ref())
                    .await
            }
            None => Ok(None),
        }
    }

    /// Persist a new member together with its first passport.
    ///
    /// Both rows go in one transaction. If another request created a
    /// passport for the same pair in the meantime, the unique index rejects
    /// ours; we then return the member that won the race instead of erroring,
    /// so the operation stays idempotent per (provider, identifier).
    #[tracing::instrument(skip(self, member))]
    pub async fn create_member_with_passport(
        &self,
        provider: &str,
        identifier: &str,
        member: member::ActiveModel,
    ) -> Result<member::Model, DbErr> {
        let insert = async {
            let txn = self.db.begin().await?;
            let created = member.insert(&txn).await?;
            let passport = passport::ActiveModel {
                id: Set(uuid::Uuid::new_v4().to_string()),
                member_id: Set(created.id.clone()),
                provider: Set(provider.to_string()),
                identifier: Set(identifier.to_string()),
                created_at: Set(OffsetDateTime::now_utc()),
            };
            passport.insert(&txn).await?;
            txn.commit().await?;
            Ok::<member::Model, DbErr>(created)
        };

        match insert.await {
            Ok(created) => {
                tracing::info!(
                    member_id = %created.id,
                    provider = provider,
                    "Created member with passport"
                );
                Ok(created)
            }
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                tracing::debug!(
                    provider = provider,
                    identifier = identifier,
                    "Lost passport creation race, returning existing member"
                );
                self.find_member(provider, identifier)
                    .await?
                    .ok_or(err)
            }
            Err(err) => Err(err),
        }
    }

    /// All passports held by a member.
    #[tracing::instrument(skip(self))]
    pub async fn member_passports(&self, member_id: &str) -> Result<Vec<passport::Model>, DbErr> {
        passport::Entity::find()
            .filter(passport::Column::MemberId.eq(member_id))
            .all(self.db.as_ref())
            .await
    }

    /// Remove a member's passport for one provider. Returns whether a row
    /// was deleted.
    #[tracing::instrument(skip(self))]
    pub async fn unlink(&self, member_id: &str, provider: &str) -> Result<bool, DbErr> {
        let result = passport::Entity::delete_many()
            .filter(passport::Column::MemberId.eq(member_id))
            .filter(passport::Column::Provider.eq(provider))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Number of passports stored for a (provider, identifier) pair.
    /// Only ever 0 or 1 thanks to the unique index; exposed for tests and
    /// consistency checks.
    pub async fn passport_count(&self, provider: &str, identifier: &str) -> Result<u64, DbErr> {
        passport::Entity::find()
            .filter(passport::Column::Provider.eq(provider))
            .filter(passport::Column::Identifier.eq(identifier))
            .count(self.db.as_ref())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, Database, DbBackend, Statement};

    async fn setup_test_db() -> Arc<DatabaseConnection> {
        let db = Database::connect("sqlite::memory:").await.expect("connect");

        db.execute(Statement::from_string(
            DbBackend::Sqlite,
            r#"CREATE TABLE member (
                id TEXT PRIMARY KEY,
                email TEXT NULL,
                name TEXT NULL,
                source_provider TEXT NOT NULL,
                blocked INTEGER NOT NULL DEFAULT 0,
                locked_out_until TEXT NULL,
                created_at TEXT NOT NULL,
                last_login_at TEXT NULL
            );"#,
        ))
        .await
        .expect("create member table");

        db.execute(Statement::from_string(
            DbBackend::Sqlite,
            r#"CREATE TABLE passport (
                id TEXT PRIMARY KEY,
                member_id TEXT NOT NULL,
                provider TEXT NOT NULL,
                identifier TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE(provider, identifier)
            );"#,
        ))
        .await
        .expect("create passport table");

        Arc::new(db)
    }

    fn new_member(source_provider: &str) -> member::ActiveModel {
        member::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            email: Set(None),
            name: Set(None),
            source_provider: Set(source_provider.to_string()),
            blocked: Set(false),
            locked_out_until: Set(None),
            created_at: Set(OffsetDateTime::now_utc()),
            last_login_at: Set(None),
        }
    }

    #[tokio::test]
    async fn find_member_returns_none_without_passport() {
        let db = setup_test_db().await;
        let service = PassportService::new(db);

        let found = service.find_member("google", "123").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn create_then_find_roundtrip() {
        let db = setup_test_db().await;
        let service = PassportService::new(db);

        let created = service
            .create_member_with_passport("google", "123456789", new_member("google"))
            .await
            .unwrap();

        let found = service
            .find_member("google", "123456789")
            .await
            .unwrap()
            .expect("member should resolve via passport");
        assert_eq!(found.id, created.id);
        assert_eq!(found.source_provider, "google");
    }

    #[tokio::test]
    async fn same_identifier_different_provider_is_distinct() {
        let db = setup_test_db().await;
        let service = PassportService::new(db);

        let google = service
            .create_member_with_passport("google", "123", new_member("google"))
            .await
            .unwrap();
        let facebook = service
            .create_member_with_passport("facebook", "123", new_member("facebook"))
            .await
            .unwrap();

        assert_ne!(google.id, facebook.id);
    }

    #[tokio::test]
    async fn creation_race_returns_existing_member() {
        let db = setup_test_db().await;
        let service = PassportService::new(db.clone());

        let winner = service
            .create_member_with_passport("google", "123", new_member("google"))
            .await
            .unwrap();

        // A second creation for the same pair hits the unique index and
        // must hand back the winner instead of erroring.
        let loser = service
            .create_member_with_passport("google", "123", new_member("google"))
            .await
            .unwrap();

        assert_eq!(winner.id, loser.id);
        assert_eq!(service.passport_count("google", "123").await.unwrap(), 1);

        // The losing member row must not survive the rolled-back transaction
        let members = member::Entity::find().all(db.as_ref()).await.unwrap();
        assert_eq!(members.len(), 1);
    }

    #[tokio::test]
    async fn member_can_hold_passports_for_multiple_providers() {
        let db = setup_test_db().await;
        let service = PassportService::new(db.clone());

        let member = service
            .create_member_with_passport("google", "g-1", new_member("google"))
            .await
            .unwrap();

        // Link the same member to a second provider directly
        let extra = passport::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            member_id: Set(member.id.clone()),
            provider: Set("facebook".to_string()),
            identifier: Set("fb-1".to_string()),
            created_at: Set(OffsetDateTime::now_utc()),
        };
        extra.insert(db.as_ref()).await.unwrap();

        let passports = service.member_passports(&member.id).await.unwrap();
        assert_eq!(passports.len(), 2);

        assert!(service.unlink(&member.id, "facebook").await.unwrap());
        assert!(!service.unlink(&member.id, "facebook").await.unwrap());
        let passports = service.member_passports(&member.id).await.unwrap();
        assert_eq!(passports.len(), 1);
    }
}

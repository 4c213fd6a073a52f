//! Session establishment.
//!
//! The login core only ever talks to [`SessionStore`]; the default
//! implementation persists a session row and stamps the member's last
//! login. Callers that keep sessions elsewhere (cookie jars, an external
//! identity store) implement the trait instead.

use crate::entity::{login_session, member};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection, DbErr, IntoActiveModel};
use std::sync::Arc;
use time::OffsetDateTime;

/// Establishes a session for an eligible member.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn log_in(&self, member: &member::Model) -> Result<login_session::Model, DbErr>;
}

/// Generate a secure random session token
pub fn generate_session_token() -> String {
    use base64::Engine;
    let mut bytes = [0u8; 32];
    getrandom::fill(&mut bytes).expect("Failed to generate random bytes");
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Database-backed session store.
pub struct DbSessionStore {
    db: Arc<DatabaseConnection>,
}

impl DbSessionStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl SessionStore for DbSessionStore {
    #[tracing::instrument(skip(self, member), fields(member_id = %member.id))]
    async fn log_in(&self, member: &member::Model) -> Result<login_session::Model, DbErr> {
        let now = OffsetDateTime::now_utc();
        let session = login_session::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            token: Set(generate_session_token()),
            member_id: Set(member.id.clone()),
            created_at: Set(now),
        };
        let session = session.insert(self.db.as_ref()).await?;

        let mut active = member.clone().into_active_model();
        active.last_login_at = Set(Some(now));
        active.update(self.db.as_ref()).await?;

        tracing::info!(member_id = %member.id, "Member logged in");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{
        ColumnTrait, ConnectionTrait, Database, DbBackend, EntityTrait, QueryFilter, Statement,
    };

    #[test]
    fn session_tokens_are_unique_and_urlsafe() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_ne!(a, b);
        assert!(a.len() >= 40);
        assert!(!a.contains('+') && !a.contains('/') && !a.contains('='));
    }

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
            r#"CREATE TABLE login_session (
                id TEXT PRIMARY KEY,
                token TEXT NOT NULL UNIQUE,
                member_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            );"#,
        ))
        .await
        .expect("create login_session table");

        Arc::new(db)
    }

    #[tokio::test]
    async fn log_in_creates_session_and_stamps_member() {
        let db = setup_test_db().await;

        let member = member::ActiveModel {
            id: Set("member-1".to_string()),
            email: Set(None),
            name: Set(None),
            source_provider: Set("google".to_string()),
            blocked: Set(false),
            locked_out_until: Set(None),
            created_at: Set(OffsetDateTime::now_utc()),
            last_login_at: Set(None),
        };
        let member = member.insert(db.as_ref()).await.unwrap();

        let store = DbSessionStore::new(db.clone());
        let session = store.log_in(&member).await.unwrap();
        assert_eq!(session.member_id, "member-1");
        assert!(!session.token.is_empty());

        let sessions = login_session::Entity::find()
            .filter(login_session::Column::MemberId.eq("member-1"))
            .all(db.as_ref())
            .await
            .unwrap();
        assert_eq!(sessions.len(), 1);

        let reloaded = member::Entity::find_by_id("member-1")
            .one(db.as_ref())
            .await
            .unwrap()
            .unwrap();
        assert!(reloaded.last_login_at.is_some());
    }
}

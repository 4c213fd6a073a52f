//! The login token handler: token in, logged-in member out.

use crate::auth::eligibility::EligibilityPolicy;
use crate::auth::mapper::MemberMapperRegistry;
use crate::auth::passports::PassportService;
use crate::auth::resource_owner::ResourceOwnerClient;
use crate::auth::session::SessionStore;
use crate::entity::{login_session, member};
use crate::error::LoginError;
use sea_orm::{ActiveValue::Set, DatabaseConnection};
use std::sync::Arc;
use time::OffsetDateTime;

/// Orchestrates token exchange, passport find-or-create, the eligibility
/// gate and session establishment.
///
/// The resource-owner client is passed per call since it is request-scoped
/// (the provider the user came back from); the remaining collaborators are
/// injected at construction.
pub struct LoginTokenHandler {
    passports: PassportService,
    mappers: Arc<MemberMapperRegistry>,
    eligibility: Arc<dyn EligibilityPolicy>,
    sessions: Arc<dyn SessionStore>,
}

impl LoginTokenHandler {
    pub fn new(
        db: Arc<DatabaseConnection>,
        mappers: Arc<MemberMapperRegistry>,
        eligibility: Arc<dyn EligibilityPolicy>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            passports: PassportService::new(db),
            mappers,
            eligibility,
            sessions,
        }
    }

    /// Resolve an access token to the local member it belongs to, creating
    /// member and passport on first contact.
    ///
    /// The mapper only runs when a member is created; a repeat login returns
    /// the stored member untouched.
    #[tracing::instrument(skip_all, fields(provider = client.provider_name()))]
    pub async fn resolve(
        &self,
        access_token: &str,
        client: &dyn ResourceOwnerClient,
    ) -> Result<member::Model, LoginError> {
        let owner = client.exchange(access_token).await?;
        let provider = client.provider_name();

        if let Some(existing) = self
            .passports
            .find_member(provider, &owner.identifier)
            .await?
        {
            tracing::debug!(member_id = %existing.id, "Resolved token to existing member");
            return Ok(existing);
        }

        let now = OffsetDateTime::now_utc();
        let new_member = member::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            email: Set(None),
            name: Set(None),
            source_provider: Set(provider.to_string()),
            blocked: Set(false),
            locked_out_until: Set(None),
            created_at: Set(now),
            last_login_at: Set(None),
        };
        let mapped = self.mappers.for_provider(provider).map(new_member, &owner);

        let created = self
            .passports
            .create_member_with_passport(provider, &owner.identifier, mapped)
            .await?;
        Ok(created)
    }

    /// Full login: resolve the member, check eligibility, establish a
    /// session. The session store is never invoked for an ineligible member.
    #[tracing::instrument(skip_all, fields(provider = client.provider_name()))]
    pub async fn handle_token(
        &self,
        access_token: &str,
        client: &dyn ResourceOwnerClient,
    ) -> Result<(member::Model, login_session::Model), LoginError> {
        let member = self.resolve(access_token, client).await?;

        let verdict = self.eligibility.validate_can_login(&member);
        if !verdict.is_valid() {
            tracing::warn!(
                member_id = %member.id,
                reasons = ?verdict.reasons(),
                "Login rejected by eligibility check"
            );
            return Err(LoginError::Ineligible {
                reasons: verdict.into_reasons(),
            });
        }

        let session = self.sessions.log_in(&member).await?;
        Ok((member, session))
    }
}

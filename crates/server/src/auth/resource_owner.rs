//! Resource owner exchange.
//!
//! A resource owner is the provider's representation of the authenticated
//! user, fetched with an access token. It is never persisted directly; the
//! identifier ends up in a passport and the profile fields pass through a
//! mapper onto a new member.

use crate::config::ProviderConfig;
use crate::error::ExchangeError;
use serde_json::Value;

/// The provider's view of the authenticated user.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceOwner {
    /// Provider-assigned opaque identifier
    pub identifier: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Exchanges an access token for a [`ResourceOwner`].
#[async_trait::async_trait]
pub trait ResourceOwnerClient: Send + Sync {
    /// Provider name used for passport and mapper lookups.
    fn provider_name(&self) -> &str;

    async fn exchange(&self, access_token: &str) -> Result<ResourceOwner, ExchangeError>;
}

/// Config-driven HTTP client for any provider with a bearer-authenticated
/// userinfo endpoint. Which JSON fields hold the identifier, email and name
/// comes from [`ProviderConfig`].
#[derive(Debug, Clone)]
pub struct UserInfoClient {
    provider: ProviderConfig,
    http: reqwest::Client,
}

impl UserInfoClient {
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            http: reqwest::Client::new(),
        }
    }
}

/// Pull a string out of a JSON object field, accepting numeric identifiers
/// the way providers like Facebook hand them out.
fn string_field(body: &Value, field: &str) -> Option<String> {
    match body.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait::async_trait]
impl ResourceOwnerClient for UserInfoClient {
    fn provider_name(&self) -> &str {
        &self.provider.name
    }

    #[tracing::instrument(skip(self, access_token), fields(provider = %self.provider.name))]
    async fn exchange(&self, access_token: &str) -> Result<ResourceOwner, ExchangeError> {
        let response = self
            .http
            .get(&self.provider.userinfo_url)
            .bearer_auth(access_token)
            .header("User-Agent", "oauth-login/0.1")
            .send()
            .await
            .map_err(|e| ExchangeError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let context = response.text().await.unwrap_or_default();
            return Err(ExchangeError::Http { status, context });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ExchangeError::InvalidJson(e.to_string()))?;

        let identifier = string_field(&body, &self.provider.identifier_field)
            .ok_or_else(|| ExchangeError::MissingIdentifier(self.provider.identifier_field.clone()))?;

        Ok(ResourceOwner {
            identifier,
            email: string_field(&body, &self.provider.email_field),
            name: string_field(&body, &self.provider.name_field),
        })
    }
}

//! Token login endpoints.

use crate::auth::{LoginTokenHandler, ResourceOwnerClient};
use crate::error::LoginError;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Tag for OpenAPI documentation.
pub const LOGIN_TAG: &str = "Login";

/// Shared state for the login endpoints.
#[derive(Clone)]
pub struct LoginAppState {
    pub handler: Arc<LoginTokenHandler>,
    /// Resource-owner clients keyed by provider name.
    pub clients: Arc<HashMap<String, Arc<dyn ResourceOwnerClient>>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenLoginRequest {
    /// Name of the configured provider the token came from
    pub provider: String,
    /// OAuth2 access token obtained from that provider
    pub access_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenLoginResponse {
    pub member_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub source_provider: String,
    /// Opaque session token for subsequent requests
    pub session_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginErrorResponse {
    pub error: String,
    /// Eligibility reasons when the login was refused
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasons: Option<Vec<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProvidersResponse {
    pub providers: Vec<String>,
}

/// Creates the login router.
pub fn router(state: LoginAppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(token_login))
        .routes(routes!(list_providers))
        .with_state(state)
}

/// Exchange a provider access token for a local login.
#[tracing::instrument(skip(state, request), fields(provider = %request.provider))]
#[utoipa::path(
    post,
    path = "/token",
    tag = LOGIN_TAG,
    operation_id = "Token Login",
    summary = "Log in with an OAuth2 access token",
    description = "Exchanges the access token for the provider's resource-owner identity, \
                   finds or creates the member holding the matching passport, checks that \
                   the member may log in and establishes a session.\n\n\
                   The first login for an external account creates the member; later logins \
                   return the same member without touching its profile fields.",
    request_body = TokenLoginRequest,
    responses(
        (status = 200, description = "Login established", body = TokenLoginResponse),
        (status = 400, description = "Unknown provider", body = LoginErrorResponse),
        (status = 401, description = "Token exchange failed", body = LoginErrorResponse),
        (status = 403, description = "Member may not log in", body = LoginErrorResponse),
        (status = 500, description = "Storage error", body = LoginErrorResponse),
    )
)]
async fn token_login(
    State(state): State<LoginAppState>,
    Json(request): Json<TokenLoginRequest>,
) -> Response {
    let Some(client) = state.clients.get(&request.provider) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(LoginErrorResponse {
                error: format!("Unknown provider: {}", request.provider),
                reasons: None,
            }),
        )
            .into_response();
    };

    match state
        .handler
        .handle_token(&request.access_token, client.as_ref())
        .await
    {
        Ok((member, session)) => (
            StatusCode::OK,
            Json(TokenLoginResponse {
                member_id: member.id,
                email: member.email,
                name: member.name,
                source_provider: member.source_provider,
                session_token: session.token,
            }),
        )
            .into_response(),
        Err(LoginError::Ineligible { reasons }) => (
            StatusCode::FORBIDDEN,
            Json(LoginErrorResponse {
                error: "Login refused".to_string(),
                reasons: Some(reasons),
            }),
        )
            .into_response(),
        Err(err @ LoginError::Exchange(_)) => {
            tracing::warn!(error = %err, "Token exchange failed");
            (
                StatusCode::UNAUTHORIZED,
                Json(LoginErrorResponse {
                    error: "Could not resolve access token".to_string(),
                    reasons: None,
                }),
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "Login failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(LoginErrorResponse {
                    error: "Internal error".to_string(),
                    reasons: None,
                }),
            )
                .into_response()
        }
    }
}

/// List the configured provider names.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/providers",
    tag = LOGIN_TAG,
    operation_id = "List Providers",
    summary = "List configured identity providers",
    responses(
        (status = 200, description = "Configured provider names", body = ProvidersResponse),
    )
)]
async fn list_providers(State(state): State<LoginAppState>) -> Json<ProvidersResponse> {
    let mut providers: Vec<String> = state.clients.keys().cloned().collect();
    providers.sort();
    Json(ProvidersResponse { providers })
}

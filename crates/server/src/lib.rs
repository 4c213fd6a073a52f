//! A service that maps OAuth2 access tokens to local member accounts and
//! logs them in.
//!
//! The OAuth2 redirect dance itself happens elsewhere; this crate picks up
//! at the point where a caller holds a provider access token. It exchanges
//! the token for the provider's resource-owner identity, finds or creates
//! the member holding the matching passport, checks login eligibility, and
//! establishes a session.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

pub mod api;
pub mod auth;
pub mod config;
pub mod entity;
pub mod error;

#[derive(Clone, Debug)]
pub struct AppResources {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
}

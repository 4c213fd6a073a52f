use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("Network error during userinfo request: {0}")]
    Network(String),
    #[error("HTTP {status} from userinfo endpoint: {context}")]
    Http { status: StatusCode, context: String },
    #[error("Invalid JSON in userinfo response: {0}")]
    InvalidJson(String),
    #[error("Userinfo response has no usable `{0}` identifier field")]
    MissingIdentifier(String),
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
    #[error("Member may not log in: {}", .reasons.join("; "))]
    Ineligible { reasons: Vec<String> },
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}


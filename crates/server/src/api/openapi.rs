//! OpenAPI/Utoipa configuration.

use crate::api::{health::MISC_TAG, login::LOGIN_TAG};
use utoipa::OpenApi;

/// OpenAPI documentation configuration.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "OAuth Login API",
        version = "1.0.0",
        description = "API for logging in local members with OAuth2 provider access tokens."
    ),
    tags(
        (name = MISC_TAG, description = "Miscellaneous endpoints"),
        (name = LOGIN_TAG, description = "Token login endpoints")
    )
)]
pub struct ApiDoc;

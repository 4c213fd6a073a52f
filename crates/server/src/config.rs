use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// One configured identity provider.
///
/// The field names describe where in the provider's userinfo JSON the
/// resource-owner attributes live, so generic providers can be wired up
/// from configuration alone.
#[derive(Clone, Debug, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    /// Endpoint queried with `Authorization: Bearer <token>`
    pub userinfo_url: String,
    #[serde(default = "default_identifier_field")]
    pub identifier_field: String,
    #[serde(default = "default_email_field")]
    pub email_field: String,
    #[serde(default = "default_name_field")]
    pub name_field: String,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub providers: Vec<ProviderConfig>,
}

fn default_identifier_field() -> String {
    "id".to_string()
}

fn default_email_field() -> String {
    "email".to_string()
}

fn default_name_field() -> String {
    "name".to_string()
}

fn validate(app: &AppConfig) -> Result<(), ConfigError> {
    if app.providers.is_empty() {
        return Err(ConfigError::Validation(
            "at least one provider must be configured".into(),
        ));
    }
    for provider in &app.providers {
        if provider.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "provider name must not be empty".into(),
            ));
        }
        if !provider.userinfo_url.starts_with("http://")
            && !provider.userinfo_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(format!(
                "provider `{}` has a non-HTTP userinfo_url",
                provider.name
            )));
        }
    }
    let mut names: Vec<&str> = app.providers.iter().map(|p| p.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    if names.len() != app.providers.len() {
        return Err(ConfigError::Validation(
            "provider names must be unique".into(),
        ));
    }
    Ok(())
}

/// Load application configuration from `config.yaml` + environment overrides.
///
/// Environment variable override convention: any var matching the key path
/// separated by double underscores (e.g. `DATABASE_URL`) will override the
/// file value.
///
/// Returns a `ConfigError` instead of panicking so the caller can decide how to fail.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};
    let cfg = Config::builder()
        .add_source(File::with_name("config.yaml"))
        .add_source(Environment::default().separator("__"))
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;
    validate(&app)?;
    Ok(app)
}

/// Convenience helper for binaries wanting panic-on-error behaviour.
pub fn load_config_or_panic() -> AppConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => panic!("Failed to load configuration: {e}"),
    }
}

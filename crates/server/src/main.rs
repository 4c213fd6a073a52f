use oauth_login::AppResources;
use oauth_login::api::{LoginAppState, start_webserver};
use oauth_login::auth::{
    DbSessionStore, DefaultEligibilityPolicy, LoginTokenHandler, MemberMapperRegistry,
    ResourceOwnerClient, UserInfoClient,
};
use oauth_login::config::load_config_or_panic;
use sea_orm::Database;
use std::collections::HashMap;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_tracing() {
    let default_directives = "oauth_login=info,hyper=warn,sea_orm=info";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer().with_target(true).with_level(true);

    registry.with(layer).init();
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install().expect("Failed to install `color_eyre::install`");

    initialize_tracing();

    // Load config
    let config = Arc::new(load_config_or_panic());

    // Set up SeaORM database connection
    let db = Arc::new(
        Database::connect(&config.database_url)
            .await
            .expect("Failed to connect to database"),
    );

    // One resource-owner client per configured provider
    let mut clients: HashMap<String, Arc<dyn ResourceOwnerClient>> = HashMap::new();
    for provider in &config.providers {
        clients.insert(
            provider.name.clone(),
            Arc::new(UserInfoClient::new(provider.clone())),
        );
    }
    tracing::info!(providers = clients.len(), "Configured identity providers");

    let handler = Arc::new(LoginTokenHandler::new(
        db.clone(),
        Arc::new(MemberMapperRegistry::new()),
        Arc::new(DefaultEligibilityPolicy),
        Arc::new(DbSessionStore::new(db.clone())),
    ));

    let login_state = LoginAppState {
        handler,
        clients: Arc::new(clients),
    };

    let resources = AppResources { db, config };

    start_webserver(login_state, resources).await?;
    Ok(())
}

use std::sync::Arc;

use pool_gateway::account::models::AccountAttribute;
use pool_gateway::account::models::AccountName;
use pool_gateway::account::models::AttributeSet;
use pool_gateway::config::BootstrapAdminConfig;
use pool_gateway::config::Config;
use pool_gateway::domain::auth::errors::AuthError;
use pool_gateway::domain::auth::models::RegisterCommand;
use pool_gateway::domain::auth::ports::AuthServicePort;
use pool_gateway::inbound::http::router::create_router;
use pool_gateway::outbound::tokens::JwtTokenProvider;
use pool_gateway::repositories::PostgresAccountStore;
use pool_gateway::AuthService;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pool_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "pool-gateway",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        project = %config.project_name,
        environment = %config.environment,
        http_port = config.server.http_port,
        max_connections = config.database.max_connections,
        token_ttl_seconds = config.jwt.access_token_expire_seconds,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let account_store = Arc::new(PostgresAccountStore::new(pg_pool));
    let token_provider = Arc::new(JwtTokenProvider::new(
        config.jwt.secret.as_bytes(),
        config.jwt.access_token_ttl()?,
    ));

    let auth_service: Arc<dyn AuthServicePort> =
        Arc::new(AuthService::new(account_store, token_provider));

    if let Some(admin) = &config.bootstrap_admin {
        bootstrap_admin(auth_service.as_ref(), admin).await?;
    }

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited successfully");

    Ok(())
}

/// Register the configured admin account unless its name is already taken.
async fn bootstrap_admin(
    auth_service: &dyn AuthServicePort,
    admin: &BootstrapAdminConfig,
) -> Result<(), anyhow::Error> {
    let mut attributes = AttributeSet::new();
    attributes.insert(AccountAttribute::Admin);

    let command = RegisterCommand {
        name: AccountName::new(admin.name.clone())?,
        password: admin.password.clone(),
        attributes,
    };

    match auth_service.register(command).await {
        Ok(outcome) => {
            tracing::info!(
                account_id = %outcome.account.id,
                name = %outcome.account.name,
                "Bootstrap admin created"
            );
            Ok(())
        }
        Err(AuthError::UserAlreadyExists(name)) => {
            tracing::info!(name = %name, "Bootstrap admin already present");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

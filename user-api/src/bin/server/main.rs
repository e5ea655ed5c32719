use std::net::SocketAddr;
use std::sync::Arc;

use auth::Authenticator;
use auth::TokenPolicy;
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use user_api::config::Config;
use user_api::config::StoreBackend;
use user_api::domain::user::ensure_user;
use user_api::domain::user::ports::UserStore;
use user_api::domain::user::BootstrapUser;
use user_api::inbound::http::router::create_router;
use user_api::outbound::repositories::InMemoryUserStore;
use user_api::outbound::repositories::PostgresUserStore;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "user-api",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        backend = ?config.database.backend,
        http_port = config.server.http_port,
        token_issuer = %config.jwt.issuer,
        token_expiration_days = config.jwt.expiration_days,
        rate_limit_max_requests = config.rate_limit.max_requests,
        rate_limit_window_secs = config.rate_limit.window_secs,
        rate_limit_trust_forwarded_headers = config.rate_limit.trust_forwarded_headers,
        "Configuration loaded"
    );

    let policy = TokenPolicy::with_expiration_days(
        config.jwt.issuer.clone(),
        config.jwt.audience.clone(),
        config.jwt.expiration_days,
    );
    let authenticator = Arc::new(Authenticator::new(config.jwt.secret.as_bytes(), policy));

    match config.database.backend {
        StoreBackend::Postgres => {
            let store = PostgresUserStore::connect(&config.database).await?;
            serve(Arc::new(store), authenticator, &config).await
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory user store; data is lost on shutdown");
            serve(Arc::new(InMemoryUserStore::new()), authenticator, &config).await
        }
    }
}

async fn serve<S>(
    store: Arc<S>,
    authenticator: Arc<Authenticator>,
    config: &Config,
) -> Result<(), anyhow::Error>
where
    S: UserStore,
{
    if let Some(bootstrap) = config.bootstrap.clone() {
        let seed = BootstrapUser::from(bootstrap);
        ensure_user(store.as_ref(), &authenticator, &seed).await?;
    }

    let http_application = create_router(store, authenticator, &config.rate_limit)?;

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(
        http_listener,
        http_application.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server exited successfully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C signal, shutting down gracefully"),
        _ = terminate => tracing::info!("Received SIGTERM signal, shutting down gracefully"),
    }
}

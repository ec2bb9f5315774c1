use std::sync::Arc;

use sso_service::config::Config;
use sso_service::config::RunEnvironment;
use sso_service::domain::credentials::models::Application;
use sso_service::domain::credentials::service::AuthService;
use sso_service::inbound::grpc::AuthGrpcService;
use sso_service::inbound::http::router::create_router;
use sso_service::outbound::repositories::SqliteCredentialStore;
use sso_service::outbound::token::JwtTokenIssuer;
use sso_service::proto::auth_server::AuthServer;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::load()?;
    init_tracing(config.env);

    tracing::info!(
        service = "sso-service",
        version = env!("CARGO_PKG_VERSION"),
        env = ?config.env,
        "Service starting"
    );

    tracing::info!(
        database_url = %config.database.url,
        http_port = config.server.http_port,
        grpc_port = config.server.grpc_port,
        token_ttl_seconds = config.token.ttl_seconds,
        applications = config.applications.len(),
        "Configuration loaded"
    );

    let pool = SqliteCredentialStore::connect(&config.database).await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "sqlite",
        "Database connection pool created and migrated"
    );

    let store = Arc::new(SqliteCredentialStore::new(pool));
    for app in &config.applications {
        store.provision_application(&Application::from(app)).await?;
        tracing::info!(app_id = app.id, name = %app.name, "Application provisioned");
    }

    let password_hasher = auth::PasswordHasher::with_params(
        config.password.memory_kib,
        config.password.iterations,
        config.password.parallelism,
    )?;

    let mut auth_service = AuthService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::new(JwtTokenIssuer::new()),
        config.token.ttl(),
    )
    .with_password_hasher(password_hasher);
    if let Some(timeout) = config.database.query_timeout() {
        auth_service = auth_service.with_store_timeout(timeout);
    }
    let auth_service = Arc::new(auth_service);

    let shutdown = CancellationToken::new();

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(
        Arc::clone(&auth_service),
        config.server.request_timeout(),
    );
    let http_server = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            axum::serve(http_listener, http_application)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
        }
    });

    let grpc_address = format!("0.0.0.0:{}", config.server.grpc_port).parse()?;
    let grpc_service = AuthGrpcService::new(Arc::clone(&auth_service));
    tracing::info!(
        address = %grpc_address,
        port = config.server.grpc_port,
        protocol = "grpc",
        "gRpc server listening"
    );

    let grpc_server = tokio::spawn({
        let shutdown = shutdown.clone();
        let request_timeout = config.server.request_timeout();
        async move {
            Server::builder()
                .timeout(request_timeout)
                .add_service(AuthServer::new(grpc_service))
                .serve_with_shutdown(grpc_address, async move { shutdown.cancelled().await })
                .await
        }
    });

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            let signal = shutdown_signal().await;
            tracing::info!(signal, "Shutdown signal received, draining connections");
            shutdown.cancel();
        }
    });

    let (http_result, grpc_result) = tokio::try_join!(http_server, grpc_server)?;
    if let Err(e) = &http_result {
        tracing::error!(error = %e, protocol = "http", "Server error");
    }
    if let Err(e) = &grpc_result {
        tracing::error!(error = %e, protocol = "grpc", "Server error");
    }
    http_result?;
    grpc_result?;

    tracing::info!("Servers exited successfully");

    Ok(())
}

/// Text output for local runs; JSON everywhere else.
fn init_tracing(env: RunEnvironment) {
    let default_filter = match env {
        RunEnvironment::Local | RunEnvironment::Development => {
            "sso_service=debug,tower_http=debug"
        }
        RunEnvironment::Production => "sso_service=info,tower_http=info",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let registry = tracing_subscriber::registry().with(filter);
    match env {
        RunEnvironment::Local => registry.with(tracing_subscriber::fmt::layer()).init(),
        RunEnvironment::Development | RunEnvironment::Production => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}

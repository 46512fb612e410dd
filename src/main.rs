use std::time::Duration;

use stack_sample::config::{load_jwt_secret, Config};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stack_sample=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load environment configuration");

    // Demo only: the secret is checked for presence and not used for signing.
    if load_jwt_secret(config.jwt_secret_file.as_deref()).is_some() {
        tracing::info!("JWT secret loaded");
    }

    let app = stack_sample::create_app(&config).expect("Failed to register metrics");

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .expect("Failed to bind listener");
    tracing::info!(
        service = %config.service_name,
        "Listening on {}",
        config.bind_address()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.shutdown_timeout))
        .await
        .expect("Server error");

    tracing::info!("Server stopped");
}

/// Resolves on SIGINT or SIGTERM, then arms a deadline that forces exit if draining hangs
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
        "SIGINT"
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
        "SIGTERM"
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&str>();

    let received = tokio::select! {
        name = ctrl_c => name,
        name = terminate => name,
    };

    tracing::info!(signal = received, "Shutting down");

    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        tracing::error!("Shutdown exceeded {:?}, forcing exit", timeout);
        std::process::exit(1);
    });
}

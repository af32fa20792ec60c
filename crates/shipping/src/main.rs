//! Shipping consumer entry point.

use std::sync::Arc;

use shipping::{
    ConsumerConfig, InMemoryShipmentStore, PostgresShipmentStore, ShipmentStore, ShippingConsumer,
};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

async fn open_store(config: &ConsumerConfig) -> Arc<dyn ShipmentStore> {
    match &config.database_url {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(url)
                .await
                .expect("failed to connect to shipping database");
            let store = PostgresShipmentStore::new(pool);
            store
                .run_migrations()
                .await
                .expect("shipping migrations failed");
            tracing::info!("using PostgreSQL shipment store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("SHIPPING_DATABASE_URL not set, keeping shipments in memory");
            Arc::new(InMemoryShipmentStore::new())
        }
    }
}

#[tokio::main]
async fn main() {
    let config = ConsumerConfig::from_env();

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = open_store(&config).await;
    let app = shipping::http::router(Arc::new(ShippingConsumer::new(store)));

    let addr = config.addr();
    tracing::info!(%addr, "starting shipping consumer");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("shipping consumer shut down gracefully");
}

//! API server entry point.

use api::Config;
use shipping::{ShipmentReconciler, ShippingConsumer};
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

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Wire stores, service clients and the event bus; seed the catalog
    let wiring = api::build_state(&config)
        .await
        .expect("failed to build application state");

    // 4. Run the shipping consumer in-process when the in-process bus is used
    if let Some(events) = wiring.events {
        let shipments = api::open_shipment_store(&config)
            .await
            .expect("failed to open shipment store");
        let consumer = ShippingConsumer::new(shipments.clone());
        tokio::spawn(async move { consumer.run(events).await });

        if let Some(every) = config.reconcile_interval {
            let reconciler = ShipmentReconciler::new(
                wiring.store.clone(),
                shipments,
                wiring.publisher.clone(),
                config.business_id.clone(),
            );
            tokio::spawn(async move { reconciler.run_periodically(every).await });
        }
    } else if config.reconcile_interval.is_some() {
        tracing::warn!("reconciliation needs the in-process shipping consumer, not starting it");
    }

    // 5. Build the application
    let app = api::create_app(wiring.state, metrics_handle);

    // 6. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

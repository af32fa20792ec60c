//! HTTP API server with observability for storefront order placement.
//!
//! Provides REST endpoints for placing and reading orders, with structured
//! logging (tracing) and Prometheus metrics. Collaborators are chosen at
//! startup from [`Config`]: each remote service falls back to a local
//! stand-in when its URL is not configured.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::{InventoryRecord, Money};
use event_bus::{
    ChannelEventBus, DisabledPublisher, EventPublisher, EventStream, HttpEventPublisher,
};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{InMemoryOrderStore, OrderStore, PostgresOrderStore};
use saga::{
    HttpInventoryClient, HttpPaymentAuthorizer, InventoryClient, OrderOrchestrator,
    PaymentAuthorizer, SagaSettings, StoreInventoryClient, StubPaymentAuthorizer,
};
use shipping::{InMemoryShipmentStore, PostgresShipmentStore, ShipmentStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{Config, EventBusMode, InventoryMode};
pub use error::{ApiError, StartupError};
use routes::orders::AppState;

/// Undelivered events the in-process bus buffers before refusing new ones.
const IN_PROCESS_BUS_CAPACITY: usize = 1024;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create))
        .route("/orders/{id}", get(routes::orders::get))
        .route("/inventory", get(routes::inventory::list))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Everything [`build_state`] wires together.
pub struct Wiring {
    pub state: Arc<AppState>,
    pub store: Arc<dyn OrderStore>,
    pub publisher: Arc<dyn EventPublisher>,
    /// Events of the in-process bus; `None` for any other [`EventBusMode`].
    pub events: Option<EventStream>,
}

/// Builds the application state from configuration.
///
/// Seeds [`demo_catalog`] when enabled and the item table is empty.
pub async fn build_state(config: &Config) -> Result<Wiring, StartupError> {
    let store = open_store(config).await?;

    if config.seed_inventory && store.list_inventory().await?.is_empty() {
        store.upsert_inventory(demo_catalog()).await?;
        tracing::info!("seeded demo inventory");
    }

    let client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;

    let inventory: Arc<dyn InventoryClient> = match &config.inventory_service_url {
        Some(url) => Arc::new(HttpInventoryClient::with_client(client.clone(), url)),
        None => Arc::new(StoreInventoryClient::new(store.clone())),
    };

    let payment: Arc<dyn PaymentAuthorizer> = match &config.payment_service_url {
        Some(url) => Arc::new(HttpPaymentAuthorizer::with_client(client.clone(), url)),
        None => {
            tracing::warn!("PAYMENT_SERVICE_URL not set, approving every charge");
            Arc::new(StubPaymentAuthorizer::new())
        }
    };

    let (publisher, events) = match &config.event_bus {
        EventBusMode::Http(url) => (
            Arc::new(HttpEventPublisher::with_client(client, url.clone())) as Arc<dyn EventPublisher>,
            None,
        ),
        EventBusMode::InProcess => {
            let (bus, events) = ChannelEventBus::new(IN_PROCESS_BUS_CAPACITY);
            (Arc::new(bus) as Arc<dyn EventPublisher>, Some(events))
        }
        EventBusMode::Disabled => {
            tracing::warn!("event bus disabled, placed orders will not reach shipping");
            (Arc::new(DisabledPublisher) as Arc<dyn EventPublisher>, None)
        }
    };

    let settings = SagaSettings {
        business_id: config.business_id.clone(),
        stock_policy: config.inventory_mode.stock_policy(),
        ..SagaSettings::default()
    };

    let orchestrator = OrderOrchestrator::new(
        inventory,
        payment,
        store.clone(),
        publisher.clone(),
        settings,
    );

    Ok(Wiring {
        state: Arc::new(AppState { orchestrator }),
        store,
        publisher,
        events,
    })
}

async fn open_store(config: &Config) -> Result<Arc<dyn OrderStore>, StartupError> {
    match &config.database_url {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(url)
                .await?;
            let store = PostgresOrderStore::new(pool);
            store.run_migrations().await?;
            tracing::info!("using PostgreSQL order store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, keeping orders in memory");
            Ok(Arc::new(InMemoryOrderStore::new()))
        }
    }
}

/// Opens the shipment store of the embedded shipping consumer.
pub async fn open_shipment_store(config: &Config) -> Result<Arc<dyn ShipmentStore>, StartupError> {
    match &config.shipping_database_url {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(url)
                .await?;
            let store = PostgresShipmentStore::new(pool);
            store.run_migrations().await?;
            tracing::info!("using PostgreSQL shipment store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("SHIPPING_DATABASE_URL not set, keeping shipments in memory");
            Ok(Arc::new(InMemoryShipmentStore::new()))
        }
    }
}

/// The catalog a fresh deployment starts with.
pub fn demo_catalog() -> Vec<InventoryRecord> {
    let item = |number, name, description: &str, cents, quantity| InventoryRecord {
        description: Some(description.to_string()),
        ..InventoryRecord::new(number, name, Money::from_cents(cents), quantity)
    };
    vec![
        item(10001, "Laptop 15\"", "High performance laptop", 99999, 50),
        item(10002, "Wireless Mouse", "Ergonomic wireless mouse", 2999, 100),
        item(10003, "Keyboard", "Mechanical keyboard", 8999, 75),
        item(10004, "Monitor 27\"", "4K Ultra HD Monitor", 34999, 30),
        item(10005, "USB-C Hub", "7-in-1 USB-C Hub", 4999, 200),
    ]
}

//! Application configuration loaded from environment variables.

use std::time::Duration;

use order_store::StockPolicy;

/// Where stock availability is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InventoryMode {
    /// The local item table is the source of truth and is decremented in
    /// the order transaction.
    #[default]
    Local,
    /// Inventory lives in a separate service; the local table is not
    /// decremented.
    Shadow,
}

impl InventoryMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Some(InventoryMode::Local),
            "shadow" => Some(InventoryMode::Shadow),
            _ => None,
        }
    }

    /// Returns the store's stock policy for this mode.
    pub fn stock_policy(&self) -> StockPolicy {
        match self {
            InventoryMode::Local => StockPolicy::Decrement,
            InventoryMode::Shadow => StockPolicy::Skip,
        }
    }
}

/// Where placed-order events are published.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventBusMode {
    /// Bounded in-process channel drained by an embedded shipping consumer.
    #[default]
    InProcess,
    /// POSTed as JSON to this endpoint.
    Http(String),
    /// Logged and dropped.
    Disabled,
}

impl EventBusMode {
    fn resolve(url: Option<String>, mode: Option<String>) -> Self {
        if let Some(url) = url {
            return EventBusMode::Http(url);
        }
        match mode.as_deref().map(|m| m.trim().to_ascii_lowercase()) {
            Some(m) if matches!(m.as_str(), "disabled" | "off" | "none") => {
                EventBusMode::Disabled
            }
            _ => EventBusMode::InProcess,
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: PostgreSQL URL; unset keeps orders in memory
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: `5`)
/// - `INVENTORY_SERVICE_URL`: remote inventory base URL; unset reads the local item table
/// - `INVENTORY_MODE`: `local` or `shadow` (default: `local`)
/// - `PAYMENT_SERVICE_URL`: payment base URL; unset approves every charge
/// - `EVENT_BUS_URL`: endpoint events are POSTed to; unset uses the in-process bus
/// - `EVENT_BUS`: `disabled` drops events instead of using the in-process bus
/// - `SHIPPING_DATABASE_URL`: PostgreSQL URL for the embedded consumer's shipments;
///   unset keeps them in memory
/// - `BUSINESS_ID`: storefront id put in every event (default: `"demo-store"`)
/// - `HTTP_TIMEOUT_SECS`: outbound HTTP timeout (default: `10`)
/// - `RECONCILE_INTERVAL_SECS`: run the reconciliation sweep this often
/// - `SEED_INVENTORY`: seed the demo catalog into an empty item table (default: `true`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub inventory_service_url: Option<String>,
    pub inventory_mode: InventoryMode,
    pub payment_service_url: Option<String>,
    pub event_bus: EventBusMode,
    pub shipping_database_url: Option<String>,
    pub business_id: String,
    pub http_timeout: Duration,
    pub reconcile_interval: Option<Duration>,
    pub seed_inventory: bool,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let url = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let secs = |key: &str| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
        };

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: url("DATABASE_URL"),
            max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.max_connections),
            inventory_service_url: url("INVENTORY_SERVICE_URL"),
            inventory_mode: lookup("INVENTORY_MODE")
                .and_then(|m| InventoryMode::parse(&m))
                .unwrap_or(defaults.inventory_mode),
            payment_service_url: url("PAYMENT_SERVICE_URL"),
            event_bus: EventBusMode::resolve(url("EVENT_BUS_URL"), lookup("EVENT_BUS")),
            shipping_database_url: url("SHIPPING_DATABASE_URL"),
            business_id: url("BUSINESS_ID").unwrap_or(defaults.business_id),
            http_timeout: secs("HTTP_TIMEOUT_SECS").unwrap_or(defaults.http_timeout),
            reconcile_interval: secs("RECONCILE_INTERVAL_SECS"),
            seed_inventory: lookup("SEED_INVENTORY")
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no"))
                .unwrap_or(defaults.seed_inventory),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            max_connections: 5,
            inventory_service_url: None,
            inventory_mode: InventoryMode::Local,
            payment_service_url: None,
            event_bus: EventBusMode::InProcess,
            shipping_database_url: None,
            business_id: "demo-store".to_string(),
            http_timeout: Duration::from_secs(10),
            reconcile_interval: None,
            seed_inventory: true,
        }
    }
}

//! Inventory lookup trait and its implementations.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::InventoryRecord;
use order_store::OrderStore;
use tokio::sync::RwLock;

use crate::error::{OrderError, Result};

const SERVICE: &str = "inventory";

/// Trait for reading the current inventory snapshot.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// Returns every item with its price and availability.
    ///
    /// A single read; an unreachable or failing service yields
    /// [`OrderError::UpstreamUnavailable`].
    async fn list_inventory(&self) -> Result<Vec<InventoryRecord>>;
}

#[async_trait]
impl<T: InventoryClient + ?Sized> InventoryClient for Arc<T> {
    async fn list_inventory(&self) -> Result<Vec<InventoryRecord>> {
        (**self).list_inventory().await
    }
}

/// Reads the inventory service over HTTP (`GET {base}/api/inventory`).
#[derive(Debug, Clone)]
pub struct HttpInventoryClient {
    client: reqwest::Client,
    url: String,
}

impl HttpInventoryClient {
    /// Creates a client for the service at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> std::result::Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates a client sharing an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/api/inventory", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl InventoryClient for HttpInventoryClient {
    #[tracing::instrument(skip(self), fields(url = %self.url))]
    async fn list_inventory(&self) -> Result<Vec<InventoryRecord>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| OrderError::upstream(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OrderError::upstream(
                SERVICE,
                format!("status {status}: {body}"),
            ));
        }

        response
            .json::<Vec<InventoryRecord>>()
            .await
            .map_err(|e| OrderError::upstream(SERVICE, e))
    }
}

/// Reads the local item table of an order store.
#[derive(Debug, Clone)]
pub struct StoreInventoryClient<S> {
    store: S,
}

impl<S: OrderStore> StoreInventoryClient<S> {
    /// Creates a client over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: OrderStore> InventoryClient for StoreInventoryClient<S> {
    async fn list_inventory(&self) -> Result<Vec<InventoryRecord>> {
        self.store
            .list_inventory()
            .await
            .map_err(|e| OrderError::upstream(SERVICE, e))
    }
}

#[derive(Debug, Default)]
struct InMemoryInventoryState {
    items: Vec<InventoryRecord>,
    fail_on_list: bool,
    calls: usize,
}

/// In-memory inventory for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryClient {
    state: Arc<RwLock<InMemoryInventoryState>>,
}

impl InMemoryInventoryClient {
    /// Creates an inventory holding `items`.
    pub fn new(items: Vec<InventoryRecord>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryInventoryState {
                items,
                ..Default::default()
            })),
        }
    }

    /// Replaces the snapshot.
    pub async fn set_items(&self, items: Vec<InventoryRecord>) {
        self.state.write().await.items = items;
    }

    /// Configures the client to fail on every following lookup.
    pub async fn set_fail_on_list(&self, fail: bool) {
        self.state.write().await.fail_on_list = fail;
    }

    /// Returns the number of lookups made.
    pub async fn call_count(&self) -> usize {
        self.state.read().await.calls
    }
}

#[async_trait]
impl InventoryClient for InMemoryInventoryClient {
    async fn list_inventory(&self) -> Result<Vec<InventoryRecord>> {
        let mut state = self.state.write().await;
        state.calls += 1;

        if state.fail_on_list {
            return Err(OrderError::upstream(SERVICE, "inventory lookup failed"));
        }
        Ok(state.items.clone())
    }
}

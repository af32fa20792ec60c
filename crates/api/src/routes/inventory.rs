//! Inventory snapshot endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domain::InventoryRecord;

use crate::error::ApiError;
use crate::routes::orders::AppState;

/// GET /inventory: returns the inventory snapshot orders are priced from.
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<InventoryRecord>>, ApiError> {
    Ok(Json(state.orchestrator.inventory().await?))
}

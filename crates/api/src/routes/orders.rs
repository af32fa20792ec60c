//! Order placement and lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{ItemNumber, OrderId};
use domain::{Money, OrderRequest, ShippingAddress};
use event_bus::EventPublisher;
use order_store::{OrderRecord, OrderStore};
use saga::{InventoryClient, OrderConfirmation, OrderOrchestrator, PaymentAuthorizer};
use serde::Serialize;

use crate::error::ApiError;

/// Orchestrator wired with runtime-selected collaborators.
pub type Orchestrator = OrderOrchestrator<
    Arc<dyn InventoryClient>,
    Arc<dyn PaymentAuthorizer>,
    Arc<dyn OrderStore>,
    Arc<dyn EventPublisher>,
>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub orchestrator: Orchestrator,
}

// -- Response types --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub status: String,
    pub payment_token: String,
    #[serde(with = "domain::money::decimal")]
    pub total_amount: Money,
    pub payment_info: PaymentInfoResponse,
    pub shipping_info: ShippingAddress,
    pub items: Vec<LineItemResponse>,
    pub created_at: DateTime<Utc>,
}

/// Card snapshot with the number masked and the CVV left out.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfoResponse {
    pub holder_name: String,
    pub card_num: String,
    pub exp_date: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemResponse {
    pub item_number: ItemNumber,
    pub item_name: String,
    pub quantity: u32,
    #[serde(with = "domain::money::decimal")]
    pub unit_price: Money,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        Self {
            id: order.id,
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            status: order.status,
            payment_token: order.payment_token,
            total_amount: order.total_amount,
            payment_info: PaymentInfoResponse {
                card_num: order.payment.masked_card_number(),
                holder_name: order.payment.holder_name,
                exp_date: order.payment.expiry,
            },
            shipping_info: order.shipping,
            items: order
                .line_items
                .into_iter()
                .map(|line| LineItemResponse {
                    item_number: line.item_number,
                    item_name: line.item_name,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                })
                .collect(),
            created_at: order.created_at,
        }
    }
}

// -- Handlers --

/// POST /orders: place an order.
#[tracing::instrument(skip(state, body))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderConfirmation>), ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let confirmation = state.orchestrator.create_order(request).await?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}

/// GET /orders/{id}: load a placed order.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state
        .orchestrator
        .get_order(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;

    Ok(Json(order.into()))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    id.parse::<i64>()
        .ok()
        .filter(|n| *n > 0)
        .map(OrderId::new)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid order id: {id}")))
}

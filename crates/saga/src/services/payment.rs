//! Payment authorization trait and its implementations.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::{Money, PaymentDetails};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{OrderError, Result};

/// Opaque reference to an authorized charge, issued by the payment service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentToken(String);

impl PaymentToken {
    /// Wraps a token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trait for authorizing a charge against a card.
///
/// Called exactly once per placement; implementations must not retry.
#[async_trait]
pub trait PaymentAuthorizer: Send + Sync {
    /// Authorizes `amount` on `card`, returning the payment token.
    async fn authorize(&self, amount: Money, card: &PaymentDetails) -> Result<PaymentToken>;
}

#[async_trait]
impl<T: PaymentAuthorizer + ?Sized> PaymentAuthorizer for Arc<T> {
    async fn authorize(&self, amount: Money, card: &PaymentDetails) -> Result<PaymentToken> {
        (**self).authorize(amount, card).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizeRequest<'a> {
    #[serde(with = "domain::money::decimal")]
    amount: Money,
    holder_name: &'a str,
    card_num: &'a str,
    exp_date: &'a str,
    cvv: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizeResponse {
    #[serde(default)]
    payment_token: Option<String>,
}

/// Authorizes payments over HTTP (`POST {base}/payment`).
#[derive(Debug, Clone)]
pub struct HttpPaymentAuthorizer {
    client: reqwest::Client,
    url: String,
}

impl HttpPaymentAuthorizer {
    /// Creates an authorizer for the service at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> std::result::Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates an authorizer sharing an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/payment", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl PaymentAuthorizer for HttpPaymentAuthorizer {
    #[tracing::instrument(skip(self, card), fields(url = %self.url, %amount))]
    async fn authorize(&self, amount: Money, card: &PaymentDetails) -> Result<PaymentToken> {
        let body = AuthorizeRequest {
            amount,
            holder_name: &card.holder_name,
            card_num: &card.card_number,
            exp_date: &card.expiry,
            cvv: &card.cvv,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| OrderError::upstream("payment", e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| OrderError::upstream("payment", e))?;

        if !status.is_success() {
            let reason = if text.trim().is_empty() {
                format!("status {status}")
            } else {
                text
            };
            return Err(OrderError::PaymentDeclined(reason));
        }

        let token = serde_json::from_str::<AuthorizeResponse>(&text)
            .ok()
            .and_then(|r| r.payment_token)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                OrderError::PaymentDeclined(
                    "Payment service did not return paymentToken".to_string(),
                )
            })?;

        Ok(PaymentToken::new(token))
    }
}

#[derive(Debug, Default)]
struct StubPaymentState {
    authorized: Vec<(PaymentToken, Money)>,
    next_id: u32,
    fail_on_authorize: bool,
    calls: usize,
}

/// Payment authorizer that approves every charge with `PAY-0001`, `PAY-0002`,
/// and so on. Used for tests and local runs without a payment service.
#[derive(Debug, Clone, Default)]
pub struct StubPaymentAuthorizer {
    state: Arc<RwLock<StubPaymentState>>,
}

impl StubPaymentAuthorizer {
    /// Creates a new stub authorizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the authorizer to decline every following charge.
    pub async fn set_fail_on_authorize(&self, fail: bool) {
        self.state.write().await.fail_on_authorize = fail;
    }

    /// Returns the number of authorize calls, declined ones included.
    pub async fn call_count(&self) -> usize {
        self.state.read().await.calls
    }

    /// Returns the amounts approved so far, in call order.
    pub async fn authorized_amounts(&self) -> Vec<Money> {
        self.state
            .read()
            .await
            .authorized
            .iter()
            .map(|(_, amount)| *amount)
            .collect()
    }
}

#[async_trait]
impl PaymentAuthorizer for StubPaymentAuthorizer {
    async fn authorize(&self, amount: Money, _card: &PaymentDetails) -> Result<PaymentToken> {
        let mut state = self.state.write().await;
        state.calls += 1;

        if state.fail_on_authorize {
            return Err(OrderError::PaymentDeclined("Card declined".to_string()));
        }

        state.next_id += 1;
        let token = PaymentToken::new(format!("PAY-{:04}", state.next_id));
        state.authorized.push((token.clone(), amount));
        Ok(token)
    }
}

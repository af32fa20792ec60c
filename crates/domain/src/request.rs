//! Incoming order requests and their validated form.
//!
//! The wire types are deliberately permissive: every field is optional so
//! that a missing value is reported by [`OrderRequest::validate`] with the
//! field's path, instead of surfacing as an opaque JSON parse error.
//! Client-supplied item names and prices are not part of the model at all.

use common::ItemNumber;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Order request as submitted by the storefront checkout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payment_info: Option<PaymentInfoRequest>,
    #[serde(default)]
    pub shipping_info: Option<ShippingInfoRequest>,
    #[serde(default)]
    pub items: Vec<LineItemRequest>,
}

/// Card fields as submitted.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfoRequest {
    #[serde(default)]
    pub holder_name: Option<String>,
    #[serde(default)]
    pub card_num: Option<String>,
    #[serde(default)]
    pub exp_date: Option<String>,
    #[serde(default)]
    pub cvv: Option<String>,
}

impl std::fmt::Debug for PaymentInfoRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentInfoRequest")
            .field("holder_name", &self.holder_name)
            .finish_non_exhaustive()
    }
}

/// Shipping address fields as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfoRequest {
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A requested line: only the item number and quantity are trusted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    #[serde(default)]
    pub item_number: Option<NumericInput>,
    #[serde(default)]
    pub quantity: Option<NumericInput>,
}

impl LineItemRequest {
    /// Convenience constructor for callers building requests in code.
    pub fn new(item_number: i64, quantity: i64) -> Self {
        Self {
            item_number: Some(NumericInput::Integer(item_number)),
            quantity: Some(NumericInput::Integer(quantity)),
        }
    }
}

/// A numeric field as it may arrive from a browser form: an integer, a
/// float, or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl NumericInput {
    /// Returns the value if it denotes a positive integer.
    pub fn positive_integer(&self) -> Option<i64> {
        let n = match self {
            NumericInput::Integer(n) => *n,
            NumericInput::Float(f) if f.is_finite() && f.fract() == 0.0 => *f as i64,
            NumericInput::Float(_) => return None,
            NumericInput::Text(s) => s.trim().parse::<i64>().ok()?,
        };
        (n > 0).then_some(n)
    }
}

/// Card details that passed validation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub holder_name: String,
    pub card_number: String,
    pub expiry: String,
    pub cvv: String,
}

impl PaymentDetails {
    /// Card number with everything but the last four digits masked.
    pub fn masked_card_number(&self) -> String {
        let digits: Vec<char> = self.card_number.chars().collect();
        let keep = digits.len().min(4);
        let masked = "*".repeat(digits.len() - keep);
        let tail: String = digits[digits.len() - keep..].iter().collect();
        format!("{masked}{tail}")
    }
}

impl std::fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentDetails")
            .field("holder_name", &self.holder_name)
            .field("card_number", &self.masked_card_number())
            .finish_non_exhaustive()
    }
}

/// Shipping address that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    pub email: Option<String>,
}

impl ShippingAddress {
    /// Formats the address on one line, e.g.
    /// `"1 Main St, Apt 2, Springfield, IL 62701, US"`.
    pub fn single_line(&self) -> String {
        let mut parts = vec![self.address1.clone()];
        if let Some(line2) = &self.address2 {
            parts.push(line2.clone());
        }
        parts.push(self.city.clone());
        parts.push(format!("{} {}", self.state, self.postal_code));
        parts.push(self.country.clone());
        parts.join(", ")
    }
}

/// A line request whose item number and quantity are positive integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRequest {
    pub item_number: ItemNumber,
    pub quantity: u32,
}

/// An order request that passed structural validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidOrder {
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub status: Option<String>,
    pub payment: PaymentDetails,
    pub shipping: ShippingAddress,
    pub lines: Vec<LineRequest>,
}

impl OrderRequest {
    /// Checks the request structurally and returns its typed form.
    ///
    /// Stops at the first violation. Checks run in a fixed order: customer
    /// name, items, payment fields, shipping fields.
    pub fn validate(self) -> Result<ValidOrder, ValidationError> {
        let customer_name = required(self.customer_name, "customerName")?;

        if self.items.is_empty() {
            return Err(ValidationError::NoItems);
        }
        let lines = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| validate_line(i, item))
            .collect::<Result<Vec<_>, _>>()?;

        let payment = self
            .payment_info
            .ok_or_else(|| ValidationError::required("paymentInfo"))?;
        let payment = PaymentDetails {
            holder_name: required(payment.holder_name, "paymentInfo.holderName")?,
            card_number: required(payment.card_num, "paymentInfo.cardNum")?,
            expiry: required(payment.exp_date, "paymentInfo.expDate")?,
            cvv: required(payment.cvv, "paymentInfo.cvv")?,
        };

        let shipping = self
            .shipping_info
            .ok_or_else(|| ValidationError::required("shippingInfo"))?;
        let shipping = ShippingAddress {
            address1: required(shipping.address1, "shippingInfo.address1")?,
            address2: optional(shipping.address2),
            city: required(shipping.city, "shippingInfo.city")?,
            state: required(shipping.state, "shippingInfo.state")?,
            country: required(shipping.country, "shippingInfo.country")?,
            postal_code: required(shipping.postal_code, "shippingInfo.postalCode")?,
            email: optional(shipping.email),
        };

        Ok(ValidOrder {
            customer_name,
            customer_email: optional(self.customer_email),
            status: optional(self.status),
            payment,
            shipping,
            lines,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, ValidationError> {
    optional(value).ok_or_else(|| ValidationError::required(field))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_line(index: usize, item: &LineItemRequest) -> Result<LineRequest, ValidationError> {
    let item_number = item
        .item_number
        .as_ref()
        .and_then(NumericInput::positive_integer)
        .ok_or_else(|| ValidationError::not_positive(format!("items[{index}].itemNumber")))?;
    let quantity = item
        .quantity
        .as_ref()
        .and_then(NumericInput::positive_integer)
        .and_then(|q| u32::try_from(q).ok())
        .ok_or_else(|| ValidationError::not_positive(format!("items[{index}].quantity")))?;

    Ok(LineRequest {
        item_number: ItemNumber::new(item_number),
        quantity,
    })
}

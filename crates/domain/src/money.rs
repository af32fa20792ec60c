//! Money represented in integer cents.

use serde::{Deserialize, Serialize};

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a Money amount from a decimal currency value, rounding to the
    /// nearest cent.
    pub fn from_decimal(amount: f64) -> Self {
        Self {
            cents: (amount * 100.0).round() as i64,
        }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the amount as a decimal currency value (e.g. `1999.98`).
    pub fn as_decimal(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Price of `quantity` units at this unit price.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * i64::from(quantity),
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Serde adapter that reads and writes [`Money`] as a decimal number.
///
/// Inventory and payment services speak decimal currency (`999.99`); some
/// inventory gateways send the price as a string, which is accepted too.
///
/// ```ignore
/// #[serde(with = "domain::money::decimal")]
/// unit_price: Money,
/// ```
pub mod decimal {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Money;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(money.as_decimal())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let value = match Amount::deserialize(deserializer)? {
            Amount::Number(n) => n,
            Amount::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| D::Error::custom(format!("invalid amount {s:?}: {e}")))?,
        };
        if !value.is_finite() {
            return Err(D::Error::custom("amount must be a finite number"));
        }
        if value < 0.0 {
            return Err(D::Error::custom(format!("amount must not be negative: {value}")));
        }
        Ok(Money::from_decimal(value))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Priced {
        #[serde(with = "decimal")]
        price: Money,
    }

    #[test]
    fn test_money_from_decimal_rounds_to_cent() {
        assert_eq!(Money::from_decimal(999.99).cents(), 99999);
        assert_eq!(Money::from_decimal(29.99).cents(), 2999);
        assert_eq!(Money::from_decimal(0.1 + 0.2).cents(), 30);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "$12.34");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-$12.34");
    }

    #[test]
    fn test_money_sum_and_multiply() {
        let total: Money = [Money::from_cents(99999).multiply(2), Money::from_cents(2999)]
            .into_iter()
            .sum();
        assert_eq!(total.cents(), 202997);
    }

    #[test]
    fn test_decimal_serializes_as_number() {
        let json = serde_json::to_string(&Priced {
            price: Money::from_cents(199998),
        })
        .unwrap();
        assert_eq!(json, r#"{"price":1999.98}"#);
    }

    #[test]
    fn test_decimal_accepts_numeric_strings() {
        let p: Priced = serde_json::from_str(r#"{"price":"349.99"}"#).unwrap();
        assert_eq!(p.price.cents(), 34999);
    }

    #[test]
    fn test_decimal_rejects_negative_amounts() {
        assert!(serde_json::from_str::<Priced>(r#"{"price":-0.01}"#).is_err());
        assert!(serde_json::from_str::<Priced>(r#"{"price":"-349.99"}"#).is_err());
        let free: Priced = serde_json::from_str(r#"{"price":0}"#).unwrap();
        assert_eq!(free.price.cents(), 0);
    }

    #[test]
    fn test_decimal_rejects_garbage() {
        assert!(serde_json::from_str::<Priced>(r#"{"price":"cheap"}"#).is_err());
    }
}

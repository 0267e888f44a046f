//! Represents a customer order as stored in the `orders` table.
//!
//! Orders are created by the customer-facing app and only ever observed here,
//! either through the initial bulk fetch or through the change feed. The seller
//! moves an order out of [`OrderStatus::Pending`] exactly once.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::Display;
use std::str::FromStr;
use tracing::warn;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// The first eight characters, as shown on cards and in notifications.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type-safe identifier for Sellers (the authenticated user id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SellerId(pub String);

impl From<&str> for SellerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SellerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for SellerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of an order.
///
/// `Pending` is the only status a seller can act on; the other three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    #[serde(rename = "Not Available")]
    NotAvailable,
    #[serde(rename = "Late Delivery")]
    LateDelivery,
}

impl OrderStatus {
    /// Targets offered to the seller on a pending card, in display order.
    pub const SELLER_ACTIONS: [OrderStatus; 3] = [
        OrderStatus::NotAvailable,
        OrderStatus::LateDelivery,
        OrderStatus::Confirmed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::NotAvailable => "Not Available",
            OrderStatus::LateDelivery => "Late Delivery",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Confirmed" => Ok(OrderStatus::Confirmed),
            "Not Available" => Ok(OrderStatus::NotAvailable),
            "Late Delivery" => Ok(OrderStatus::LateDelivery),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// One line of a structured order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
}

impl LineItem {
    pub fn new(name: impl Into<String>, quantity: u32, price: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity,
            price,
        }
    }

    /// `price * quantity`, or `None` when the product does not fit in a `Decimal`.
    pub fn subtotal(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// The `order_details` column, classified once when the row is decoded.
///
/// Newer customer apps write `{"items": [{name, quantity, price}, ...]}`, older
/// ones wrote a free-form string. Anything else is kept as `Unknown` so the card
/// can still be rendered.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OrderDetails {
    Items(Vec<LineItem>),
    RawText(String),
    #[default]
    Unknown,
}

impl OrderDetails {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => OrderDetails::RawText(text),
            Value::Object(mut fields) => match fields.remove("items") {
                Some(items @ Value::Array(_)) => match serde_json::from_value(items) {
                    Ok(items) => OrderDetails::Items(items),
                    Err(e) => {
                        warn!(error = %e, "Unreadable order items");
                        OrderDetails::Unknown
                    }
                },
                _ => OrderDetails::Unknown,
            },
            _ => OrderDetails::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for OrderDetails {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(OrderDetails::from_value)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub seller_id: SellerId,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_contact: Option<String>,
    #[serde(default)]
    pub order_details: OrderDetails,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Creates an order with no customer or item details, received now.
    pub fn new(
        id: impl Into<OrderId>,
        seller_id: impl Into<SellerId>,
        total_amount: Decimal,
        status: OrderStatus,
    ) -> Self {
        Self {
            id: id.into(),
            seller_id: seller_id.into(),
            customer_name: None,
            customer_contact: None,
            order_details: OrderDetails::Unknown,
            total_amount,
            status,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn with_customer(mut self, name: impl Into<String>, contact: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self.customer_contact = Some(contact.into());
        self
    }

    pub fn with_details(mut self, details: OrderDetails) -> Self {
        self.order_details = details;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn apply(&mut self, patch: &OrderPatch) {
        self.status = patch.status;
        self.updated_at = Some(patch.updated_at);
    }
}

/// Fields written by a seller action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPatch {
    pub status: OrderStatus,
    pub updated_at: DateTime<Utc>,
}

impl OrderPatch {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status,
            updated_at: Utc::now(),
        }
    }
}

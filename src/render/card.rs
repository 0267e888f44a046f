//! Pure projection of an [`Order`] into the card shown on the board.

use crate::model::{Order, OrderDetails, OrderId, OrderStatus};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Display;
use tracing::warn;

pub const DETAILS_FALLBACK: &str = "Details not available in expected format.";
pub const ACTIONED_TEXT: &str = "Order actioned.";
const NOT_PROVIDED: &str = "N/A";

/// A seller action offered on a pending card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionButton {
    pub label: &'static str,
    pub target: OrderStatus,
}

const PENDING_ACTIONS: [ActionButton; 3] = [
    ActionButton {
        label: "❌ Not Available",
        target: OrderStatus::NotAvailable,
    },
    ActionButton {
        label: "⏳ Late Delivery",
        target: OrderStatus::LateDelivery,
    },
    ActionButton {
        label: "✅ Confirm Order",
        target: OrderStatus::Confirmed,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardActions {
    Pending(Vec<ActionButton>),
    Actioned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCard {
    pub order_id: OrderId,
    pub short_id: String,
    pub customer: String,
    pub contact: String,
    pub lines: Vec<String>,
    pub total: String,
    pub status: OrderStatus,
    pub received: String,
    pub actions: CardActions,
}

impl OrderCard {
    pub fn buttons(&self) -> &[ActionButton] {
        match &self.actions {
            CardActions::Pending(buttons) => buttons,
            CardActions::Actioned => &[],
        }
    }

    pub fn is_actioned(&self) -> bool {
        matches!(self.actions, CardActions::Actioned)
    }
}

impl Display for OrderCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Order #{}", self.short_id)?;
        writeln!(f, "  Customer: {} ({})", self.customer, self.contact)?;
        for line in &self.lines {
            writeln!(f, "  - {line}")?;
        }
        writeln!(f, "  Total: {}", self.total)?;
        writeln!(f, "  Status: {}", self.status)?;
        writeln!(f, "  Received: {}", self.received)?;
        match &self.actions {
            CardActions::Pending(buttons) => {
                let labels: Vec<&str> = buttons.iter().map(|b| b.label).collect();
                write!(f, "  [{}]", labels.join("] ["))
            }
            CardActions::Actioned => write!(f, "  {ACTIONED_TEXT}"),
        }
    }
}

/// Formats a rupee amount with exactly two decimals, rounding half away from zero.
pub fn format_rupees(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    format!("₹{rounded}")
}

fn detail_lines(details: &OrderDetails) -> Vec<String> {
    match details {
        OrderDetails::Items(items) => items
            .iter()
            .map(|item| match item.subtotal() {
                Some(subtotal) => format!("{} (Qty: {}) - {}", item.name, item.quantity, format_rupees(subtotal)),
                None => {
                    warn!(item = %item.name, quantity = item.quantity, price = %item.price, "Line subtotal overflowed");
                    DETAILS_FALLBACK.to_string()
                }
            })
            .collect(),
        OrderDetails::RawText(text) => vec![text.clone()],
        OrderDetails::Unknown => vec![DETAILS_FALLBACK.to_string()],
    }
}

/// Builds the card for `order`. Same order in, same card out.
pub fn render_order(order: &Order) -> OrderCard {
    let actions = if order.status == OrderStatus::Pending {
        CardActions::Pending(PENDING_ACTIONS.to_vec())
    } else {
        CardActions::Actioned
    };

    OrderCard {
        order_id: order.id.clone(),
        short_id: order.id.short().to_string(),
        customer: order.customer_name.clone().unwrap_or_else(|| NOT_PROVIDED.to_string()),
        contact: order
            .customer_contact
            .clone()
            .unwrap_or_else(|| NOT_PROVIDED.to_string()),
        lines: detail_lines(&order.order_details),
        total: format_rupees(order.total_amount),
        status: order.status,
        received: order.created_at.format("%d/%m/%Y, %H:%M:%S").to_string(),
        actions,
    }
}

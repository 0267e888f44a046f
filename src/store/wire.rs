//! Wire types for the platform's realtime messages.
//!
//! Row changes arrive as
//! `{"eventType": "INSERT" | "UPDATE" | "DELETE", "new": {...}, "old": {...}}`.
//! Deletes only carry the primary key in `old`; inserts and updates carry the
//! full row in `new`. Channel lifecycle is reported as a bare status string.

use crate::model::{Order, OrderId};
use crate::store::{ChangeEvent, FeedStatus, StoreError};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Raw row-change payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RowChange {
    #[serde(rename = "eventType")]
    pub event_type: ChangeKind,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub new: Value,
    #[serde(default)]
    pub old: Value,
}

#[derive(Debug, Deserialize)]
struct RowKey {
    id: OrderId,
}

impl TryFrom<RowChange> for ChangeEvent {
    type Error = StoreError;

    fn try_from(change: RowChange) -> Result<Self, Self::Error> {
        match change.event_type {
            ChangeKind::Insert => Ok(ChangeEvent::Insert(serde_json::from_value::<Order>(change.new)?)),
            ChangeKind::Update => Ok(ChangeEvent::Update(serde_json::from_value::<Order>(change.new)?)),
            ChangeKind::Delete => {
                let key: RowKey = serde_json::from_value(change.old)?;
                Ok(ChangeEvent::Delete { id: key.id })
            }
        }
    }
}

/// Decodes one row-change payload.
pub fn decode_change(payload: &str) -> Result<ChangeEvent, StoreError> {
    let change: RowChange = serde_json::from_str(payload)?;
    change.try_into()
}

impl FeedStatus {
    /// Maps a channel status string; `detail` is the accompanying error, if any.
    ///
    /// Returns `None` for intermediate states the reconciler does not act on.
    pub fn from_wire(status: &str, detail: Option<String>) -> Option<Self> {
        match status {
            "SUBSCRIBED" => Some(FeedStatus::Subscribed),
            "TIMED_OUT" => Some(FeedStatus::TimedOut),
            "CHANNEL_ERROR" => Some(FeedStatus::ChannelError(
                detail.unwrap_or_else(|| "unknown error".to_string()),
            )),
            "CLOSED" => Some(FeedStatus::Closed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OrderDetails, OrderStatus};
    use serde_json::json;

    fn row(status: &str) -> Value {
        json!({
            "id": "abc123456789",
            "seller_id": "seller_1",
            "order_details": {"items": [{"name": "Pani Puri", "quantity": 1, "price": "40.00"}]},
            "total_amount": "40.00",
            "status": status,
            "created_at": "2024-06-01T10:00:00Z"
        })
    }

    #[test]
    fn test_decode_insert() {
        let payload = json!({"eventType": "INSERT", "table": "orders", "new": row("Pending"), "old": {}});
        let event = decode_change(&payload.to_string()).unwrap();

        let ChangeEvent::Insert(order) = event else {
            panic!("expected insert, got {event:?}");
        };
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(matches!(order.order_details, OrderDetails::Items(ref items) if items.len() == 1));
    }

    #[test]
    fn test_decode_update() {
        let payload = json!({"eventType": "UPDATE", "new": row("Late Delivery"), "old": {"id": "abc123456789"}});
        let event = decode_change(&payload.to_string()).unwrap();
        assert!(matches!(event, ChangeEvent::Update(ref order) if order.status == OrderStatus::LateDelivery));
    }

    #[test]
    fn test_decode_delete_uses_primary_key_only() {
        let payload = json!({"eventType": "DELETE", "new": {}, "old": {"id": "abc123456789"}});
        let event = decode_change(&payload.to_string()).unwrap();
        assert_eq!(event, ChangeEvent::Delete { id: OrderId::from("abc123456789") });
    }

    #[test]
    fn test_decode_rejects_unknown_status() {
        let payload = json!({"eventType": "INSERT", "new": row("Shipped")});
        assert!(matches!(decode_change(&payload.to_string()), Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(FeedStatus::from_wire("SUBSCRIBED", None), Some(FeedStatus::Subscribed));
        assert_eq!(
            FeedStatus::from_wire("CHANNEL_ERROR", Some("jwt expired".into())),
            Some(FeedStatus::ChannelError("jwt expired".into()))
        );
        assert_eq!(FeedStatus::from_wire("JOINING", None), None);
    }
}

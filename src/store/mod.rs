//! # Persistent Store Seams
//!
//! The hosted backend is consumed through two traits:
//!
//! - [`OrderStore`]: request/response access to the `orders` table (bulk read, conditional update).
//! - [`ChangeFeed`]: the push subscription that delivers row-level insert/update/delete events.
//!
//! Both are scoped by seller on the server side. A subscription yields a
//! [`FeedSubscription`]: a handle used to unsubscribe plus an ordered stream of
//! [`FeedMessage`]s. The first message is normally the acknowledgement
//! ([`FeedStatus::Subscribed`]); a timeout, channel error or close is reported the same way.
//!
//! Implementations shipped here:
//! - [`memory::MemoryBackend`]: an in-process table used by the demo binary and end-to-end tests.
//! - [`mock`]: expectation-driven doubles for testing the reconciler in isolation.

pub mod error;
pub mod memory;
pub mod mock;
pub mod wire;

pub use error::StoreError;
pub use memory::MemoryBackend;

use crate::model::{Order, OrderId, OrderPatch, SellerId};
use async_trait::async_trait;
use std::fmt::Display;
use tokio::sync::mpsc;

/// Table every query and subscription is scoped to.
pub const ORDERS_TABLE: &str = "orders";

/// Opaque token identifying one change-feed subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedHandle(pub u64);

impl Display for FeedHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "feed_{}", self.0)
    }
}

/// Server-side filter for a subscription: all events on one table for one seller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedFilter {
    pub table: &'static str,
    pub seller_id: SellerId,
}

impl FeedFilter {
    pub fn seller(seller_id: SellerId) -> Self {
        Self {
            table: ORDERS_TABLE,
            seller_id,
        }
    }

    pub fn matches(&self, seller_id: &SellerId) -> bool {
        &self.seller_id == seller_id
    }
}

impl Display for FeedFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:seller_id=eq.{}", self.table, self.seller_id)
    }
}

/// A row-level change on the orders table.
///
/// Deletes only carry the primary key.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    Insert(Order),
    Update(Order),
    Delete { id: OrderId },
}

impl ChangeEvent {
    pub fn order_id(&self) -> &OrderId {
        match self {
            ChangeEvent::Insert(order) | ChangeEvent::Update(order) => &order.id,
            ChangeEvent::Delete { id } => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChangeEvent::Insert(_) => "INSERT",
            ChangeEvent::Update(_) => "UPDATE",
            ChangeEvent::Delete { .. } => "DELETE",
        }
    }
}

/// Lifecycle notifications of a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    Subscribed,
    TimedOut,
    ChannelError(String),
    Closed,
}

/// Everything a subscription can deliver, in delivery order.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    Status(FeedStatus),
    Change(ChangeEvent),
}

/// A live subscription. Dropping `messages` stops delivery locally; call
/// [`ChangeFeed::unsubscribe`] to release the server side too.
#[derive(Debug)]
pub struct FeedSubscription {
    pub handle: FeedHandle,
    pub messages: mpsc::UnboundedReceiver<FeedMessage>,
}

/// Request/response access to the orders table.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Up to `limit` orders of `seller_id`, newest first.
    async fn list_orders(&self, seller_id: &SellerId, limit: usize) -> Result<Vec<Order>, StoreError>;

    /// Applies `patch` to the row matching both `order_id` and `seller_id`.
    ///
    /// Returns `Ok(None)` when no row matched (unknown order, or owned by another seller).
    async fn update_order(
        &self,
        order_id: &OrderId,
        seller_id: &SellerId,
        patch: OrderPatch,
    ) -> Result<Option<Order>, StoreError>;
}

/// Push subscription to row changes.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    async fn subscribe(&self, filter: FeedFilter) -> Result<FeedSubscription, StoreError>;

    /// Releases the subscription. Unknown handles are ignored.
    async fn unsubscribe(&self, handle: FeedHandle);
}

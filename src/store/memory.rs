//! In-process orders table with a live change feed.
//!
//! [`MemoryBackend`] implements both [`OrderStore`] and [`ChangeFeed`] over a single
//! locked table, so every write is visible to queries and pushed to matching
//! subscribers in the same critical section. The demo binary and the end-to-end tests
//! use it in place of the hosted backend; [`MemoryBackend::insert_order`] and
//! [`MemoryBackend::delete_order`] stand in for the customer app.

use crate::model::{Order, OrderId, OrderPatch, SellerId};
use crate::store::{
    wire, ChangeEvent, ChangeFeed, FeedFilter, FeedHandle, FeedMessage, FeedStatus, FeedSubscription, OrderStore,
    StoreError,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

struct Subscriber {
    filter: FeedFilter,
    sender: mpsc::UnboundedSender<FeedMessage>,
}

#[derive(Default)]
struct Table {
    rows: Vec<Order>,
    subscribers: HashMap<FeedHandle, Subscriber>,
    next_handle: u64,
}

impl Table {
    fn publish(&mut self, seller_id: &SellerId, event: ChangeEvent) {
        // Receivers that went away are pruned here.
        self.subscribers.retain(|handle, subscriber| {
            if !subscriber.filter.matches(seller_id) {
                return true;
            }
            let delivered = subscriber.sender.send(FeedMessage::Change(event.clone())).is_ok();
            if !delivered {
                trace!(%handle, "Dropping closed subscriber");
            }
            delivered
        });
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    table: Mutex<Table>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let backend = Self::new();
        backend.table.lock().rows.extend(orders);
        backend
    }

    /// Adds a row and publishes an insert event, as the customer app would.
    pub fn insert_order(&self, order: Order) {
        let mut table = self.table.lock();
        debug!(order_id = %order.id, seller_id = %order.seller_id, "Row inserted");
        table.rows.push(order.clone());
        let seller_id = order.seller_id.clone();
        table.publish(&seller_id, ChangeEvent::Insert(order));
    }

    /// Removes a row and publishes a delete event carrying only its id.
    pub fn delete_order(&self, order_id: &OrderId) -> Option<Order> {
        let mut table = self.table.lock();
        let index = table.rows.iter().position(|row| &row.id == order_id)?;
        let removed = table.rows.remove(index);
        debug!(%order_id, "Row deleted");
        table.publish(&removed.seller_id, ChangeEvent::Delete { id: removed.id.clone() });
        Some(removed)
    }

    /// Publishes a raw row-change payload to `seller_id`'s subscribers, as the
    /// realtime socket would. Malformed payloads are skipped.
    ///
    /// Only the feed sees the change; the table is left as it is.
    pub fn deliver_payload(&self, seller_id: &SellerId, payload: &str) -> bool {
        match wire::decode_change(payload) {
            Ok(event) => {
                self.table.lock().publish(seller_id, event);
                true
            }
            Err(e) => {
                warn!(%seller_id, error = %e, "Skipping malformed change payload");
                false
            }
        }
    }

    pub fn order(&self, order_id: &OrderId) -> Option<Order> {
        self.table.lock().rows.iter().find(|row| &row.id == order_id).cloned()
    }

    pub fn subscriber_count(&self) -> usize {
        self.table.lock().subscribers.len()
    }

    /// Reports `status` on every open subscription and drops them all, as when the
    /// realtime connection is lost.
    pub fn close_feeds(&self, status: FeedStatus) {
        let mut table = self.table.lock();
        for (handle, subscriber) in table.subscribers.drain() {
            debug!(%handle, ?status, "Closing subscription");
            let _ = subscriber.sender.send(FeedMessage::Status(status.clone()));
        }
    }
}

#[async_trait]
impl OrderStore for MemoryBackend {
    async fn list_orders(&self, seller_id: &SellerId, limit: usize) -> Result<Vec<Order>, StoreError> {
        let table = self.table.lock();
        let mut orders: Vec<Order> = table
            .rows
            .iter()
            .filter(|row| &row.seller_id == seller_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders.truncate(limit);
        Ok(orders)
    }

    async fn update_order(
        &self,
        order_id: &OrderId,
        seller_id: &SellerId,
        patch: OrderPatch,
    ) -> Result<Option<Order>, StoreError> {
        let mut table = self.table.lock();
        let Some(row) = table
            .rows
            .iter_mut()
            .find(|row| &row.id == order_id && &row.seller_id == seller_id)
        else {
            debug!(%order_id, %seller_id, "Update matched no rows");
            return Ok(None);
        };
        row.apply(&patch);
        let updated = row.clone();
        table.publish(seller_id, ChangeEvent::Update(updated.clone()));
        Ok(Some(updated))
    }
}

#[async_trait]
impl ChangeFeed for MemoryBackend {
    async fn subscribe(&self, filter: FeedFilter) -> Result<FeedSubscription, StoreError> {
        let mut table = self.table.lock();
        table.next_handle += 1;
        let handle = FeedHandle(table.next_handle);
        let (sender, messages) = mpsc::unbounded_channel();
        let _ = sender.send(FeedMessage::Status(FeedStatus::Subscribed));
        debug!(%handle, %filter, "Subscription opened");
        table.subscribers.insert(handle, Subscriber { filter, sender });
        Ok(FeedSubscription { handle, messages })
    }

    async fn unsubscribe(&self, handle: FeedHandle) {
        if self.table.lock().subscribers.remove(&handle).is_some() {
            debug!(%handle, "Subscription closed");
        }
    }
}

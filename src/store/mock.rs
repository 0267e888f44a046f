//! # Mock Backend
//!
//! Test doubles for driving the reconciler without a backend.
//!
//! [`MockOrderStore`] answers calls from a queue of expectations, set up with a fluent
//! builder and checked with [`MockOrderStore::verify`]:
//!
//! ```ignore
//! let store = Arc::new(MockOrderStore::new());
//! store.expect_list("seller_1").return_ok(vec![order]);
//! store.expect_update("order_1").return_ok(None); // zero rows affected
//!
//! // ... exercise the reconciler ...
//! store.verify(); // all expectations consumed
//! ```
//!
//! [`MockChangeFeed`] never acknowledges on its own; the test scripts every status and
//! change through [`MockChangeFeed::push`].

use crate::model::{Order, OrderId, OrderPatch, SellerId};
use crate::store::{ChangeFeed, FeedFilter, FeedHandle, FeedMessage, FeedSubscription, OrderStore, StoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;

// =============================================================================
// ORDER STORE
// =============================================================================

enum Expectation {
    List {
        seller_id: SellerId,
        response: Result<Vec<Order>, StoreError>,
    },
    Update {
        order_id: OrderId,
        response: Result<Option<Order>, StoreError>,
    },
}

impl Expectation {
    fn describe(&self) -> String {
        match self {
            Expectation::List { seller_id, .. } => format!("list_orders({seller_id})"),
            Expectation::Update { order_id, .. } => format!("update_order({order_id})"),
        }
    }
}

/// A call received by [`MockOrderStore`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    List {
        seller_id: SellerId,
        limit: usize,
    },
    Update {
        order_id: OrderId,
        seller_id: SellerId,
        patch: OrderPatch,
    },
}

#[derive(Default)]
pub struct MockOrderStore {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    calls: Mutex<Vec<StoreCall>>,
}

impl MockOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `list_orders` call for `seller_id`.
    pub fn expect_list(&self, seller_id: impl Into<SellerId>) -> ListExpectationBuilder {
        ListExpectationBuilder {
            seller_id: seller_id.into(),
            expectations: self.expectations.clone(),
        }
    }

    /// Expects an `update_order` call for `order_id`.
    pub fn expect_update(&self, order_id: impl Into<OrderId>) -> UpdateExpectationBuilder {
        UpdateExpectationBuilder {
            order_id: order_id.into(),
            expectations: self.expectations.clone(),
        }
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    /// Panics if any expectation was not consumed.
    pub fn verify(&self) {
        let exps = self.expectations.lock();
        if !exps.is_empty() {
            let remaining: Vec<String> = exps.iter().map(Expectation::describe).collect();
            panic!("Not all expectations were met. Remaining: {remaining:?}");
        }
    }

    fn next_expectation(&self) -> Option<Expectation> {
        self.expectations.lock().pop_front()
    }
}

#[async_trait]
impl OrderStore for MockOrderStore {
    async fn list_orders(&self, seller_id: &SellerId, limit: usize) -> Result<Vec<Order>, StoreError> {
        self.calls.lock().push(StoreCall::List {
            seller_id: seller_id.clone(),
            limit,
        });
        match self.next_expectation() {
            Some(Expectation::List { seller_id: expected, response }) => {
                assert_eq!(&expected, seller_id, "list_orders called for unexpected seller");
                response
            }
            other => panic!(
                "Unexpected list_orders({seller_id}); next expectation: {:?}",
                other.as_ref().map(Expectation::describe)
            ),
        }
    }

    async fn update_order(
        &self,
        order_id: &OrderId,
        seller_id: &SellerId,
        patch: OrderPatch,
    ) -> Result<Option<Order>, StoreError> {
        self.calls.lock().push(StoreCall::Update {
            order_id: order_id.clone(),
            seller_id: seller_id.clone(),
            patch,
        });
        match self.next_expectation() {
            Some(Expectation::Update { order_id: expected, response }) => {
                assert_eq!(&expected, order_id, "update_order called for unexpected order");
                response
            }
            other => panic!(
                "Unexpected update_order({order_id}); next expectation: {:?}",
                other.as_ref().map(Expectation::describe)
            ),
        }
    }
}

/// Builder for `list_orders` expectations.
pub struct ListExpectationBuilder {
    seller_id: SellerId,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl ListExpectationBuilder {
    pub fn return_ok(self, orders: Vec<Order>) {
        self.expectations.lock().push_back(Expectation::List {
            seller_id: self.seller_id,
            response: Ok(orders),
        });
    }

    pub fn return_err(self, error: StoreError) {
        self.expectations.lock().push_back(Expectation::List {
            seller_id: self.seller_id,
            response: Err(error),
        });
    }
}

/// Builder for `update_order` expectations.
pub struct UpdateExpectationBuilder {
    order_id: OrderId,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl UpdateExpectationBuilder {
    /// `None` simulates an update that matched zero rows.
    pub fn return_ok(self, row: Option<Order>) {
        self.expectations.lock().push_back(Expectation::Update {
            order_id: self.order_id,
            response: Ok(row),
        });
    }

    pub fn return_err(self, error: StoreError) {
        self.expectations.lock().push_back(Expectation::Update {
            order_id: self.order_id,
            response: Err(error),
        });
    }
}

// =============================================================================
// CHANGE FEED
// =============================================================================

#[derive(Default)]
struct FeedScript {
    next_handle: u64,
    open: Vec<(FeedHandle, FeedFilter, mpsc::UnboundedSender<FeedMessage>)>,
    unsubscribed: Vec<FeedHandle>,
    fail_next: Option<StoreError>,
}

/// Scripted [`ChangeFeed`]. Senders of closed subscriptions are kept so a test can
/// deliver "late" messages after an unsubscribe.
#[derive(Default)]
pub struct MockChangeFeed {
    script: Mutex<FeedScript>,
}

impl MockChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `subscribe` call fail with `error`.
    pub fn fail_next_subscribe(&self, error: StoreError) {
        self.script.lock().fail_next = Some(error);
    }

    /// Delivers `message` on subscription `handle`. Returns `false` once the consumer
    /// side of that subscription is gone.
    pub fn push(&self, handle: FeedHandle, message: FeedMessage) -> bool {
        let script = self.script.lock();
        script
            .open
            .iter()
            .find(|(h, _, _)| *h == handle)
            .is_some_and(|(_, _, sender)| sender.send(message).is_ok())
    }

    /// Handle of the most recent subscription.
    pub fn latest(&self) -> Option<FeedHandle> {
        self.script.lock().open.last().map(|(handle, _, _)| *handle)
    }

    pub fn subscriptions(&self) -> Vec<(FeedHandle, FeedFilter)> {
        self.script
            .lock()
            .open
            .iter()
            .map(|(handle, filter, _)| (*handle, filter.clone()))
            .collect()
    }

    pub fn unsubscribed(&self) -> Vec<FeedHandle> {
        self.script.lock().unsubscribed.clone()
    }
}

#[async_trait]
impl ChangeFeed for MockChangeFeed {
    async fn subscribe(&self, filter: FeedFilter) -> Result<FeedSubscription, StoreError> {
        let mut script = self.script.lock();
        if let Some(error) = script.fail_next.take() {
            return Err(error);
        }
        script.next_handle += 1;
        let handle = FeedHandle(script.next_handle);
        let (sender, messages) = mpsc::unbounded_channel();
        script.open.push((handle, filter, sender));
        Ok(FeedSubscription { handle, messages })
    }

    async fn unsubscribe(&self, handle: FeedHandle) {
        self.script.lock().unsubscribed.push(handle);
    }
}

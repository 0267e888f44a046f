use crate::model::{Order, OrderId, OrderStatus, SellerId};
use crate::reconciler::ReconcilerError;
use crate::render::OrderCard;
use crate::session::SessionContext;
use crate::store::{FeedMessage, FeedStatus};
use std::sync::Arc;
use tokio::sync::oneshot;

pub type Response<T> = oneshot::Sender<Result<T, ReconcilerError>>;

/// Requests accepted by [`OrderReconciler`](crate::reconciler::OrderReconciler).
#[derive(Debug)]
pub enum ReconcilerRequest {
    /// Replace any current subscription with one for `session`'s seller.
    Start {
        session: Option<Arc<SessionContext>>,
        respond_to: Response<()>,
    },
    Stop {
        respond_to: oneshot::Sender<()>,
    },
    UpdateStatus {
        order_id: OrderId,
        status: OrderStatus,
        respond_to: Response<Order>,
    },
    Snapshot {
        respond_to: oneshot::Sender<ReconcilerSnapshot>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionState {
    Unsubscribed,
    /// Subscribe call made, acknowledgement not seen yet.
    Subscribing,
    Active,
    Failed(FeedStatus),
}

/// Point-in-time copy of the reconciler's state.
#[derive(Debug, Clone)]
pub struct ReconcilerSnapshot {
    pub state: SubscriptionState,
    pub seller_id: Option<SellerId>,
    pub cards: Vec<OrderCard>,
}

impl ReconcilerSnapshot {
    pub fn card_ids(&self) -> Vec<&str> {
        self.cards.iter().map(|card| card.order_id.0.as_str()).collect()
    }
}

/// A feed message stamped with the generation of the subscription that produced it.
#[derive(Debug)]
pub(crate) struct TaggedFeedMessage {
    pub generation: u64,
    pub message: FeedMessage,
}

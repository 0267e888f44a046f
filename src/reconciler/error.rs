use crate::model::{OrderId, OrderStatus};
use crate::store::StoreError;
use thiserror::Error;

/// Errors surfaced by the order reconciler and its client.
#[derive(Debug, Error)]
pub enum ReconcilerError {
    /// No seller identity is loaded, so nothing can be scoped to a seller.
    #[error("Seller profile not loaded")]
    MissingSeller,

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The conditional update matched no row (unknown id or another seller's order).
    #[error("Order {0} not found for this seller")]
    OrderNotFound(OrderId),

    #[error("Could not subscribe to orders: {0}")]
    Subscribe(#[source] StoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Reconciler closed")]
    ActorClosed,

    #[error("Reconciler dropped the response channel")]
    ActorDropped,
}

impl ReconcilerError {
    /// Text shown to the seller when an action fails.
    pub fn user_message(&self) -> String {
        match self {
            ReconcilerError::MissingSeller => "Profile not available. Cannot update order.".to_string(),
            other => format!("Error: {other}"),
        }
    }
}

//! # Order Reconciler
//!
//! The single owner of the seller's order board. It keeps the board equal to the
//! newest known version of every order received from the bulk fetch or the change
//! feed, and performs seller status transitions.
//!
//! ## Lifecycle
//!
//! ```text
//! Unsubscribed --start--> Subscribing --ack--> Active
//!                              |                  |
//!                              +--error/timeout---+--> Failed
//! (any) --stop/start--> Unsubscribed
//! ```
//!
//! The bulk fetch only runs after the subscription is acknowledged, so no insert can
//! fall between the snapshot and the live stream. Inserts may still duplicate rows
//! from the snapshot; the board de-duplicates by order id.
//!
//! ## Usage
//!
//! ```ignore
//! let (actor, client) = reconciler::new(32);
//! tokio::spawn(actor.run(context));
//! client.start(Some(session)).await?;
//! client.update_order_status(order_id, OrderStatus::Confirmed).await?;
//! ```

mod actor;
pub mod board;
mod error;
pub mod message;

pub use actor::{OrderReconciler, ReconcilerContext};
pub use board::{BoardChange, OrderBoard};
pub use error::ReconcilerError;
pub use message::{ReconcilerRequest, ReconcilerSnapshot, SubscriptionState};

use crate::clients::ReconcilerClient;

pub fn new(buffer_size: usize) -> (OrderReconciler, ReconcilerClient) {
    OrderReconciler::new(buffer_size)
}

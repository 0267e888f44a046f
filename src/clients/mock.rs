//! # Mock Reconciler
//!
//! Utilities for testing code that drives a [`ReconcilerClient`] without running the
//! reconciler itself.
//!
//! [`create_mock_client`] returns a client together with the receiving end of its
//! channel. The test pulls requests off the receiver with [`expect_start`],
//! [`expect_stop`] or [`expect_update_status`], asserts on them and answers through
//! the returned responder.

use crate::clients::ReconcilerClient;
use crate::model::{Order, OrderId, OrderStatus};
use crate::reconciler::{ReconcilerError, ReconcilerRequest};
use crate::session::SessionContext;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

pub fn create_mock_client(buffer_size: usize) -> (ReconcilerClient, mpsc::Receiver<ReconcilerRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ReconcilerClient::new(sender), receiver)
}

/// Next request, if it is a `Start`.
pub async fn expect_start(
    receiver: &mut mpsc::Receiver<ReconcilerRequest>,
) -> Option<(
    Option<Arc<SessionContext>>,
    oneshot::Sender<Result<(), ReconcilerError>>,
)> {
    match receiver.recv().await {
        Some(ReconcilerRequest::Start { session, respond_to }) => Some((session, respond_to)),
        _ => None,
    }
}

/// Next request, if it is a `Stop`.
pub async fn expect_stop(receiver: &mut mpsc::Receiver<ReconcilerRequest>) -> Option<oneshot::Sender<()>> {
    match receiver.recv().await {
        Some(ReconcilerRequest::Stop { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Next request, if it is an `UpdateStatus`.
pub async fn expect_update_status(
    receiver: &mut mpsc::Receiver<ReconcilerRequest>,
) -> Option<(OrderId, OrderStatus, oneshot::Sender<Result<Order, ReconcilerError>>)> {
    match receiver.recv().await {
        Some(ReconcilerRequest::UpdateStatus {
            order_id,
            status,
            respond_to,
        }) => Some((order_id, status, respond_to)),
        _ => None,
    }
}

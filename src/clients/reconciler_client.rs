use crate::model::{Order, OrderId, OrderStatus};
use crate::reconciler::{ReconcilerError, ReconcilerRequest, ReconcilerSnapshot};
use crate::session::SessionContext;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// Client for the [`OrderReconciler`](crate::reconciler::OrderReconciler).
///
/// Cheap to clone. The reconciler shuts down once every clone has been dropped.
#[derive(Clone)]
pub struct ReconcilerClient {
    sender: mpsc::Sender<ReconcilerRequest>,
}

impl ReconcilerClient {
    pub fn new(sender: mpsc::Sender<ReconcilerRequest>) -> Self {
        Self { sender }
    }

    /// Subscribes to `session`'s orders, replacing any current subscription.
    ///
    /// Returns once the subscribe call has been made; existing orders are loaded
    /// after the feed acknowledges.
    #[instrument(skip_all)]
    pub async fn start(&self, session: Option<Arc<SessionContext>>) -> Result<(), ReconcilerError> {
        debug!(seller_id = ?session.as_ref().map(|s| s.seller_id()), "Sending start to reconciler");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ReconcilerRequest::Start { session, respond_to })
            .await
            .map_err(|_| ReconcilerError::ActorClosed)?;
        response.await.map_err(|_| ReconcilerError::ActorDropped)?
    }

    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<(), ReconcilerError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ReconcilerRequest::Stop { respond_to })
            .await
            .map_err(|_| ReconcilerError::ActorClosed)?;
        response.await.map_err(|_| ReconcilerError::ActorDropped)
    }

    /// Moves a pending order to `status` and returns the stored row.
    #[instrument(skip(self))]
    pub async fn update_order_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, ReconcilerError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ReconcilerRequest::UpdateStatus {
                order_id,
                status,
                respond_to,
            })
            .await
            .map_err(|_| ReconcilerError::ActorClosed)?;
        response.await.map_err(|_| ReconcilerError::ActorDropped)?
    }

    pub async fn snapshot(&self) -> Result<ReconcilerSnapshot, ReconcilerError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ReconcilerRequest::Snapshot { respond_to })
            .await
            .map_err(|_| ReconcilerError::ActorClosed)?;
        response.await.map_err(|_| ReconcilerError::ActorDropped)
    }
}

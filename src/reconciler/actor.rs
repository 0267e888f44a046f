use crate::clients::ReconcilerClient;
use crate::model::{Order, OrderId, OrderPatch, OrderStatus, SellerId};
use crate::notify::{NotificationPermission, Notifier};
use crate::reconciler::board::{BoardChange, OrderBoard};
use crate::reconciler::message::{ReconcilerRequest, ReconcilerSnapshot, SubscriptionState, TaggedFeedMessage};
use crate::reconciler::ReconcilerError;
use crate::render::{render_order, BoardView, Renderer, COMPLETE_PROFILE, LISTENING, LOADING, LOAD_FAILED, SIGNED_OUT};
use crate::session::SessionContext;
use crate::settings::DeviceSettings;
use crate::store::{ChangeEvent, ChangeFeed, FeedFilter, FeedHandle, FeedMessage, FeedStatus, OrderStore};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

/// Collaborators injected when the reconciler starts running.
pub struct ReconcilerContext {
    pub store: Arc<dyn OrderStore>,
    pub feed: Arc<dyn ChangeFeed>,
    pub renderer: Arc<dyn Renderer>,
    pub notifier: Arc<dyn Notifier>,
    pub settings: Arc<dyn DeviceSettings>,
    pub fetch_limit: usize,
    pub notification_title: String,
}

struct ActiveFeed {
    generation: u64,
    handle: FeedHandle,
    forwarder: JoinHandle<()>,
}

/// Owns the live order board for the signed-in seller.
///
/// Client requests and feed messages are handled one at a time on a single task, so
/// the board never sees two writers. Each subscription gets a new generation number;
/// its messages are forwarded into the actor tagged with that number, and anything
/// carrying an older generation is dropped on arrival.
pub struct OrderReconciler {
    receiver: mpsc::Receiver<ReconcilerRequest>,
    feed_tx: mpsc::UnboundedSender<TaggedFeedMessage>,
    feed_rx: mpsc::UnboundedReceiver<TaggedFeedMessage>,
    board: OrderBoard,
    state: SubscriptionState,
    session: Option<Arc<SessionContext>>,
    active: Option<ActiveFeed>,
    generation: u64,
}

impl OrderReconciler {
    pub fn new(buffer_size: usize) -> (Self, ReconcilerClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (feed_tx, feed_rx) = mpsc::unbounded_channel();
        let actor = Self {
            receiver,
            feed_tx,
            feed_rx,
            board: OrderBoard::new(),
            state: SubscriptionState::Unsubscribed,
            session: None,
            active: None,
            generation: 0,
        };
        (actor, ReconcilerClient::new(sender))
    }

    /// Runs until every [`ReconcilerClient`] has been dropped, then unsubscribes.
    pub async fn run(mut self, ctx: ReconcilerContext) {
        info!(fetch_limit = ctx.fetch_limit, "Reconciler started");

        loop {
            tokio::select! {
                request = self.receiver.recv() => match request {
                    Some(request) => self.handle_request(request, &ctx).await,
                    None => break,
                },
                Some(tagged) = self.feed_rx.recv() => self.handle_feed(tagged, &ctx).await,
            }
        }

        self.stop(&ctx).await;
        info!("Shutdown");
    }

    async fn handle_request(&mut self, request: ReconcilerRequest, ctx: &ReconcilerContext) {
        match request {
            ReconcilerRequest::Start { session, respond_to } => {
                debug!(seller_id = ?session.as_ref().map(|s| s.seller_id()), "Start");
                let result = self.start(session, ctx).await;
                let _ = respond_to.send(result);
            }
            ReconcilerRequest::Stop { respond_to } => {
                debug!("Stop");
                self.stop(ctx).await;
                ctx.renderer.render(&BoardView::Placeholder(SIGNED_OUT));
                let _ = respond_to.send(());
            }
            ReconcilerRequest::UpdateStatus {
                order_id,
                status,
                respond_to,
            } => {
                debug!(%order_id, %status, "UpdateStatus");
                let result = self.update_status(&order_id, status, ctx).await;
                let _ = respond_to.send(result);
            }
            ReconcilerRequest::Snapshot { respond_to } => {
                let _ = respond_to.send(self.snapshot());
            }
        }
    }

    async fn start(&mut self, session: Option<Arc<SessionContext>>, ctx: &ReconcilerContext) -> Result<(), ReconcilerError> {
        let Some(session) = session else {
            warn!("Seller profile not loaded, cannot subscribe to orders");
            self.stop(ctx).await;
            ctx.renderer.render(&BoardView::Placeholder(COMPLETE_PROFILE));
            return Err(ReconcilerError::MissingSeller);
        };

        // Whatever was running before belongs to an older generation from here on.
        self.stop(ctx).await;
        self.generation += 1;
        let generation = self.generation;
        let seller_id = session.seller_id().clone();
        self.session = Some(session);
        self.state = SubscriptionState::Subscribing;
        ctx.renderer.render(&BoardView::Placeholder(LISTENING));

        let filter = FeedFilter::seller(seller_id.clone());
        info!(%seller_id, generation, %filter, auto_confirm = ctx.settings.auto_confirm(), "Subscribing to orders");
        match ctx.feed.subscribe(filter).await {
            Ok(subscription) => {
                let forwarder = self.forward(generation, subscription.messages);
                self.active = Some(ActiveFeed {
                    generation,
                    handle: subscription.handle,
                    forwarder,
                });
                Ok(())
            }
            Err(e) => {
                error!(%seller_id, error = %e, "Order subscription failed");
                self.state = SubscriptionState::Failed(FeedStatus::ChannelError(e.to_string()));
                Err(ReconcilerError::Subscribe(e))
            }
        }
    }

    fn forward(&self, generation: u64, mut messages: mpsc::UnboundedReceiver<FeedMessage>) -> JoinHandle<()> {
        let feed_tx = self.feed_tx.clone();
        tokio::spawn(async move {
            while let Some(message) = messages.recv().await {
                if feed_tx.send(TaggedFeedMessage { generation, message }).is_err() {
                    break;
                }
            }
            trace!(generation, "Feed stream ended");
        })
    }

    async fn stop(&mut self, ctx: &ReconcilerContext) {
        if let Some(active) = self.active.take() {
            active.forwarder.abort();
            ctx.feed.unsubscribe(active.handle).await;
            info!(handle = %active.handle, generation = active.generation, "Unsubscribed from orders channel");
        }
        self.state = SubscriptionState::Unsubscribed;
        self.session = None;
        self.board.clear();
    }

    async fn handle_feed(&mut self, tagged: TaggedFeedMessage, ctx: &ReconcilerContext) {
        let current = self.active.as_ref().map(|active| active.generation);
        if current != Some(tagged.generation) {
            debug!(generation = tagged.generation, ?current, "Discarding message from stale subscription");
            return;
        }

        match tagged.message {
            FeedMessage::Status(FeedStatus::Subscribed) => {
                info!(generation = tagged.generation, "Subscribed to orders channel");
                self.state = SubscriptionState::Active;
                self.load_existing(ctx).await;
            }
            FeedMessage::Status(status) => {
                error!(generation = tagged.generation, ?status, "Order subscription error or closed");
                self.state = SubscriptionState::Failed(status);
            }
            FeedMessage::Change(event) if self.state == SubscriptionState::Active => {
                self.apply_change(event, ctx).await;
            }
            FeedMessage::Change(event) => {
                debug!(order_id = %event.order_id(), state = ?self.state, "Dropping change outside an active subscription");
            }
        }
    }

    async fn load_existing(&mut self, ctx: &ReconcilerContext) {
        let Some(seller_id) = self.seller_id() else {
            return;
        };
        ctx.renderer.render(&BoardView::Placeholder(LOADING));

        match ctx.store.list_orders(&seller_id, ctx.fetch_limit).await {
            Ok(orders) => {
                info!(%seller_id, count = orders.len(), "Loaded existing orders");
                self.board.load(orders);
                ctx.renderer.render(&self.board.view());
            }
            Err(e) => {
                error!(%seller_id, error = %e, "Error fetching existing orders");
                ctx.renderer.render(&BoardView::Placeholder(LOAD_FAILED));
            }
        }
    }

    async fn apply_change(&mut self, event: ChangeEvent, ctx: &ReconcilerContext) {
        debug!(kind = event.kind(), order_id = %event.order_id(), "Change received");
        match event {
            ChangeEvent::Insert(order) => {
                if order.status == OrderStatus::Pending && ctx.settings.auto_confirm() {
                    info!(order_id = %order.id, "Auto-confirming order");
                    match self.transition(&order.id, OrderStatus::Confirmed, ctx).await {
                        Ok(_) => return,
                        Err(e) => {
                            warn!(order_id = %order.id, error = %e, "Auto-confirm failed, showing order for manual action");
                            ctx.renderer.show_message(&e.user_message());
                        }
                    }
                }
                let change = self.board.upsert(render_order(&order));
                if change.is_visible() {
                    ctx.renderer.render(&self.board.view());
                }
                if change == BoardChange::Added {
                    self.announce(&order.id, ctx);
                }
            }
            ChangeEvent::Update(order) => {
                if self.board.upsert(render_order(&order)).is_visible() {
                    ctx.renderer.render(&self.board.view());
                }
            }
            ChangeEvent::Delete { id } => {
                if self.board.remove(&id).is_visible() {
                    ctx.renderer.render(&self.board.view());
                }
            }
        }
    }

    /// Moves a pending order to `target` through the store and reflects the stored row.
    async fn transition(
        &mut self,
        order_id: &OrderId,
        target: OrderStatus,
        ctx: &ReconcilerContext,
    ) -> Result<Order, ReconcilerError> {
        let seller_id = self.seller_id().ok_or(ReconcilerError::MissingSeller)?;

        let current = self.board.get(order_id).map(|card| card.status);
        if let Some(from) = current.filter(OrderStatus::is_terminal) {
            return Err(ReconcilerError::InvalidTransition { from, to: target });
        }
        if !target.is_terminal() {
            return Err(ReconcilerError::InvalidTransition {
                from: current.unwrap_or(OrderStatus::Pending),
                to: target,
            });
        }

        let updated = ctx
            .store
            .update_order(order_id, &seller_id, OrderPatch::status(target))
            .await?
            .ok_or_else(|| ReconcilerError::OrderNotFound(order_id.clone()))?;

        info!(%order_id, status = %updated.status, "Order status updated");
        if self.board.upsert(render_order(&updated)).is_visible() {
            ctx.renderer.render(&self.board.view());
        }
        Ok(updated)
    }

    async fn update_status(
        &mut self,
        order_id: &OrderId,
        status: OrderStatus,
        ctx: &ReconcilerContext,
    ) -> Result<Order, ReconcilerError> {
        let result = self.transition(order_id, status, ctx).await;
        match &result {
            Ok(order) => {
                ctx.renderer
                    .show_message(&format!("Order {} marked as \"{}\".", order.id, order.status));
            }
            Err(e) => {
                error!(%order_id, %status, error = %e, "Error updating order status");
                ctx.renderer.show_message(&e.user_message());
            }
        }
        result
    }

    fn announce(&self, order_id: &OrderId, ctx: &ReconcilerContext) {
        let body = format!("New Order Received! ID: {}", order_id.short());
        match ctx.notifier.permission() {
            NotificationPermission::Granted => {
                if let Err(e) = ctx.notifier.notify(&ctx.notification_title, &body) {
                    warn!(%order_id, error = %e, "Notification failed");
                }
            }
            permission => debug!(%order_id, ?permission, "Notification skipped"),
        }
    }

    fn seller_id(&self) -> Option<SellerId> {
        self.session.as_ref().map(|session| session.seller_id().clone())
    }

    fn snapshot(&self) -> ReconcilerSnapshot {
        ReconcilerSnapshot {
            state: self.state.clone(),
            seller_id: self.seller_id(),
            cards: self.board.cards().to_vec(),
        }
    }
}

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use streetr_seller::lifecycle::{AppConfig, Collaborators, SellerApp};
use streetr_seller::model::{LineItem, Order, OrderDetails, OrderId, OrderStatus, SellerProfile};
use streetr_seller::notify::{NotificationPermission, Notifier, NotifyError, RecordingNotifier};
use streetr_seller::reconciler::{ReconcilerError, ReconcilerSnapshot, SubscriptionState};
use streetr_seller::render::{BoardView, RecordingRenderer, DETAILS_FALLBACK, LISTENING, SIGNED_OUT};
use streetr_seller::session::{SessionContext, SessionProvider};
use streetr_seller::settings::{DeviceSettings, MemorySettings, AUTO_CONFIRM_KEY};
use streetr_seller::store::{FeedStatus, MemoryBackend};
use tokio::time::Instant;

struct TestApp {
    app: SellerApp,
    sessions: SessionProvider,
    backend: Arc<MemoryBackend>,
    renderer: Arc<RecordingRenderer>,
    notifier: Arc<RecordingNotifier>,
    settings: Arc<MemorySettings>,
}

fn start_app(backend: MemoryBackend) -> TestApp {
    let notifier = Arc::new(RecordingNotifier::new(NotificationPermission::Default));
    start_app_with(backend, notifier.clone(), notifier)
}

fn start_app_with(
    backend: MemoryBackend,
    app_notifier: Arc<dyn Notifier>,
    notifier: Arc<RecordingNotifier>,
) -> TestApp {
    let backend = Arc::new(backend);
    let renderer = Arc::new(RecordingRenderer::new());
    let settings = Arc::new(MemorySettings::new());
    let sessions = SessionProvider::new();

    let app = SellerApp::new(
        &AppConfig::default(),
        Collaborators {
            store: backend.clone(),
            feed: backend.clone(),
            renderer: renderer.clone(),
            notifier: app_notifier,
            settings: settings.clone(),
        },
        &sessions,
    );

    TestApp {
        app,
        sessions,
        backend,
        renderer,
        notifier,
        settings,
    }
}

fn login(app: &TestApp, seller: &str) {
    let session = SessionContext::new(seller, SellerProfile::new(seller, "Chaat Corner")).unwrap();
    app.sessions.login(session);
}

fn order(id: &str, seller: &str, minutes_ago: i64) -> Order {
    Order::new(id, seller, Decimal::new(8000, 2), OrderStatus::Pending)
        .with_customer("Ravi", "98450 12345")
        .with_details(OrderDetails::Items(vec![LineItem::new("Pani Puri", 2, Decimal::new(4000, 2))]))
        .created_at(chrono::Utc::now() - chrono::Duration::minutes(minutes_ago))
}

async fn wait_for(app: &SellerApp, what: &str, check: impl Fn(&ReconcilerSnapshot) -> bool) -> ReconcilerSnapshot {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let snapshot = app.reconciler.snapshot().await.expect("reconciler alive");
        if check(&snapshot) {
            return snapshot;
        }
        assert!(Instant::now() < deadline, "timed out waiting for {what}: {snapshot:?}");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

async fn wait_active(app: &SellerApp, seller: &str) -> ReconcilerSnapshot {
    wait_for(app, "active subscription", |s| {
        s.state == SubscriptionState::Active && s.seller_id.as_ref().is_some_and(|id| id.0 == seller)
    })
    .await
}

/// Sign in, load existing orders, receive a new one, confirm it.
#[tokio::test]
async fn test_seller_session_end_to_end() {
    let t = start_app(MemoryBackend::with_orders([
        order("older-order-1", "s1", 30),
        order("newer-order-2", "s1", 5),
        order("foreign-order", "s2", 1),
    ]));

    login(&t, "s1");
    let snapshot = wait_active(&t.app, "s1").await;
    assert_eq!(snapshot.card_ids(), ["newer-order-2", "older-order-1"]);
    assert!(t.renderer.views().contains(&BoardView::Placeholder(LISTENING)));

    // The permission prompt runs beside the feed; wait for the user to accept it.
    let deadline = Instant::now() + Duration::from_secs(2);
    while t.notifier.permission() != NotificationPermission::Granted {
        assert!(Instant::now() < deadline, "notification permission never requested");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    // A new order lands on top and is announced.
    t.backend.insert_order(order("0f3a9c21-new", "s1", 0));
    let snapshot = wait_for(&t.app, "new order", |s| s.cards.len() == 3).await;
    assert_eq!(snapshot.card_ids()[0], "0f3a9c21-new");
    assert_eq!(snapshot.cards[0].buttons().len(), 3);
    assert_eq!(
        t.notifier.sent(),
        vec![("StreetR Seller".to_string(), "New Order Received! ID: 0f3a9c21".to_string())]
    );

    // Confirm it.
    let updated = t
        .app
        .reconciler
        .update_order_status(OrderId::from("0f3a9c21-new"), OrderStatus::Confirmed)
        .await
        .expect("update succeeds");
    assert_eq!(updated.status, OrderStatus::Confirmed);
    assert_eq!(
        t.backend.order(&OrderId::from("0f3a9c21-new")).unwrap().status,
        OrderStatus::Confirmed
    );
    assert_eq!(
        t.renderer.messages().last().map(String::as_str),
        Some("Order 0f3a9c21-new marked as \"Confirmed\".")
    );

    let snapshot = t.app.reconciler.snapshot().await.unwrap();
    assert_eq!(snapshot.card_ids(), ["0f3a9c21-new", "newer-order-2", "older-order-1"]);
    assert!(snapshot.cards[0].is_actioned());

    // Deleted rows disappear.
    t.backend.delete_order(&OrderId::from("older-order-1"));
    wait_for(&t.app, "delete", |s| s.cards.len() == 2).await;

    t.app.shutdown().await.expect("clean shutdown");
    assert_eq!(t.backend.subscriber_count(), 0);
}

/// With auto-confirm on, a pending insert is only ever shown as confirmed.
#[tokio::test]
async fn test_auto_confirm_never_shows_pending_card() {
    let t = start_app(MemoryBackend::new());
    login(&t, "s1");
    wait_active(&t.app, "s1").await;

    t.app.set_auto_confirm(true).unwrap();
    assert!(t.app.auto_confirm());

    t.backend.insert_order(order("auto-1", "s1", 0));
    let snapshot = wait_for(&t.app, "auto-confirmed card", |s| !s.cards.is_empty()).await;

    assert_eq!(snapshot.cards[0].status, OrderStatus::Confirmed);
    assert_eq!(
        t.backend.order(&OrderId::from("auto-1")).unwrap().status,
        OrderStatus::Confirmed
    );
    let pending_shown = t
        .renderer
        .views()
        .iter()
        .flat_map(|view| view.cards().to_vec())
        .any(|card| card.order_id.0 == "auto-1" && card.status == OrderStatus::Pending);
    assert!(!pending_shown);
    assert!(t.notifier.sent().is_empty());

    // Non-pending inserts are displayed as they are.
    let mut late = order("late-1", "s1", 0);
    late.status = OrderStatus::LateDelivery;
    t.backend.insert_order(late);
    let snapshot = wait_for(&t.app, "late insert", |s| s.cards.len() == 2).await;
    assert_eq!(snapshot.cards[0].status, OrderStatus::LateDelivery);

    t.app.shutdown().await.unwrap();
}

/// Switching sellers leaves nothing of the previous seller on the board.
#[tokio::test]
async fn test_seller_switch_isolates_boards() {
    let t = start_app(MemoryBackend::with_orders([order("a-order", "s1", 2), order("b-order", "s2", 3)]));

    login(&t, "s1");
    wait_active(&t.app, "s1").await;

    login(&t, "s2");
    let snapshot = wait_active(&t.app, "s2").await;
    assert_eq!(snapshot.card_ids(), ["b-order"]);
    assert_eq!(t.backend.subscriber_count(), 1);

    // An order for the previous seller is not ours to show.
    t.backend.insert_order(order("a-late", "s1", 0));
    t.backend.insert_order(order("b-new", "s2", 0));
    let snapshot = wait_for(&t.app, "s2 insert", |s| s.cards.len() == 2).await;
    assert_eq!(snapshot.card_ids(), ["b-new", "b-order"]);

    t.app.shutdown().await.unwrap();
}

/// Sign-out stops the feed, empties the board and forgets auto-confirm.
#[tokio::test]
async fn test_logout_clears_state() {
    let t = start_app(MemoryBackend::with_orders([order("a-order", "s1", 2)]));
    login(&t, "s1");
    wait_active(&t.app, "s1").await;
    t.app.set_auto_confirm(true).unwrap();

    t.sessions.logout();
    let snapshot = wait_for(&t.app, "signed out", |s| s.seller_id.is_none()).await;
    assert_eq!(snapshot.state, SubscriptionState::Unsubscribed);
    assert!(snapshot.cards.is_empty());

    let deadline = Instant::now() + Duration::from_secs(2);
    while t.settings.get_bool(AUTO_CONFIRM_KEY).is_some() {
        assert!(Instant::now() < deadline, "auto-confirm preference not cleared");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(t.backend.subscriber_count(), 0);

    let err = t
        .app
        .reconciler
        .update_order_status(OrderId::from("a-order"), OrderStatus::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcilerError::MissingSeller));
    assert_eq!(
        t.renderer.messages().last().map(String::as_str),
        Some("Profile not available. Cannot update order.")
    );
    assert_eq!(t.renderer.last_view(), Some(BoardView::Placeholder(SIGNED_OUT)));

    t.app.shutdown().await.unwrap();
}

/// Another seller's order cannot be actioned, and the board is left alone.
#[tokio::test]
async fn test_foreign_order_update_is_rejected() {
    let t = start_app(MemoryBackend::with_orders([order("mine", "s1", 2), order("theirs", "s2", 1)]));
    login(&t, "s1");
    wait_active(&t.app, "s1").await;
    let renders = t.renderer.render_count();

    let err = t
        .app
        .reconciler
        .update_order_status(OrderId::from("theirs"), OrderStatus::NotAvailable)
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcilerError::OrderNotFound(ref id) if id.0 == "theirs"));
    assert_eq!(t.backend.order(&OrderId::from("theirs")).unwrap().status, OrderStatus::Pending);
    assert_eq!(t.renderer.render_count(), renders);
    assert_eq!(
        t.renderer.messages().last().map(String::as_str),
        Some("Error: Order theirs not found for this seller")
    );

    t.app.shutdown().await.unwrap();
}

/// A lost connection leaves the board as it was and does not resubscribe.
#[tokio::test]
async fn test_connection_loss_stalls_feed() {
    let t = start_app(MemoryBackend::with_orders([order("a-order", "s1", 2)]));
    login(&t, "s1");
    wait_active(&t.app, "s1").await;

    t.backend.close_feeds(FeedStatus::Closed);
    let snapshot = wait_for(&t.app, "closed", |s| matches!(s.state, SubscriptionState::Failed(_))).await;
    assert_eq!(snapshot.state, SubscriptionState::Failed(FeedStatus::Closed));
    assert_eq!(snapshot.card_ids(), ["a-order"]);

    t.backend.insert_order(order("missed", "s1", 0));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(t.app.reconciler.snapshot().await.unwrap().card_ids(), ["a-order"]);
    assert_eq!(t.backend.subscriber_count(), 0);

    t.app.shutdown().await.unwrap();
}

/// A line item too large to price is shown with the fallback text; the reconciler keeps running.
#[tokio::test]
async fn test_oversized_line_item_keeps_reconciler_alive() {
    let t = start_app(MemoryBackend::new());
    login(&t, "s1");
    wait_active(&t.app, "s1").await;

    let price = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
    let huge = order("huge-1", "s1", 0).with_details(OrderDetails::Items(vec![LineItem::new("Biryani", 2, price)]));
    t.backend.insert_order(huge);

    let snapshot = wait_for(&t.app, "oversized card", |s| s.cards.len() == 1).await;
    assert_eq!(snapshot.cards[0].lines, [DETAILS_FALLBACK]);

    t.backend.insert_order(order("next-1", "s1", 0));
    let snapshot = wait_for(&t.app, "next card", |s| s.cards.len() == 2).await;
    assert_eq!(snapshot.card_ids(), ["next-1", "huge-1"]);

    t.app.shutdown().await.expect("clean shutdown");
}

/// A notification prompt the user never answers.
struct UnansweredNotifier;

#[async_trait]
impl Notifier for UnansweredNotifier {
    fn permission(&self) -> NotificationPermission {
        NotificationPermission::Default
    }

    async fn request_permission(&self) -> NotificationPermission {
        std::future::pending().await
    }

    fn notify(&self, _title: &str, _body: &str) -> Result<(), NotifyError> {
        Err(NotifyError::PermissionDenied)
    }
}

/// Orders load and stream while the notification prompt is still open.
#[tokio::test]
async fn test_orders_flow_while_permission_prompt_is_open() {
    let t = start_app_with(
        MemoryBackend::with_orders([order("a-order", "s1", 2)]),
        Arc::new(UnansweredNotifier),
        Arc::new(RecordingNotifier::new(NotificationPermission::Default)),
    );
    login(&t, "s1");

    let snapshot = wait_active(&t.app, "s1").await;
    assert_eq!(snapshot.card_ids(), ["a-order"]);
    assert_eq!(t.backend.subscriber_count(), 1);

    t.backend.insert_order(order("b-order", "s1", 0));
    wait_for(&t.app, "live insert", |s| s.cards.len() == 2).await;

    t.app.shutdown().await.unwrap();
}

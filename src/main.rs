//! Demo: one seller session against the in-memory backend.

use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use streetr_seller::lifecycle::tracing::setup_tracing;
use streetr_seller::lifecycle::{AppConfig, Collaborators, SellerApp};
use streetr_seller::model::{LineItem, Order, OrderDetails, OrderStatus, SellerProfile};
use streetr_seller::notify::TracingNotifier;
use streetr_seller::render::TracingRenderer;
use streetr_seller::session::{SessionContext, SessionProvider};
use streetr_seller::store::MemoryBackend;
use tracing::{info, Instrument};

const SELLER: &str = "seller_1";

fn order(id: &str, customer: &str, items: Vec<LineItem>) -> Order {
    let total = items.iter().filter_map(LineItem::subtotal).sum();
    Order::new(id, SELLER, total, OrderStatus::Pending)
        .with_customer(customer, "98450 12345")
        .with_details(OrderDetails::Items(items))
}

/// Gives the reconciler time to drain the feed before the next step.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = AppConfig::from_env();
    info!(?config, "Starting seller app");

    let backend = Arc::new(MemoryBackend::with_orders([order(
        "7c2e41d0-earlier",
        "Meena",
        vec![LineItem::new("Pav Bhaji", 1, Decimal::new(9000, 2))],
    )]));
    let collaborators = Collaborators {
        store: backend.clone(),
        feed: backend.clone(),
        renderer: Arc::new(TracingRenderer),
        notifier: Arc::new(TracingNotifier),
        settings: config.open_settings().map_err(|e| e.to_string())?,
    };

    let sessions = SessionProvider::new();
    let app = SellerApp::new(&config, collaborators, &sessions);

    let profile = SellerProfile::new(SELLER, "Chaat Corner");
    let session = SessionContext::new(SELLER, profile).map_err(|e| e.to_string())?;
    sessions.login(session);
    settle().await;

    let span = tracing::info_span!("manual_orders");
    async {
        backend.insert_order(order(
            "9d1c07aa-manual",
            "Ravi",
            vec![
                LineItem::new("Pani Puri", 2, Decimal::new(4000, 2)),
                LineItem::new("Masala Chai", 1, Decimal::new(1500, 2)),
            ],
        ));
        settle().await;

        app.reconciler
            .update_order_status("9d1c07aa-manual".into(), OrderStatus::Confirmed)
            .await
            .map_err(|e| e.user_message())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("auto_confirm");
    async {
        app.set_auto_confirm(true).map_err(|e| e.to_string())?;
        backend.insert_order(order(
            "4b7e9f12-auto",
            "Asha",
            vec![LineItem::new("Vada Pav", 3, Decimal::new(2500, 2))],
        ));
        settle().await;
        Ok::<_, String>(())
    }
    .instrument(span)
    .await?;

    let snapshot = app.reconciler.snapshot().await.map_err(|e| e.to_string())?;
    info!(cards = ?snapshot.card_ids(), state = ?snapshot.state, "Board before sign-out");

    sessions.logout();
    settle().await;

    app.shutdown().await
}

//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Module paths are hidden (`with_target(false)`); the structured fields
//! (`order_id`, `seller_id`, `generation`, `handle`) carry the context instead.
//!
//! ## Usage
//!
//! ```bash
//! # Lifecycle and order events
//! RUST_LOG=info cargo run
//!
//! # Every request, change event and discarded stale message
//! RUST_LOG=debug cargo run
//!
//! # Forwarder task ends and store internals
//! RUST_LOG=trace cargo run
//! ```
//!
//! ## What Gets Logged
//!
//! At `info`, a seller session looks like this:
//!
//! ```text
//! INFO Reconciler started fetch_limit=20
//! INFO Seller signed in seller_id=seller_1
//! INFO Subscribing to orders seller_id=seller_1 generation=1 filter=orders:seller_id=eq.seller_1 auto_confirm=false
//! INFO Subscribed to orders channel generation=1
//! INFO Loaded existing orders seller_id=seller_1 count=2
//! INFO Order status updated order_id=9d1c... status=Confirmed
//! INFO Auto-confirm orders: ON
//! INFO Auto-confirming order order_id=4b7e...
//! INFO Unsubscribed from orders channel handle=feed_1 generation=1
//! ```
//!
//! At `debug` the same session also shows each `Change received kind=INSERT ...` and
//! any `Discarding message from stale subscription generation=1 current=Some(2)`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}

//! # StreetR Seller
//!
//! > **The live order screen of a street-food seller app.**
//!
//! A seller signs in, sees their recent orders, receives new ones as they are placed,
//! and answers each with one of three actions: confirm, not available, or late delivery.
//! Optionally, new pending orders are confirmed automatically.
//!
//! ## 🏗️ Design
//!
//! All order state lives in one actor, the [`OrderReconciler`](reconciler::OrderReconciler).
//! It owns the board of rendered cards and is the only thing that mutates it. Two kinds
//! of input reach it, and it handles them strictly one after another:
//!
//! - **Requests** from [`ReconcilerClient`](clients::ReconcilerClient): start, stop,
//!   update an order's status, snapshot.
//! - **Feed messages** from the backend's change feed: acknowledgement, errors, and
//!   row-level insert/update/delete events.
//!
//! Every subscription gets a generation number. When the seller changes or signs out,
//! the old subscription is torn down and anything it still delivers is discarded, so a
//! previous seller's events can never reach the board.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Seams as Traits
//! The backend ([`store::OrderStore`], [`store::ChangeFeed`]), the UI
//! ([`render::Renderer`]), device notifications ([`notify::Notifier`]) and device
//! preferences ([`settings::DeviceSettings`]) are all traits injected into the actor
//! when it starts running. Tests swap in the doubles from [`store::mock`] and the
//! recording implementations.
//!
//! ### 2. Type-Safe Error Handling
//! Each layer has its own `thiserror` enum. [`ReconcilerError`](reconciler::ReconcilerError)
//! wraps store failures with `#[from]` and knows how to phrase itself for the seller.
//!
//! ### 3. Observability
//! Structured `tracing` throughout; see [`lifecycle::tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! - [`model`]: orders, statuses, line items, seller profiles.
//! - [`store`]: backend seams, wire decoding, in-memory backend, mocks.
//! - [`render`]: pure `Order -> OrderCard` projection and board views.
//! - [`reconciler`]: the actor, its board, messages and errors.
//! - [`clients`]: the typed client and a mock for driving code that uses it.
//! - [`session`], [`settings`], [`notify`]: signed-in identity, device preferences, notifications.
//! - [`lifecycle`]: configuration, tracing setup and the [`SellerApp`](lifecycle::SellerApp) orchestrator.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo against the in-memory backend
//! RUST_LOG=info cargo run
//!
//! cargo test
//! ```

pub mod clients;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod reconciler;
pub mod render;
pub mod session;
pub mod settings;
pub mod store;

//! # Board Rendering
//!
//! The reconciler never touches a UI directly. It hands a complete [`BoardView`] to a
//! [`Renderer`] after every visible change, and transient text (confirmations, errors)
//! through [`Renderer::show_message`].
//!
//! - [`card`]: the pure `Order -> OrderCard` projection.
//! - [`TracingRenderer`]: logs views; used by the demo binary.
//! - [`RecordingRenderer`]: keeps every view and message for assertions in tests.

pub mod card;

pub use card::{format_rupees, render_order, ActionButton, CardActions, OrderCard, DETAILS_FALLBACK};

use parking_lot::Mutex;
use std::fmt::Display;
use tracing::info;

pub const COMPLETE_PROFILE: &str = "Complete your profile to see orders.";
pub const LISTENING: &str = "Listening for new orders...";
pub const LOADING: &str = "Loading existing orders...";
pub const NO_ORDERS: &str = "No orders yet.";
pub const LOAD_FAILED: &str = "Could not load orders.";
pub const SIGNED_OUT: &str = "Signed out.";

/// What the order list currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardView {
    Placeholder(&'static str),
    Empty,
    Cards(Vec<OrderCard>),
}

impl BoardView {
    pub fn cards(&self) -> &[OrderCard] {
        match self {
            BoardView::Cards(cards) => cards,
            _ => &[],
        }
    }
}

impl Display for BoardView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoardView::Placeholder(text) => f.write_str(text),
            BoardView::Empty => f.write_str(NO_ORDERS),
            BoardView::Cards(cards) => {
                for (i, card) in cards.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    writeln!(f, "{card}")?;
                }
                Ok(())
            }
        }
    }
}

pub trait Renderer: Send + Sync {
    fn render(&self, view: &BoardView);
    fn show_message(&self, message: &str);
}

pub struct TracingRenderer;

impl Renderer for TracingRenderer {
    fn render(&self, view: &BoardView) {
        info!(cards = view.cards().len(), "Board updated\n{view}");
    }

    fn show_message(&self, message: &str) {
        info!(message, "Seller message");
    }
}

#[derive(Default)]
pub struct RecordingRenderer {
    views: Mutex<Vec<BoardView>>,
    messages: Mutex<Vec<String>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn views(&self) -> Vec<BoardView> {
        self.views.lock().clone()
    }

    pub fn last_view(&self) -> Option<BoardView> {
        self.views.lock().last().cloned()
    }

    pub fn render_count(&self) -> usize {
        self.views.lock().len()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, view: &BoardView) {
        self.views.lock().push(view.clone());
    }

    fn show_message(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

use crate::model::{Order, OrderId};
use crate::render::{render_order, BoardView, OrderCard};
use std::collections::HashSet;

/// Outcome of applying one change to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardChange {
    Added,
    Replaced,
    /// The incoming card is identical to the one shown.
    Unchanged,
    Removed,
    /// Removal of a card that was never shown.
    Absent,
}

impl BoardChange {
    pub fn is_visible(self) -> bool {
        matches!(self, BoardChange::Added | BoardChange::Replaced | BoardChange::Removed)
    }
}

/// Rendered cards, newest on top, at most one per order id.
#[derive(Debug, Default, Clone)]
pub struct OrderBoard {
    cards: Vec<OrderCard>,
}

impl OrderBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the board with `orders`, newest first.
    pub fn load(&mut self, mut orders: Vec<Order>) {
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut seen = HashSet::new();
        self.cards = orders
            .iter()
            .filter(|order| seen.insert(order.id.clone()))
            .map(render_order)
            .collect();
    }

    /// Replaces the card with the same id in place, or adds `card` on top.
    pub fn upsert(&mut self, card: OrderCard) -> BoardChange {
        match self.position(&card.order_id) {
            Some(index) if self.cards[index] == card => BoardChange::Unchanged,
            Some(index) => {
                self.cards[index] = card;
                BoardChange::Replaced
            }
            None => {
                self.cards.insert(0, card);
                BoardChange::Added
            }
        }
    }

    pub fn remove(&mut self, order_id: &OrderId) -> BoardChange {
        match self.position(order_id) {
            Some(index) => {
                self.cards.remove(index);
                BoardChange::Removed
            }
            None => BoardChange::Absent,
        }
    }

    pub fn get(&self, order_id: &OrderId) -> Option<&OrderCard> {
        self.cards.iter().find(|card| &card.order_id == order_id)
    }

    pub fn cards(&self) -> &[OrderCard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    pub fn view(&self) -> BoardView {
        if self.cards.is_empty() {
            BoardView::Empty
        } else {
            BoardView::Cards(self.cards.clone())
        }
    }

    fn position(&self, order_id: &OrderId) -> Option<usize> {
        self.cards.iter().position(|card| &card.order_id == order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderStatus;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use std::collections::HashMap;

    fn order(id: &str, minutes_ago: i64, status: OrderStatus) -> Order {
        Order::new(id, "s1", Decimal::from(50), status).created_at(Utc::now() - Duration::minutes(minutes_ago))
    }

    fn ids(board: &OrderBoard) -> Vec<&str> {
        board.cards().iter().map(|c| c.order_id.0.as_str()).collect()
    }

    #[test]
    fn test_load_orders_newest_first() {
        let mut board = OrderBoard::new();
        board.load(vec![
            order("old", 30, OrderStatus::Pending),
            order("new", 1, OrderStatus::Pending),
            order("mid", 10, OrderStatus::Confirmed),
        ]);
        assert_eq!(ids(&board), ["new", "mid", "old"]);
    }

    #[test]
    fn test_empty_board_view() {
        let mut board = OrderBoard::new();
        board.load(Vec::new());
        assert_eq!(board.view(), BoardView::Empty);
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut board = OrderBoard::new();
        board.load(vec![order("a", 1, OrderStatus::Pending), order("b", 2, OrderStatus::Pending)]);

        let mut b = order("b", 2, OrderStatus::Pending);
        b.status = OrderStatus::LateDelivery;
        assert_eq!(board.upsert(render_order(&b)), BoardChange::Replaced);
        assert_eq!(ids(&board), ["a", "b"]);
        assert!(board.get(&OrderId::from("b")).unwrap().is_actioned());

        assert_eq!(board.upsert(render_order(&b)), BoardChange::Unchanged);
    }

    #[test]
    fn test_unknown_update_goes_on_top() {
        let mut board = OrderBoard::new();
        board.load(vec![order("a", 1, OrderStatus::Pending)]);
        assert_eq!(board.upsert(render_order(&order("z", 60, OrderStatus::Confirmed))), BoardChange::Added);
        assert_eq!(ids(&board), ["z", "a"]);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut board = OrderBoard::new();
        board.load(vec![order("a", 1, OrderStatus::Pending)]);
        assert_eq!(board.remove(&OrderId::from("nope")), BoardChange::Absent);
        assert_eq!(board.remove(&OrderId::from("a")), BoardChange::Removed);
        assert!(board.is_empty());
    }

    /// Replays a pseudo-random event stream and checks the board against a plain map
    /// of the latest row per id.
    #[test]
    fn test_replay_matches_latest_rows() {
        let statuses = [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::NotAvailable,
            OrderStatus::LateDelivery,
        ];
        let mut seed: u64 = 0x2545_f491;
        let mut next = move |bound: u64| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) % bound
        };

        let mut board = OrderBoard::new();
        let mut latest: HashMap<String, Order> = HashMap::new();
        for _ in 0..500 {
            let id = format!("order-{}", next(12));
            match next(3) {
                0 | 1 => {
                    let row = order(&id, next(90) as i64, statuses[next(4) as usize]);
                    board.upsert(render_order(&row));
                    latest.insert(id, row);
                }
                _ => {
                    board.remove(&OrderId::from(id.as_str()));
                    latest.remove(&id);
                }
            }
        }

        assert_eq!(board.len(), latest.len());
        for (id, row) in &latest {
            assert_eq!(board.get(&OrderId::from(id.as_str())), Some(&render_order(row)));
        }
    }
}

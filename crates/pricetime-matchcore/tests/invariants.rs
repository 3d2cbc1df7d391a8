//! Integration test: structural invariants under random order flow
//!
//! Drives a book with a seeded random mix of limit orders, market sweeps,
//! cancels and modifies, auditing after every step and checking price
//! priority, time priority and quantity conservation on every trade.

use std::collections::HashMap;

use pricetime_matchcore::OrderBook;
use pricetime_types::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

/// Snapshot of the opposite side before an incoming order:
/// `(price, [(order id, remaining)])`, best price first.
type SideSnapshot = Vec<(Decimal, Vec<(OrderId, Quantity)>)>;

fn snapshot(book: &OrderBook, side: Side) -> SideSnapshot {
    let depth = book.depth(usize::MAX);
    let levels = match side {
        Side::Buy => depth.bids,
        Side::Sell => depth.asks,
    };
    levels
        .iter()
        .map(|level| {
            let orders = book
                .level_orders(side, level.price)
                .iter()
                .map(|o| (o.id, o.remaining))
                .collect();
            (level.price, orders)
        })
        .collect()
}

/// Replays `incoming` by hand against a snapshot of the opposite side and
/// returns the `(maker, price, qty)` sequence price-time priority demands.
fn expected_fills(incoming: &Order, opposite: &SideSnapshot) -> Vec<(OrderId, Decimal, Quantity)> {
    let mut remaining = incoming.quantity;
    let mut fills = Vec::new();
    for (price, orders) in opposite {
        if remaining == 0 || !incoming.crosses(*price) {
            break;
        }
        for (id, qty) in orders {
            if remaining == 0 {
                break;
            }
            let fill = remaining.min(*qty);
            fills.push((*id, *price, fill));
            remaining -= fill;
        }
    }
    fills
}

fn random_price(rng: &mut StdRng) -> Decimal {
    Decimal::new(rng.gen_range(95..=105), 0)
}

#[test]
fn random_flow_preserves_invariants() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut book = OrderBook::new("FUZZ");
    let mut next_id = 1u64;
    let mut live: Vec<OrderId> = Vec::new();
    let mut total_volume: Quantity = 0;

    for step in 0..5_000 {
        match rng.gen_range(0..100) {
            0..=59 => {
                let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
                let price = random_price(&mut rng);
                let order = Order::limit(next_id, side, price, rng.gen_range(1..=50));
                next_id += 1;

                let expected = expected_fills(&order, &snapshot(&book, side.opposite()));
                let trades = book.add_order(order.clone()).unwrap();
                let actual: Vec<(OrderId, Decimal, Quantity)> = trades
                    .iter()
                    .map(|t| (t.maker_order_id, t.price, t.quantity))
                    .collect();
                assert_eq!(actual, expected, "step {step}: fills out of priority order");

                let traded: Quantity = trades.iter().map(|t| t.quantity).sum();
                assert!(traded <= order.quantity);
                total_volume += traded;

                let rest = order.quantity - traded;
                if rest > 0 {
                    assert_eq!(book.order(order.id).unwrap().remaining, rest);
                    live.push(order.id);
                } else {
                    assert!(!book.contains_order(order.id));
                }
            }
            60..=69 => {
                let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
                let qty = rng.gen_range(1..=40);
                let exec = book.execute_market_order(side, qty).unwrap();
                assert_eq!(exec.filled() + exec.unfilled, qty);
                total_volume += exec.filled();
            }
            70..=84 if !live.is_empty() => {
                let id = live.swap_remove(rng.gen_range(0..live.len()));
                match book.cancel_order(id) {
                    Ok(order) => assert_eq!(order.id, id),
                    // Filled since it was recorded.
                    Err(BookError::OrderNotFound(_)) => {}
                    Err(other) => panic!("step {step}: unexpected {other}"),
                }
                assert!(!book.contains_order(id));
            }
            85..=99 if !live.is_empty() => {
                let id = live[rng.gen_range(0..live.len())];
                let new_price = rng.gen_bool(0.5).then(|| random_price(&mut rng));
                let new_qty = rng.gen_bool(0.5).then(|| rng.gen_range(0..=30));
                match book.modify_order(id, new_price, new_qty) {
                    Ok(order) => {
                        if new_qty == Some(0) {
                            assert!(!book.contains_order(id));
                        } else {
                            assert_eq!(book.order(id), Some(&order));
                        }
                    }
                    Err(BookError::OrderNotFound(_)) => {}
                    Err(other) => panic!("step {step}: unexpected {other}"),
                }
            }
            _ => {}
        }

        book.audit()
            .unwrap_or_else(|err| panic!("step {step}: {err}"));
        live.retain(|id| book.contains_order(*id));
    }

    assert_eq!(book.stats().volume, total_volume);
}

#[test]
fn quantity_is_conserved_across_trades() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut book = OrderBook::new("FUZZ");
    let mut remaining_by_id: HashMap<OrderId, Quantity> = HashMap::new();

    for id in 1..=2_000u64 {
        let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
        let qty = rng.gen_range(1..=20);
        let trades = book
            .add_order(Order::limit(id, side, random_price(&mut rng), qty))
            .unwrap();

        let mut incoming_left = qty;
        for trade in &trades {
            assert!(trade.quantity > 0);
            incoming_left -= trade.quantity;
            let maker_left = remaining_by_id
                .get_mut(&trade.maker_order_id)
                .expect("maker must have rested earlier");
            *maker_left -= trade.quantity;
        }
        if incoming_left > 0 {
            remaining_by_id.insert(OrderId(id), incoming_left);
        }
        remaining_by_id.retain(|_, left| *left > 0);

        for (order_id, left) in &remaining_by_id {
            assert_eq!(book.order(*order_id).map(|o| o.remaining), Some(*left));
        }
        assert_eq!(remaining_by_id.len(), book.order_count());
    }
}

#[test]
fn book_never_crosses_without_modifications() {
    let mut rng = StdRng::seed_from_u64(1234);
    let mut book = OrderBook::new("FUZZ");
    for id in 1..=3_000u64 {
        let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
        let price = random_price(&mut rng);
        let qty = rng.gen_range(1..=10);
        book.add_order(Order::limit(id, side, price, qty)).unwrap();
        if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
            assert!(bid < ask, "crossed book after order {id}: {bid} >= {ask}");
        }
    }
}

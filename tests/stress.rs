//! Stress tests - push the engine toward its limits.
//!
//! Correctness under extreme conditions: near-capacity operation, rapid
//! slot churn, heavy contention at a single price level, and maximum
//! price/quantity values.

use std::cell::RefCell;
use std::rc::Rc;

use pricetime::{OrderBook, Side, Trade, TradeSink};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

type Trades = Rc<RefCell<Vec<Trade>>>;

fn make_book(capacity: u32) -> (OrderBook<impl TradeSink>, Trades) {
    let trades: Trades = Rc::new(RefCell::new(Vec::new()));
    let sink = {
        let trades = Rc::clone(&trades);
        move |t: Trade| trades.borrow_mut().push(t)
    };
    (OrderBook::new(capacity, sink), trades)
}

#[test]
fn near_capacity_operation() {
    const CAPACITY: u32 = 10_000;
    let (mut book, _trades) = make_book(CAPACITY);

    // Fill to 95% with non-crossing orders: bids 8000-8990, asks 10000-10990
    let target = (CAPACITY as f64 * 0.95) as u64;
    for i in 0..target {
        let (side, price) = if i % 2 == 0 {
            (Side::Buy, 8_000 + (i % 100) as u32 * 10)
        } else {
            (Side::Sell, 10_000 + (i % 100) as u32 * 10)
        };
        book.add_limit_order(side, price, 100, i, 1);
    }

    assert_eq!(book.order_count(), target as usize);
    assert_eq!(book.live_orders() as u64, target);
    assert!(book.free_slots() > 0);
}

#[test]
fn rapid_churn_reuses_slots() {
    const CAPACITY: u32 = 64;
    const ROUNDS: u64 = 10_000;
    let (mut book, _trades) = make_book(CAPACITY);

    // Far more operations than slots: every add is cancelled before the
    // next, so the arena stays at one live order.
    for i in 0..ROUNDS {
        let id = i + 1;
        book.add_limit_order(Side::Buy, 9_000 + (i % 50) as u32, 10, id, 1);
        book.cancel_order(id);
    }

    assert!(book.is_empty());
    assert_eq!(book.free_slots(), CAPACITY);
}

#[test]
fn churn_through_matching_reuses_slots() {
    const CAPACITY: u32 = 16;
    const ROUNDS: u64 = 5_000;
    let (mut book, trades) = make_book(CAPACITY);

    for i in 0..ROUNDS {
        let base = i * 2;
        book.add_limit_order(Side::Sell, 10_000, 10, base + 1, 1);
        book.add_limit_order(Side::Buy, 10_000, 10, base + 2, 2);
    }

    assert_eq!(trades.borrow().len(), ROUNDS as usize);
    assert!(book.is_empty());
    assert_eq!(book.free_slots(), CAPACITY);
}

#[test]
fn deep_queue_at_single_level() {
    const ORDERS: u64 = 5_000;
    let (mut book, trades) = make_book(10_000);

    for i in 0..ORDERS {
        book.add_limit_order(Side::Sell, 10_000, 1, i, 1);
    }
    assert_eq!(book.best_ask().unwrap().total_qty, ORDERS);
    assert_eq!(book.best_ask().unwrap().order_count, ORDERS as u32);

    // One sweep consumes the whole queue in FIFO order
    book.add_limit_order(Side::Buy, 10_000, ORDERS as u32, ORDERS, 2);

    assert_eq!(trades.borrow().len(), ORDERS as usize);
    let ids: Vec<u64> = trades.borrow().iter().map(|t| t.sell_order_id).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]), "fills must be FIFO");
    assert_eq!(book.best_ask(), None);
    assert!(book.is_empty());
}

#[test]
fn extreme_price_and_quantity_values() {
    let (mut book, trades) = make_book(16);

    book.add_limit_order(Side::Sell, u32::MAX, u32::MAX, 1, 1);
    book.add_limit_order(Side::Sell, u32::MAX, u32::MAX, 2, 1);
    assert_eq!(
        book.best_ask().unwrap().total_qty,
        2 * (u32::MAX as u64),
        "level aggregate must not wrap"
    );

    book.add_limit_order(Side::Buy, u32::MAX, u32::MAX, 3, 2);
    assert_eq!(trades.borrow().len(), 1);
    assert_eq!(trades.borrow()[0].quantity, u32::MAX);
    assert_eq!(book.best_ask().unwrap().total_qty, u32::MAX as u64);

    book.add_limit_order(Side::Buy, 1, 1, 4, 2);
    assert_eq!(book.best_bid().unwrap().price, 1);
}

#[test]
fn random_churn_with_invariant_checks() {
    const SEED: u64 = 0x57AE_5500;
    const OPS: usize = 20_000;
    const CAPACITY: u32 = 5_000;

    let (mut book, _trades) = make_book(CAPACITY);
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut resting: Vec<u64> = Vec::new();
    let mut next_id = 1u64;

    for op in 0..OPS {
        let near_full = book.live_orders() > CAPACITY - 8;
        if !near_full && (resting.is_empty() || rng.gen_bool(0.6)) {
            let id = next_id;
            next_id += 1;
            let side = if rng.gen_bool(0.5) {
                Side::Buy
            } else {
                Side::Sell
            };
            book.add_limit_order(
                side,
                rng.gen_range(9_900..10_100),
                rng.gen_range(1..100),
                id,
                rng.gen_range(1..10),
            );
            if book.contains_order(id) {
                resting.push(id);
            }
        } else if !resting.is_empty() {
            let pos = rng.gen_range(0..resting.len());
            book.cancel_order(resting.swap_remove(pos));
        }

        assert_eq!(
            book.live_orders() as usize,
            book.order_count(),
            "arena/index drift at op {op}"
        );
        if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
            assert!(bid.price < ask.price, "crossed book at op {op}");
        }
    }
}

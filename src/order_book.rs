//! Order book - the matching engine core.
//!
//! Owns the arena, both side books, the order-id index, and the sequence
//! counter. Incoming limit orders cross against the opposite side under
//! strict price-time priority, with participant-based self-match
//! prevention; the remainder rests. Fills are reported inline through the
//! caller-supplied trade sink.
//!
//! After construction nothing on the hot path allocates: the arena and
//! side books are pre-reserved, and the order index is reserved to arena
//! capacity.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::arena::{Arena, ArenaIndex};
use crate::book_side::BookSide;
use crate::config::{BookConfig, ConfigError};
use crate::events::{LevelView, Side, Trade, TradeSink};
use crate::price_level::PriceLevel;

/// Single-symbol limit order book with price-time priority matching.
///
/// One instance, one thread: every operation runs to completion before
/// returning, with the trade sink invoked inline. The sink must not
/// reenter the engine.
pub struct OrderBook<S: TradeSink> {
    /// Slab of order nodes, sized to peak concurrent live orders
    arena: Arena,
    /// Bid levels, ascending price, best (highest) at the back
    bids: BookSide,
    /// Ask levels, descending price, best (lowest) at the back
    asks: BookSide,
    /// order_id -> arena slot, for O(1) cancel; holds resting orders only
    order_index: FxHashMap<u64, ArenaIndex>,
    /// Stamped onto every acquired order, then incremented
    sequence: u64,
    /// Fill consumer
    sink: S,
}

impl<S: TradeSink> OrderBook<S> {
    /// Create an order book sized for `capacity` simultaneously live
    /// orders, with the default price-level reservation.
    ///
    /// # Panics
    /// Panics if the implied [`BookConfig`] is invalid (zero or
    /// sentinel-colliding capacity).
    pub fn new(capacity: u32, sink: S) -> Self {
        match Self::with_config(BookConfig::new(capacity), sink) {
            Ok(book) => book,
            Err(e) => panic!("invalid order book capacity {capacity}: {e}"),
        }
    }

    /// Create an order book from a validated [`BookConfig`].
    pub fn with_config(config: BookConfig, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;

        debug!(
            capacity = config.capacity,
            max_price_levels = config.max_price_levels,
            "order book initialised"
        );

        Ok(Self {
            arena: Arena::new(config.capacity),
            bids: BookSide::new(Side::Buy, config.max_price_levels),
            asks: BookSide::new(Side::Sell, config.max_price_levels),
            order_index: FxHashMap::with_capacity_and_hasher(
                config.capacity as usize,
                Default::default(),
            ),
            sequence: 0,
            sink,
        })
    }

    // ========================================================================
    // Public operations
    // ========================================================================

    /// Submit a limit order.
    ///
    /// Matches against the opposite side while the limit crosses, emitting
    /// one trade per fill at the resting order's price; any remainder
    /// rests on the order's own side. An incoming order that reaches one
    /// of its own participant's orders at the opposite best is cancelled
    /// (its preceding fills stand).
    ///
    /// # Panics
    /// Panics if the arena is exhausted - `capacity` must cover the peak
    /// number of simultaneously live orders.
    pub fn add_limit_order(
        &mut self,
        side: Side,
        price: u32,
        quantity: u32,
        order_id: u64,
        participant_id: u64,
    ) {
        debug_assert!(quantity > 0, "orders must carry quantity");

        let incoming = match self.arena.alloc() {
            Some(idx) => idx,
            None => panic!(
                "order arena exhausted (capacity {}): size capacity to peak live orders",
                self.arena.capacity()
            ),
        };

        let seq = self.sequence;
        self.sequence += 1;

        {
            let node = self.arena.get_mut(incoming);
            node.order_id = order_id;
            node.participant_id = participant_id;
            node.seq = seq;
            node.price = price;
            node.qty = quantity;
            node.side = side;
        }

        let crosses = match side {
            Side::Buy => self.asks.best().map_or(false, |pl| price >= pl.price),
            Side::Sell => self.bids.best().map_or(false, |pl| price <= pl.price),
        };
        if crosses {
            self.execute_match(incoming);
        }

        if self.arena.get(incoming).qty > 0 {
            let book = match side {
                Side::Buy => &mut self.bids,
                Side::Sell => &mut self.asks,
            };
            book.find_or_create(price).push_back(&mut self.arena, incoming);

            let previous = self.order_index.insert(order_id, incoming);
            debug_assert!(previous.is_none(), "duplicate order id {order_id}");
        } else {
            // Fully filled or self-match-cancelled on the way in
            self.arena.free(incoming);
        }
    }

    /// Cancel a resting order by id. Unknown (or already removed) ids are
    /// a silent no-op.
    pub fn cancel_order(&mut self, order_id: u64) {
        let idx = match self.order_index.get(&order_id) {
            Some(&idx) => idx,
            None => {
                trace!(order_id, "cancel for unknown order ignored");
                return;
            }
        };

        let (side, price) = {
            let node = self.arena.get(idx);
            debug_assert!(node.qty > 0, "indexed order with zero quantity");
            (node.side, node.price)
        };

        let book = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let pos = book
            .find(price)
            .expect("order indexed but its price level is missing");

        let level = book.level_mut(pos);
        level.remove(&mut self.arena, idx);
        if level.is_empty() {
            book.erase(pos);
        }

        self.order_index.remove(&order_id);
        self.arena.free(idx);
    }

    /// Snapshot of the best bid level, or `None` if the bid side is empty.
    #[inline]
    pub fn best_bid(&self) -> Option<LevelView> {
        self.bids.best().map(Self::view)
    }

    /// Snapshot of the best ask level, or `None` if the ask side is empty.
    #[inline]
    pub fn best_ask(&self) -> Option<LevelView> {
        self.asks.best().map(Self::view)
    }

    // ========================================================================
    // Match loop
    // ========================================================================

    /// Drain the opposite side against `incoming` while it crosses.
    ///
    /// Exits when the incoming is exhausted, the opposite side no longer
    /// crosses (or empties), or self-match prevention consumes the
    /// incoming.
    fn execute_match(&mut self, incoming: ArenaIndex) {
        let (incoming_side, limit_price, incoming_id, incoming_participant) = {
            let node = self.arena.get(incoming);
            (node.side, node.price, node.order_id, node.participant_id)
        };

        loop {
            let incoming_qty = self.arena.get(incoming).qty;
            if incoming_qty == 0 {
                break;
            }

            let book = match incoming_side {
                Side::Buy => &mut self.asks,
                Side::Sell => &mut self.bids,
            };
            let level = match book.best_mut() {
                Some(level) => level,
                None => break,
            };
            if !incoming_side.crosses(limit_price, level.price) {
                break;
            }

            let resting_idx = level.front();
            let (resting_id, resting_participant, resting_qty) = {
                let resting = self.arena.get(resting_idx);
                (resting.order_id, resting.participant_id, resting.qty)
            };

            if resting_participant == incoming_participant {
                // Self-match prevention: consume the incoming, leave the
                // resting order untouched. Fills already emitted stand.
                trace!(
                    order_id = incoming_id,
                    participant_id = incoming_participant,
                    "self-match prevented, incoming cancelled"
                );
                self.arena.get_mut(incoming).qty = 0;
                break;
            }

            let fill_qty = incoming_qty.min(resting_qty);
            let level_price = level.price;

            self.arena.get_mut(incoming).qty -= fill_qty;
            self.arena.get_mut(resting_idx).qty -= fill_qty;
            level.subtract_qty(fill_qty);

            let trade = match incoming_side {
                Side::Buy => Trade {
                    buy_order_id: incoming_id,
                    sell_order_id: resting_id,
                    price: level_price,
                    quantity: fill_qty,
                },
                Side::Sell => Trade {
                    buy_order_id: resting_id,
                    sell_order_id: incoming_id,
                    price: level_price,
                    quantity: fill_qty,
                },
            };
            self.sink.on_trade(trade);

            if resting_qty == fill_qty {
                // Resting order fully filled: splice it out of the head
                level.remove(&mut self.arena, resting_idx);
                self.order_index.remove(&resting_id);
                self.arena.free(resting_idx);
            }

            if level.is_empty() {
                // Drained the best level; it sits at the back, so O(1)
                book.pop_best();
            }
        }
    }

    // ========================================================================
    // Read views
    // ========================================================================

    #[inline]
    fn view(level: &PriceLevel) -> LevelView {
        LevelView {
            price: level.price,
            total_qty: level.total_qty,
            order_count: level.count,
        }
    }

    /// Snapshot of the level at `price` on `side`, if present.
    pub fn depth_at(&self, side: Side, price: u32) -> Option<LevelView> {
        let book = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        book.find(price).map(|pos| Self::view(book.level(pos)))
    }

    /// Level snapshots for one side, best price first.
    pub fn levels(&self, side: Side) -> impl Iterator<Item = LevelView> + '_ {
        let book = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        book.iter_best_first().map(Self::view)
    }

    /// Best-ask minus best-bid, when both sides are populated.
    pub fn spread(&self) -> Option<u32> {
        match (self.bids.best(), self.asks.best()) {
            (Some(bid), Some(ask)) => Some(ask.price - bid.price),
            _ => None,
        }
    }

    /// Number of resting orders.
    #[inline]
    pub fn order_count(&self) -> usize {
        self.order_index.len()
    }

    /// Whether `order_id` is currently resting.
    #[inline]
    pub fn contains_order(&self, order_id: u64) -> bool {
        self.order_index.contains_key(&order_id)
    }

    /// Number of distinct bid price levels.
    #[inline]
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    /// Number of distinct ask price levels.
    #[inline]
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    /// True when nothing rests on either side.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order_index.is_empty()
    }

    /// Arena capacity (peak simultaneously live orders).
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.arena.capacity()
    }

    /// Orders currently occupying arena slots.
    #[inline]
    pub fn live_orders(&self) -> u32 {
        self.arena.allocated()
    }

    /// Free arena slots.
    #[inline]
    pub fn free_slots(&self) -> u32 {
        self.arena.free_count()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Pre-fault the arena's pages before steady-state use.
    pub fn warm_up(&mut self) {
        self.arena.warm_up();
    }

    /// Empty the book without dropping its reservations. The sequence
    /// counter is preserved.
    pub fn clear(&mut self) {
        self.arena.reset();
        self.bids.clear();
        self.asks.clear();
        self.order_index.clear();
    }
}

impl<S: TradeSink> std::fmt::Debug for OrderBook<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBook")
            .field("best_bid", &self.bids.best().map(|pl| pl.price))
            .field("best_ask", &self.asks.best().map(|pl| pl.price))
            .field("bid_levels", &self.bids.len())
            .field("ask_levels", &self.asks.len())
            .field("order_count", &self.order_index.len())
            .field("sequence", &self.sequence)
            .finish()
    }
}

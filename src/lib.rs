//! # pricetime
//!
//! A single-symbol limit order book and matching engine with strict
//! price-time priority.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: one thread owns the book exclusively (no locks)
//! - **Zero-Allocation Hot Path**: arena-backed orders, pre-reserved
//!   side books and order index; adds, matches, and cancels allocate
//!   nothing in steady state
//! - **Price-Time Priority**: best level first across the book, FIFO
//!   within a level
//! - **Self-Match Prevention**: an incoming order that reaches one of its
//!   own participant's resting orders is cancelled, not traded
//!
//! ## Architecture
//!
//! ```text
//! add/cancel --> [OrderBook] --> Trade events (caller-supplied sink)
//!                  |  |  |
//!           [Arena] [BookSide x2] [order index]
//! ```
//!
//! Orders live in a fixed-capacity [`Arena`] of cache-line-sized nodes,
//! linked into per-price FIFO queues ([`PriceLevel`]). Each side keeps
//! its levels in a sorted sequence ([`BookSide`]) with the best price at
//! the back, so best-price access and drained-level removal are O(1).
//!
//! ## Example
//!
//! ```
//! use pricetime::{OrderBook, Side, Trade};
//!
//! let mut trades = Vec::new();
//! let mut book = OrderBook::new(1024, |t: Trade| trades.push(t));
//!
//! book.add_limit_order(Side::Sell, 100, 50, 1, 100);
//! book.add_limit_order(Side::Buy, 105, 50, 2, 200);
//!
//! // The fill executes at the resting price
//! assert_eq!(book.best_ask(), None);
//! ```

pub mod arena;
pub mod book_side;
pub mod config;
pub mod events;
pub mod order_book;
pub mod price_level;

// Re-exports for convenience
pub use arena::{Arena, ArenaIndex, OrderNode, NULL_INDEX};
pub use book_side::BookSide;
pub use config::{BookConfig, ConfigError, DEFAULT_MAX_PRICE_LEVELS};
pub use events::{LevelView, Side, Trade, TradeSink};
pub use order_book::OrderBook;
pub use price_level::PriceLevel;

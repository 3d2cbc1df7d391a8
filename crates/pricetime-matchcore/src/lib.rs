//! # pricetime-matchcore
//!
//! **Continuous limit order book with strict price-time priority.**
//!
//! - **Price priority**: a better-priced resting order always trades first
//! - **Time priority**: equal prices fill in arrival order
//! - **Maker price**: every trade executes at the resting order's price
//! - **No tombstones**: filled and cancelled orders are unlinked at once,
//!   and empty levels are dropped immediately
//!
//! [`OrderBook`] is the public surface; the other modules are its parts.

pub mod arena;
pub mod matcher;
pub mod order_index;
pub mod orderbook;
pub mod price_level;
pub mod side_book;

pub use matcher::Matcher;
pub use order_index::OrderIndex;
pub use orderbook::OrderBook;
pub use price_level::PriceLevel;
pub use side_book::SideBook;

//! # pricetime-engine
//!
//! Runs one [`OrderBook`](pricetime_matchcore::OrderBook) per tokio task.
//!
//! Matching is sequential by nature, so concurrent callers are serialized
//! through a bounded single-consumer queue instead of sharing the book
//! behind a lock. Each command runs to completion before the next one is
//! dequeued; books for different instruments run as independent actors.

pub mod actor;
pub mod telemetry;

pub use actor::{BookActor, BookCommand, BookHandle, BookSnapshot};
pub use telemetry::init_tracing;

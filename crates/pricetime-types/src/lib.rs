//! # pricetime-types
//!
//! Shared types, errors, and configuration for the **pricetime** order book.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`TradeId`]
//! - **Order model**: [`Order`], [`Side`], [`OrderType`]
//! - **Execution model**: [`Trade`], [`Fill`], [`MarketExecution`]
//! - **Book views**: [`Depth`], [`DepthLevel`], [`BookStats`]
//! - **Configuration**: [`BookConfig`]
//! - **Errors**: [`BookError`] with `PT_ERR_` prefix codes
//! - **Constants**: defaults and limits

pub mod config;
pub mod constants;
pub mod depth;
pub mod error;
pub mod ids;
pub mod order;
pub mod stats;
pub mod trade;

// Re-export all primary types at crate root:
//   use pricetime_types::{Order, Side, Trade, ...};

pub use config::*;
pub use depth::*;
pub use error::*;
pub use ids::*;
pub use order::*;
pub use stats::*;
pub use trade::*;

/// Integer quantity of the traded instrument.
pub type Quantity = u64;

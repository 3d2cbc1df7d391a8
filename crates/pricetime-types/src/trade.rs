//! Execution records produced by the matcher.
//!
//! A [`Trade`] is the immutable record of one fill between an incoming
//! (taker) order and a resting (maker) order. It always executes at the
//! maker's price.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{OrderId, Quantity, Side, TradeId};

/// A fill between an incoming order and a resting order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Book-assigned, strictly increasing.
    pub id: TradeId,
    /// The resting (maker) order.
    pub maker_order_id: OrderId,
    /// The incoming (taker) order.
    pub taker_order_id: OrderId,
    /// Which side the taker was on.
    pub taker_side: Side,
    /// Execution price: the maker's limit price.
    pub price: Decimal,
    /// Executed quantity, always > 0.
    pub quantity: Quantity,
    /// Arrival sequence of the taker order.
    pub sequence: u64,
    pub executed_at: DateTime<Utc>,
}

impl Trade {
    /// Quote amount = price × quantity.
    #[must_use]
    pub fn notional(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    /// Returns `true` if the taker was buying.
    #[must_use]
    pub fn taker_is_buyer(&self) -> bool {
        self.taker_side == Side::Buy
    }

    /// `(buyer, seller)` order ids.
    #[must_use]
    pub fn counterparties(&self) -> (OrderId, OrderId) {
        match self.taker_side {
            Side::Buy => (self.taker_order_id, self.maker_order_id),
            Side::Sell => (self.maker_order_id, self.taker_order_id),
        }
    }
}

impl std::fmt::Display for Trade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Trade[{}] {} {} @ {} (maker {}, taker {})",
            self.id, self.taker_side, self.quantity, self.price, self.maker_order_id,
            self.taker_order_id,
        )
    }
}

/// One `(price, quantity)` fill of a market sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub price: Decimal,
    pub quantity: Quantity,
}

impl From<(Decimal, Quantity)> for Fill {
    fn from((price, quantity): (Decimal, Quantity)) -> Self {
        Self { price, quantity }
    }
}

/// Result of sweeping the book with a market order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketExecution {
    pub side: Side,
    pub requested: Quantity,
    /// Fills in execution order, one per resting order touched.
    pub fills: Vec<Fill>,
    /// Quantity that found no liquidity and was discarded.
    pub unfilled: Quantity,
}

impl MarketExecution {
    #[must_use]
    pub fn filled(&self) -> Quantity {
        self.requested.saturating_sub(self.unfilled)
    }

    /// Volume-weighted average execution price. `None` without fills or when
    /// the notional exceeds the `Decimal` range.
    #[must_use]
    pub fn average_price(&self) -> Option<Decimal> {
        let filled = self.filled();
        if filled == 0 {
            return None;
        }
        let notional = self.fills.iter().try_fold(Decimal::ZERO, |acc, f| {
            acc.checked_add(f.price.checked_mul(Decimal::from(f.quantity))?)
        })?;
        notional.checked_div(Decimal::from(filled))
    }
}

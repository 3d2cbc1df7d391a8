//! Running counters kept by every book.

use serde::{Deserialize, Serialize};

use crate::Quantity;

/// Lifetime activity counters for one book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookStats {
    /// Orders accepted by `add_order` (limit and market).
    pub orders_admitted: u64,
    /// Orders that left a resting remainder.
    pub orders_rested: u64,
    pub orders_cancelled: u64,
    pub orders_modified: u64,
    /// Market sweeps via `execute_market_order`.
    pub market_sweeps: u64,
    /// Individual fills, including market sweep fills.
    pub trades: u64,
    /// Total traded quantity.
    pub volume: Quantity,
}

impl BookStats {
    /// Records one fill of `quantity`. Counters saturate instead of
    /// wrapping.
    pub fn record_fill(&mut self, quantity: Quantity) {
        self.trades = self.trades.saturating_add(1);
        self.volume = self.volume.saturating_add(quantity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_fill_accumulates() {
        let mut stats = BookStats::default();
        stats.record_fill(8);
        stats.record_fill(4);
        assert_eq!(stats.trades, 2);
        assert_eq!(stats.volume, 12);
    }

    #[test]
    fn volume_saturates_at_max() {
        let mut stats = BookStats::default();
        stats.record_fill(Quantity::MAX);
        stats.record_fill(1);
        assert_eq!(stats.trades, 2);
        assert_eq!(stats.volume, Quantity::MAX);
    }
}

//! Aggregated views of the book returned by depth queries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Quantity;

/// Total resting interest at one price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: Decimal,
    /// Sum of remaining quantity over every live order at this price.
    pub quantity: Quantity,
    pub order_count: usize,
}

/// Top-of-book levels per side, best price first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Depth {
    /// Highest price first.
    pub bids: Vec<DepthLevel>,
    /// Lowest price first.
    pub asks: Vec<DepthLevel>,
}

impl Depth {
    /// `(price, quantity)` pairs for the bid side.
    #[must_use]
    pub fn bid_pairs(&self) -> Vec<(Decimal, Quantity)> {
        self.bids.iter().map(|l| (l.price, l.quantity)).collect()
    }

    /// `(price, quantity)` pairs for the ask side.
    #[must_use]
    pub fn ask_pairs(&self) -> Vec<(Decimal, Quantity)> {
        self.asks.iter().map(|l| (l.price, l.quantity)).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_preserve_order() {
        let depth = Depth {
            bids: vec![
                DepthLevel {
                    price: Decimal::new(100, 0),
                    quantity: 15,
                    order_count: 2,
                },
                DepthLevel {
                    price: Decimal::new(99, 0),
                    quantity: 3,
                    order_count: 1,
                },
            ],
            asks: vec![DepthLevel {
                price: Decimal::new(110, 0),
                quantity: 8,
                order_count: 1,
            }],
        };
        assert_eq!(
            depth.bid_pairs(),
            vec![(Decimal::new(100, 0), 15), (Decimal::new(99, 0), 3)]
        );
        assert_eq!(depth.ask_pairs(), vec![(Decimal::new(110, 0), 8)]);
        assert!(!depth.is_empty());
        assert!(Depth::default().is_empty());
    }
}

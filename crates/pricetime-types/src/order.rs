//! Order types for the pricetime order book.
//!
//! An [`Order`] has an immutable identity (id, side, type) and a mutable
//! remaining quantity. The arrival `sequence` is stamped by the book at
//! admission and is the explicit time-priority key.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BookError, OrderId, Quantity, Result};

/// Which side of the book this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side an order of this side trades against.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Parses `buy`/`sell` in any letter case. Anything else is
/// [`BookError::InvalidSide`], so a bad side never reaches the matcher.
impl FromStr for Side {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            _ => Err(BookError::InvalidSide(s.to_string())),
        }
    }
}

/// The type of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderType {
    /// Trades up to its limit price; any remainder rests.
    Limit,
    /// Trades at any price; any remainder is discarded.
    Market,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Limit => write!(f, "LIMIT"),
            Self::Market => write!(f, "MARKET"),
        }
    }
}

/// Core order struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub order_type: OrderType,
    /// Limit price. `None` for market orders.
    pub price: Option<Decimal>,
    /// Quantity at admission (adjusted by quantity modifications).
    pub quantity: Quantity,
    pub remaining: Quantity,
    /// Arrival sequence, assigned by the book at admission.
    pub sequence: u64,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// A limit order for `quantity` at `price`.
    #[must_use]
    pub fn limit(id: u64, side: Side, price: Decimal, quantity: Quantity) -> Self {
        Self {
            id: OrderId(id),
            side,
            order_type: OrderType::Limit,
            price: Some(price),
            quantity,
            remaining: quantity,
            sequence: 0,
            created_at: Utc::now(),
        }
    }

    /// A market order for `quantity`. Never rests.
    #[must_use]
    pub fn market(id: u64, side: Side, quantity: Quantity) -> Self {
        Self {
            id: OrderId(id),
            side,
            order_type: OrderType::Market,
            price: None,
            quantity,
            remaining: quantity,
            sequence: 0,
            created_at: Utc::now(),
        }
    }

    /// Admission checks. `tick_size`, when set, must divide the limit price.
    pub fn validate(&self, tick_size: Option<Decimal>) -> Result<()> {
        if self.quantity == 0 {
            return Err(BookError::invalid(format!("{}: quantity must be > 0", self.id)));
        }
        if self.remaining != self.quantity {
            return Err(BookError::invalid(format!(
                "{}: remaining {} differs from quantity {} on a new order",
                self.id, self.remaining, self.quantity
            )));
        }
        match (self.order_type, self.price) {
            (OrderType::Limit, None) => Err(BookError::invalid(format!(
                "{}: limit order without a price",
                self.id
            ))),
            (OrderType::Limit, Some(price)) => validate_price(price, tick_size),
            (OrderType::Market, Some(_)) => Err(BookError::invalid(format!(
                "{}: market order must not carry a price",
                self.id
            ))),
            (OrderType::Market, None) => Ok(()),
        }
    }

    /// Whether this order, as the incoming side, trades against a resting
    /// level at `level_price`.
    #[must_use]
    pub fn crosses(&self, level_price: Decimal) -> bool {
        if self.is_market() {
            return true;
        }
        match (self.side, self.price) {
            (Side::Buy, Some(limit)) => limit >= level_price,
            (Side::Sell, Some(limit)) => limit <= level_price,
            (_, None) => false,
        }
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.remaining == 0
    }

    #[must_use]
    pub fn filled_qty(&self) -> Quantity {
        self.quantity.saturating_sub(self.remaining)
    }

    #[must_use]
    pub fn is_market(&self) -> bool {
        self.order_type == OrderType::Market
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.price {
            Some(price) => write!(
                f,
                "Order[{}] {} {} {}/{} @ {}",
                self.id, self.order_type, self.side, self.remaining, self.quantity, price
            ),
            None => write!(
                f,
                "Order[{}] {} {} {}/{}",
                self.id, self.order_type, self.side, self.remaining, self.quantity
            ),
        }
    }
}

/// A limit price must be strictly positive and on the tick grid.
pub fn validate_price(price: Decimal, tick_size: Option<Decimal>) -> Result<()> {
    if price <= Decimal::ZERO {
        return Err(BookError::invalid(format!("price {price} must be > 0")));
    }
    if let Some(tick) = tick_size {
        if !(price % tick).is_zero() {
            return Err(BookError::invalid(format!(
                "price {price} is not a multiple of tick size {tick}"
            )));
        }
    }
    Ok(())
}

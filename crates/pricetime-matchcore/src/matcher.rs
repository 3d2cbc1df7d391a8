//! Continuous price-time priority matcher.
//!
//! ## Algorithm
//!
//! 1. Take the best opposite level; stop if it does not cross
//! 2. Fill its orders front to back: `qty = min(incoming, resting)`
//! 3. Every fill executes at the resting level's price
//! 4. Fully filled resting orders leave the level, the index and the arena
//! 5. An emptied level leaves the side book before the next price is tried
//! 6. Stop when the incoming quantity is exhausted or nothing crosses
//!
//! Price priority comes from always taking the *best* level next; time
//! priority comes from the level's FIFO.

use chrono::Utc;
use pricetime_types::{Fill, MarketExecution, Order, Quantity, Side, Trade, TradeId};
use rust_decimal::Decimal;

use crate::arena::OrderArena;
use crate::order_index::OrderIndex;
use crate::side_book::SideBook;

/// The structures a match pass consumes: the side being traded against,
/// plus the storage and index its orders are registered in.
pub struct MatchContext<'a> {
    pub opposite: &'a mut SideBook,
    pub arena: &'a mut OrderArena,
    pub index: &'a mut OrderIndex,
}

/// Owns the trade id counter for one book.
#[derive(Debug, Clone)]
pub struct Matcher {
    next_trade_id: TradeId,
}

impl Matcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_trade_id: TradeId(1),
        }
    }

    /// Id the next trade will receive.
    #[must_use]
    pub fn peek_trade_id(&self) -> TradeId {
        self.next_trade_id
    }

    /// Match `incoming` against the opposite side, decrementing its
    /// `remaining`. Returns trades in execution order. The remainder is left
    /// on `incoming` for the caller to rest or discard.
    pub fn match_order(&mut self, incoming: &mut Order, ctx: MatchContext<'_>) -> Vec<Trade> {
        let mut trades = Vec::new();
        let mut remaining = incoming.remaining;
        let (taker_id, taker_side, sequence) = (incoming.id, incoming.side, incoming.sequence);
        let executed_at = Utc::now();
        let next_trade_id = &mut self.next_trade_id;
        let probe: &Order = incoming;

        walk(
            &mut remaining,
            |level_price| probe.crosses(level_price),
            ctx,
            |maker, price, quantity| {
                let trade = Trade {
                    id: *next_trade_id,
                    maker_order_id: maker.id,
                    taker_order_id: taker_id,
                    taker_side,
                    price,
                    quantity,
                    sequence,
                    executed_at,
                };
                *next_trade_id = next_trade_id.next();

                tracing::debug!(
                    trade_id = %trade.id,
                    maker = %trade.maker_order_id,
                    taker = %trade.taker_order_id,
                    side = %taker_side,
                    price = %trade.price,
                    qty = trade.quantity,
                    "Trade matched"
                );
                trades.push(trade);
            },
        );

        incoming.remaining = remaining;
        trades
    }

    /// Sweep the side opposite to `side` with an unpriced order of
    /// `quantity`. Whatever finds no liquidity is reported as `unfilled`.
    pub fn sweep(
        &mut self,
        side: Side,
        quantity: Quantity,
        ctx: MatchContext<'_>,
    ) -> MarketExecution {
        let mut fills = Vec::new();
        let mut remaining = quantity;

        walk(
            &mut remaining,
            |_| true,
            ctx,
            |maker, price, qty| {
                tracing::debug!(
                    maker = %maker.id,
                    side = %side,
                    price = %price,
                    qty,
                    "Market sweep fill"
                );
                fills.push(Fill {
                    price,
                    quantity: qty,
                });
            },
        );

        MarketExecution {
            side,
            requested: quantity,
            fills,
            unfilled: remaining,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Core walk shared by limit matching and market sweeps.
///
/// `on_fill` sees the resting order after its quantity was decremented,
/// the execution price, and the fill quantity.
fn walk(
    remaining: &mut Quantity,
    crosses: impl Fn(Decimal) -> bool,
    ctx: MatchContext<'_>,
    mut on_fill: impl FnMut(&Order, Decimal, Quantity),
) {
    let MatchContext {
        opposite,
        arena,
        index,
    } = ctx;

    'levels: while *remaining > 0 {
        let Some(level) = opposite.best_level_mut() else {
            break;
        };
        let level_price = level.price;
        if !crosses(level_price) {
            break;
        }

        while *remaining > 0 {
            let Some(slot) = level.front() else {
                break;
            };
            let Some(maker) = arena.get_mut(slot) else {
                tracing::error!(price = %level_price, "Level links a free arena slot");
                break 'levels;
            };

            let qty = (*remaining).min(maker.remaining);
            maker.remaining -= qty;
            *remaining -= qty;
            if qty > 0 {
                on_fill(maker, level_price, qty);
            }

            if maker.remaining == 0 {
                let maker_id = maker.id;
                level.unlink(arena, slot);
                arena.remove(slot);
                index.remove(maker_id);
            }
        }

        if level.is_empty() {
            opposite.remove_if_empty(level_price);
        }
    }
}

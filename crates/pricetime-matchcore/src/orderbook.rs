//! The order book for a single instrument.
//!
//! Composes two [`SideBook`]s, the [`OrderIndex`], the [`OrderArena`] that
//! stores resting orders, and the [`Matcher`]:
//! - **Bids**: highest price first
//! - **Asks**: lowest price first
//! - **Index**: `OrderId -> (side, price, slot)` for O(1) cancel and modify
//!
//! Every operation either applies fully or fails with no mutation.

use std::fmt;

use pricetime_types::{
    BookConfig, BookError, BookStats, Depth, MarketExecution, Order, OrderId, OrderType,
    Quantity, Result, Side, Trade, TradeId, validate_price,
};
use rust_decimal::Decimal;

use crate::arena::OrderArena;
use crate::matcher::{MatchContext, Matcher};
use crate::order_index::{IndexEntry, OrderIndex};
use crate::side_book::SideBook;

/// The order book for a single instrument.
#[derive(Debug, Clone)]
pub struct OrderBook {
    config: BookConfig,
    bids: SideBook,
    asks: SideBook,
    index: OrderIndex,
    arena: OrderArena,
    matcher: Matcher,
    /// Next arrival sequence to stamp.
    next_sequence: u64,
    stats: BookStats,
}

impl OrderBook {
    /// Create an empty book with default configuration.
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::build(BookConfig::new(symbol))
    }

    /// Create an empty book from a validated configuration.
    pub fn with_config(config: BookConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: BookConfig) -> Self {
        Self {
            bids: SideBook::new(Side::Buy),
            asks: SideBook::new(Side::Sell),
            index: OrderIndex::with_capacity(config.initial_capacity),
            arena: OrderArena::with_capacity(config.initial_capacity),
            matcher: Matcher::new(),
            next_sequence: 1,
            stats: BookStats::default(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    // =================================================================
    // Admission
    // =================================================================

    /// Match `order` against the opposite side, then rest any limit
    /// remainder at the tail of its price level.
    ///
    /// Returns trades in execution order. The arrival sequence on `order`
    /// is overwritten by the book.
    pub fn add_order(&mut self, mut order: Order) -> Result<Vec<Trade>> {
        if let Err(err) = order.validate(self.config.tick_size) {
            tracing::warn!(
                symbol = %self.config.symbol,
                order = %order.id,
                %err,
                "Order rejected"
            );
            return Err(err);
        }
        if self.index.contains(order.id) {
            tracing::warn!(
                symbol = %self.config.symbol,
                order = %order.id,
                "Duplicate order rejected"
            );
            return Err(BookError::DuplicateOrder(order.id));
        }

        order.sequence = self.take_sequence();
        self.stats.orders_admitted += 1;

        let (matcher, ctx) = self.match_parts(order.side);
        let trades = matcher.match_order(&mut order, ctx);
        for trade in &trades {
            self.stats.record_fill(trade.quantity);
        }

        match (order.order_type, order.price) {
            (OrderType::Limit, Some(price)) if order.remaining > 0 => self.rest(order, price),
            (OrderType::Market, _) if order.remaining > 0 => {
                tracing::debug!(
                    order = %order.id,
                    unfilled = order.remaining,
                    "Market order remainder discarded"
                );
            }
            _ => {}
        }

        Ok(trades)
    }

    /// Sweep the side opposite to `side` for up to `quantity`. Market
    /// liquidity never rests; the unmatched part is reported as `unfilled`.
    pub fn execute_market_order(
        &mut self,
        side: Side,
        quantity: Quantity,
    ) -> Result<MarketExecution> {
        if quantity == 0 {
            return Err(BookError::InvalidOrder {
                reason: "market order quantity must be > 0".into(),
            });
        }

        self.stats.market_sweeps += 1;
        let (matcher, ctx) = self.match_parts(side);
        let execution = matcher.sweep(side, quantity, ctx);
        for fill in &execution.fills {
            self.stats.record_fill(fill.quantity);
        }

        tracing::debug!(
            symbol = %self.config.symbol,
            %side,
            requested = quantity,
            filled = execution.filled(),
            unfilled = execution.unfilled,
            "Market order executed"
        );
        Ok(execution)
    }

    // =================================================================
    // Cancellation / modification
    // =================================================================

    /// Remove a resting order. Returns it as it was at cancel time.
    pub fn cancel_order(&mut self, id: OrderId) -> Result<Order> {
        let order = self.detach(id)?;
        self.stats.orders_cancelled += 1;
        tracing::debug!(order = %id, remaining = order.remaining, "Order cancelled");
        Ok(order)
    }

    /// Change a resting order's price and/or quantity.
    ///
    /// - A new price moves the order to the tail of the new level and gives
    ///   it a fresh arrival sequence.
    /// - A quantity-only change keeps the order's place in the queue.
    /// - A new quantity of 0 removes the order; the returned copy has
    ///   `remaining == 0`.
    ///
    /// Modifications never trade, even if the new price crosses the book.
    pub fn modify_order(
        &mut self,
        id: OrderId,
        new_price: Option<Decimal>,
        new_quantity: Option<Quantity>,
    ) -> Result<Order> {
        let entry = self.locate(id)?;
        if let Some(price) = new_price {
            validate_price(price, self.config.tick_size)?;
        }
        let resized = match (new_quantity, self.arena.get(entry.slot)) {
            (Some(quantity), Some(order)) if quantity > 0 => {
                let total = order.filled_qty().checked_add(quantity).ok_or_else(|| {
                    BookError::InvalidOrder {
                        reason: format!("{id}: quantity {quantity} overflows the filled amount"),
                    }
                })?;
                Some((total, quantity))
            }
            _ => None,
        };

        if new_quantity == Some(0) {
            let mut order = self.detach(id)?;
            order.quantity = order.filled_qty();
            order.remaining = 0;
            self.stats.orders_modified += 1;
            self.stats.orders_cancelled += 1;
            tracing::debug!(order = %id, "Order modified to zero quantity, removed");
            return Ok(order);
        }

        if let (Some((total, quantity)), Some(order)) = (resized, self.arena.get_mut(entry.slot)) {
            order.quantity = total;
            order.remaining = quantity;
        }

        if let Some(price) = new_price.filter(|p| *p != entry.price) {
            let sequence = self.take_sequence();
            let book = match entry.side {
                Side::Buy => &mut self.bids,
                Side::Sell => &mut self.asks,
            };
            if let Some(level) = book.level_mut(entry.price) {
                level.unlink(&mut self.arena, entry.slot);
            }
            book.remove_if_empty(entry.price);
            book.level_or_insert(price).push_back(&mut self.arena, entry.slot);
            self.index.relocate(id, price);
            if let Some(order) = self.arena.get_mut(entry.slot) {
                order.price = Some(price);
                order.sequence = sequence;
            }

            if self.is_crossed() {
                tracing::warn!(
                    symbol = %self.config.symbol,
                    order = %id,
                    %price,
                    "Modified price crosses the book; no matching is performed"
                );
            }
        }

        self.stats.orders_modified += 1;
        let order = self
            .arena
            .get(entry.slot)
            .cloned()
            .ok_or_else(|| BookError::Internal(format!("{id} lost its arena slot")))?;
        tracing::debug!(
            order = %id,
            price = ?order.price,
            remaining = order.remaining,
            "Order modified"
        );
        Ok(order)
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Best (highest) bid price, or `None` if no bids.
    #[must_use]
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.best_price()
    }

    /// Best (lowest) ask price, or `None` if no asks.
    #[must_use]
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.best_price()
    }

    /// Spread = best_ask - best_bid. `None` if either side is empty.
    #[must_use]
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Mid price = (best_bid + best_ask) / 2. `None` if either side is empty.
    ///
    /// Computed as `bid + spread / 2` so prices near `Decimal::MAX` cannot
    /// overflow the sum.
    #[must_use]
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(bid + (ask - bid) / Decimal::TWO),
            _ => None,
        }
    }

    /// Up to `levels` aggregated price levels per side, best first.
    #[must_use]
    pub fn depth(&self, levels: usize) -> Depth {
        Depth {
            bids: self.bids.depth(levels, &self.arena),
            asks: self.asks.depth(levels, &self.arena),
        }
    }

    /// [`depth`](Self::depth) with the configured default level count.
    #[must_use]
    pub fn default_depth(&self) -> Depth {
        self.depth(self.config.default_depth)
    }

    /// A resting order by id.
    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.index
            .get(id)
            .and_then(|entry| self.arena.get(entry.slot))
    }

    /// Resting orders at one price, in time priority.
    #[must_use]
    pub fn level_orders(&self, side: Side, price: Decimal) -> Vec<&Order> {
        self.side(side)
            .level(price)
            .map(|level| level.iter(&self.arena).map(|(_, o)| o).collect())
            .unwrap_or_default()
    }

    /// Check if an order is resting.
    #[must_use]
    pub fn contains_order(&self, id: OrderId) -> bool {
        self.index.contains(id)
    }

    /// Total number of resting orders.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    /// Number of distinct bid price levels.
    #[must_use]
    pub fn bid_level_count(&self) -> usize {
        self.bids.level_count()
    }

    /// Number of distinct ask price levels.
    #[must_use]
    pub fn ask_level_count(&self) -> usize {
        self.asks.level_count()
    }

    /// Returns `true` if the book has no orders on either side.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> BookStats {
        self.stats
    }

    /// Id the next trade will receive.
    #[must_use]
    pub fn next_trade_id(&self) -> TradeId {
        self.matcher.peek_trade_id()
    }

    /// Verify every structural invariant:
    ///
    /// - no empty level exists on either side
    /// - every queued order is live, on the right side, at its level's price
    /// - arrival sequences strictly increase within a level
    /// - the index holds exactly the queued orders, at their queued location
    pub fn audit(&self) -> Result<()> {
        let mut queued = 0usize;
        for book in [&self.bids, &self.asks] {
            for level in book.levels() {
                if level.is_empty() {
                    return Err(audit_failure(format!(
                        "{} level {} is empty",
                        book.side(),
                        level.price
                    )));
                }
                let mut last_sequence = None;
                let mut walked = 0usize;
                for (slot, order) in level.iter(&self.arena) {
                    walked += 1;
                    if order.remaining == 0 {
                        return Err(audit_failure(format!("{} rests with zero quantity", order.id)));
                    }
                    if order.side != book.side() || order.price != Some(level.price) {
                        return Err(audit_failure(format!(
                            "{} misplaced at {} {}",
                            order.id,
                            book.side(),
                            level.price
                        )));
                    }
                    if last_sequence.is_some_and(|last| last >= order.sequence) {
                        return Err(audit_failure(format!(
                            "{} breaks arrival order at {}",
                            order.id, level.price
                        )));
                    }
                    last_sequence = Some(order.sequence);
                    let expected = IndexEntry {
                        side: book.side(),
                        price: level.price,
                        slot,
                    };
                    if self.index.get(order.id) != Some(&expected) {
                        return Err(audit_failure(format!("{} index entry mismatch", order.id)));
                    }
                }
                if walked != level.len() {
                    return Err(audit_failure(format!(
                        "level {} counts {} orders but links {walked}",
                        level.price,
                        level.len()
                    )));
                }
                queued += walked;
            }
        }
        for (id, entry) in self.index.iter() {
            if self.arena.get(entry.slot).map(|o| o.id) != Some(*id) {
                return Err(audit_failure(format!("index entry for {id} points at another slot")));
            }
        }
        if queued != self.index.len() || queued != self.arena.len() {
            return Err(audit_failure(format!(
                "{queued} queued orders, {} indexed, {} stored",
                self.index.len(),
                self.arena.len()
            )));
        }
        Ok(())
    }

    // =================================================================
    // Internals
    // =================================================================

    fn take_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    fn side(&self, side: Side) -> &SideBook {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn is_crossed(&self) -> bool {
        matches!((self.best_bid(), self.best_ask()), (Some(bid), Some(ask)) if bid >= ask)
    }

    /// The matcher plus the structures an order on `taker_side` trades
    /// against.
    fn match_parts(&mut self, taker_side: Side) -> (&mut Matcher, MatchContext<'_>) {
        let opposite = match taker_side {
            Side::Buy => &mut self.asks,
            Side::Sell => &mut self.bids,
        };
        (
            &mut self.matcher,
            MatchContext {
                opposite,
                arena: &mut self.arena,
                index: &mut self.index,
            },
        )
    }

    fn rest(&mut self, order: Order, price: Decimal) {
        let (id, side, remaining) = (order.id, order.side, order.remaining);
        let slot = self.arena.insert(order);
        let book = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        book.level_or_insert(price).push_back(&mut self.arena, slot);
        self.index.insert(id, IndexEntry { side, price, slot });
        self.stats.orders_rested += 1;
        tracing::debug!(order = %id, %side, %price, remaining, "Order rested");
    }

    /// Index entry for `id`, checked against the arena so later steps of a
    /// mutation cannot fail halfway.
    fn locate(&self, id: OrderId) -> Result<IndexEntry> {
        let entry = *self.index.get(id).ok_or(BookError::OrderNotFound(id))?;
        let stored = self.arena.get(entry.slot).map(|o| o.id);
        let level_exists = self.side(entry.side).level(entry.price).is_some();
        if stored != Some(id) || !level_exists {
            return Err(BookError::Internal(format!("index entry for {id} is stale")));
        }
        Ok(entry)
    }

    /// Unlink and release a resting order, dropping its level if emptied.
    fn detach(&mut self, id: OrderId) -> Result<Order> {
        let entry = self.locate(id)?;
        let book = match entry.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(level) = book.level_mut(entry.price) {
            level.unlink(&mut self.arena, entry.slot);
        }
        book.remove_if_empty(entry.price);
        self.index.remove(id);
        self.arena
            .remove(entry.slot)
            .ok_or_else(|| BookError::Internal(format!("{id} lost its arena slot")))
    }
}

fn audit_failure(reason: String) -> BookError {
    BookError::Internal(format!("audit: {reason}"))
}

impl fmt::Display for OrderBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_none(value: Option<Decimal>) -> String {
            value.map_or_else(|| "None".to_string(), |v| v.to_string())
        }
        write!(
            f,
            "OrderBook({} bid={} ask={} spread={} orders={} trades={} volume={})",
            self.config.symbol,
            or_none(self.best_bid()),
            or_none(self.best_ask()),
            or_none(self.spread()),
            self.order_count(),
            self.stats.trades,
            self.stats.volume,
        )
    }
}

//! Book actor: one task owns the book, callers talk to it through a queue.

use pricetime_matchcore::OrderBook;
use pricetime_types::constants;
use pricetime_types::{
    BookError, BookStats, Depth, MarketExecution, Order, OrderId, Quantity, Result, Side, Trade,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Commands accepted by a [`BookActor`]. Each carries its reply channel.
#[derive(Debug)]
pub enum BookCommand {
    AddOrder {
        order: Order,
        reply: oneshot::Sender<Result<Vec<Trade>>>,
    },
    CancelOrder {
        id: OrderId,
        reply: oneshot::Sender<Result<Order>>,
    },
    ModifyOrder {
        id: OrderId,
        new_price: Option<Decimal>,
        new_quantity: Option<Quantity>,
        reply: oneshot::Sender<Result<Order>>,
    },
    ExecuteMarketOrder {
        side: Side,
        quantity: Quantity,
        reply: oneshot::Sender<Result<MarketExecution>>,
    },
    Snapshot {
        levels: usize,
        reply: oneshot::Sender<BookSnapshot>,
    },
}

/// Point-in-time view of a book, taken between two commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub symbol: String,
    pub best_bid: Option<Decimal>,
    pub best_ask: Option<Decimal>,
    pub spread: Option<Decimal>,
    pub mid_price: Option<Decimal>,
    pub depth: Depth,
    pub order_count: usize,
    pub stats: BookStats,
}

impl BookSnapshot {
    fn capture(book: &OrderBook, levels: usize) -> Self {
        Self {
            symbol: book.symbol().to_string(),
            best_bid: book.best_bid(),
            best_ask: book.best_ask(),
            spread: book.spread(),
            mid_price: book.mid_price(),
            depth: book.depth(levels),
            order_count: book.order_count(),
            stats: book.stats(),
        }
    }
}

/// Exclusive owner of one [`OrderBook`].
pub struct BookActor {
    book: OrderBook,
    commands: mpsc::Receiver<BookCommand>,
}

impl BookActor {
    /// Build an actor and the first handle to it. The queue size comes from
    /// the book's configuration.
    #[must_use]
    pub fn new(book: OrderBook) -> (Self, BookHandle) {
        let (tx, rx) = mpsc::channel(book.config().channel_capacity);
        (
            Self {
                book,
                commands: rx,
            },
            BookHandle { commands: tx },
        )
    }

    /// Spawn the actor on the current tokio runtime. The task ends when
    /// every handle is dropped and yields the book back.
    #[must_use]
    pub fn spawn(book: OrderBook) -> (BookHandle, JoinHandle<OrderBook>) {
        let (actor, handle) = Self::new(book);
        (handle, tokio::spawn(actor.run()))
    }

    /// Process commands one at a time until the queue closes.
    pub async fn run(mut self) -> OrderBook {
        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            symbol = %self.book.symbol(),
            "Book actor started"
        );
        while let Some(command) = self.commands.recv().await {
            self.apply(command);
        }
        tracing::info!(
            symbol = %self.book.symbol(),
            orders = self.book.order_count(),
            trades = self.book.stats().trades,
            "Book actor stopped"
        );
        self.book
    }

    fn apply(&mut self, command: BookCommand) {
        // A dropped reply receiver only means the caller stopped waiting.
        match command {
            BookCommand::AddOrder { order, reply } => {
                let _ = reply.send(self.book.add_order(order));
            }
            BookCommand::CancelOrder { id, reply } => {
                let _ = reply.send(self.book.cancel_order(id));
            }
            BookCommand::ModifyOrder {
                id,
                new_price,
                new_quantity,
                reply,
            } => {
                let _ = reply.send(self.book.modify_order(id, new_price, new_quantity));
            }
            BookCommand::ExecuteMarketOrder {
                side,
                quantity,
                reply,
            } => {
                let _ = reply.send(self.book.execute_market_order(side, quantity));
            }
            BookCommand::Snapshot { levels, reply } => {
                let _ = reply.send(BookSnapshot::capture(&self.book, levels));
            }
        }
    }
}

/// Cloneable sender side of a [`BookActor`].
#[derive(Debug, Clone)]
pub struct BookHandle {
    commands: mpsc::Sender<BookCommand>,
}

impl BookHandle {
    pub async fn add_order(&self, order: Order) -> Result<Vec<Trade>> {
        self.request(|reply| BookCommand::AddOrder { order, reply })
            .await?
    }

    pub async fn cancel_order(&self, id: OrderId) -> Result<Order> {
        self.request(|reply| BookCommand::CancelOrder { id, reply })
            .await?
    }

    pub async fn modify_order(
        &self,
        id: OrderId,
        new_price: Option<Decimal>,
        new_quantity: Option<Quantity>,
    ) -> Result<Order> {
        self.request(|reply| BookCommand::ModifyOrder {
            id,
            new_price,
            new_quantity,
            reply,
        })
        .await?
    }

    pub async fn execute_market_order(
        &self,
        side: Side,
        quantity: Quantity,
    ) -> Result<MarketExecution> {
        self.request(|reply| BookCommand::ExecuteMarketOrder {
            side,
            quantity,
            reply,
        })
        .await?
    }

    pub async fn snapshot(&self, levels: usize) -> Result<BookSnapshot> {
        self.request(|reply| BookCommand::Snapshot { levels, reply })
            .await
    }

    /// Whether the actor has stopped accepting commands.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> BookCommand,
    ) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| BookError::EngineClosed)?;
        response.await.map_err(|_| BookError::EngineClosed)
    }
}

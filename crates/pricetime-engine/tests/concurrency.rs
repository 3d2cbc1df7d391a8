//! Integration test: serialized access from many concurrent callers
//!
//! Many tasks submit through cloned handles; the actor must apply each
//! command atomically, so the final book state is consistent and every
//! unit of quantity is accounted for.

use pricetime_engine::{BookActor, BookHandle};
use pricetime_matchcore::OrderBook;
use pricetime_types::*;
use rust_decimal::Decimal;

fn dec(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

async fn submit_many(handle: BookHandle, side: Side, first_id: u64, count: u64) -> Quantity {
    let mut traded = 0;
    for i in 0..count {
        let trades = handle
            .add_order(Order::limit(first_id + i, side, dec(100), 1))
            .await
            .unwrap();
        traded += trades.iter().map(|t| t.quantity).sum::<Quantity>();
    }
    traded
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submitters_are_serialized() {
    let (handle, task) = BookActor::spawn(OrderBook::new("ACME"));

    let mut workers = Vec::new();
    for worker in 0..8u64 {
        let side = if worker % 2 == 0 { Side::Buy } else { Side::Sell };
        workers.push(tokio::spawn(submit_many(
            handle.clone(),
            side,
            worker * 1_000 + 1,
            250,
        )));
    }

    let mut traded_by_takers = 0;
    for worker in workers {
        traded_by_takers += worker.await.unwrap();
    }

    let snapshot = handle.snapshot(10).await.unwrap();
    // 1000 buys and 1000 sells of size 1 at one price fully cross.
    assert_eq!(traded_by_takers, 1_000);
    assert_eq!(snapshot.stats.volume, 1_000);
    assert_eq!(snapshot.order_count, 0);
    assert!(snapshot.depth.is_empty());

    drop(handle);
    let book = task.await.unwrap();
    book.audit().unwrap();
}

#[tokio::test]
async fn independent_books_do_not_interact() {
    let (acme, acme_task) = BookActor::spawn(OrderBook::new("ACME"));
    let (globex, globex_task) = BookActor::spawn(OrderBook::new("GLOBEX"));

    acme.add_order(Order::limit(1, Side::Sell, dec(10), 5))
        .await
        .unwrap();
    let trades = globex
        .add_order(Order::limit(1, Side::Buy, dec(10), 5))
        .await
        .unwrap();
    assert!(trades.is_empty(), "orders on different books never match");

    let acme_snap = acme.snapshot(5).await.unwrap();
    let globex_snap = globex.snapshot(5).await.unwrap();
    assert_eq!(acme_snap.symbol, "ACME");
    assert_eq!(acme_snap.best_ask, Some(dec(10)));
    assert_eq!(globex_snap.best_bid, Some(dec(10)));

    drop((acme, globex));
    assert_eq!(acme_task.await.unwrap().order_count(), 1);
    assert_eq!(globex_task.await.unwrap().order_count(), 1);
}

#[tokio::test]
async fn snapshot_serializes_for_callers() {
    let config =
        BookConfig::from_json(r#"{"symbol":"ACME","tick_size":"0.5","channel_capacity":8}"#)
            .unwrap();
    let (handle, _task) = BookActor::spawn(OrderBook::with_config(config).unwrap());

    handle
        .add_order(Order::limit(1, Side::Buy, Decimal::new(995, 1), 4))
        .await
        .unwrap();
    handle
        .add_order(Order::limit(2, Side::Sell, dec(101), 2))
        .await
        .unwrap();
    assert!(matches!(
        handle
            .add_order(Order::limit(3, Side::Sell, Decimal::new(1012, 1), 2))
            .await,
        Err(BookError::InvalidOrder { .. })
    ));

    let snapshot = handle.snapshot(5).await.unwrap();
    assert_eq!(snapshot.spread, Some(Decimal::new(15, 1)));
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: pricetime_engine::BookSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
}

// ============================================================================
// Basic Usage Example
// ============================================================================

use orderbook_engine::prelude::*;

fn main() {
    println!("=== Order Book Example ===\n");

    let book = OrderBook::new();

    // Rest a ladder of asks above the market.
    println!("Adding sell orders...");
    for i in 0..5i32 {
        book.add_order(Order::new(
            OrderType::GoodTillCancel,
            OrderId::new(i as u64 + 1),
            Side::Sell,
            Price::new(50_000 + i * 100),
            Quantity::new(2),
        ))
        .expect("book invariant violated");
    }

    // And a ladder of bids below it.
    println!("Adding buy orders...");
    for i in 0..5i32 {
        book.add_order(Order::new(
            OrderType::GoodTillCancel,
            OrderId::new(i as u64 + 11),
            Side::Buy,
            Price::new(49_900 - i * 100),
            Quantity::new(2),
        ))
        .expect("book invariant violated");
    }

    print_snapshot(&book);

    // A market buy sweeps from the best ask upward.
    println!("\n=== Submitting Market Buy for 5 ===");
    let trades = book
        .add_order(Order::market(OrderId::new(42), Side::Buy, Quantity::new(5)))
        .expect("book invariant violated");

    for trade in &trades {
        println!(
            "  trade: bid #{} @ {} / ask #{} @ {} for {}",
            trade.bid.order_id, trade.bid.price, trade.ask.order_id, trade.ask.price,
            trade.quantity()
        );
    }

    print_snapshot(&book);
    println!("\nResting orders: {}", book.len());
}

fn print_snapshot(book: &OrderBook) {
    let snapshot = book.snapshot();

    println!("\n=== Order Book Snapshot ===");
    println!("Asks:");
    for level in snapshot.asks.iter().rev() {
        println!("  {} @ {}", level.quantity, level.price);
    }
    println!("Bids:");
    for level in &snapshot.bids {
        println!("  {} @ {}", level.quantity, level.price);
    }
    if let Some(spread) = snapshot.spread() {
        println!("Spread: {spread}");
    }
}

//! # Order Pricing
//!
//! Server-side computation of order totals and profit.
//!
//! ## Why Server-Side?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Checkout flow                                                  │
//! │                                                                 │
//! │  Caller sends:   lines = [{product_id, quantity}]               │
//! │                        │                                        │
//! │                        ▼                                        │
//! │  Order engine reads buy/sell prices INSIDE the transaction      │
//! │                        │                                        │
//! │                        ▼                                        │
//! │  price_order() ← THIS MODULE                                    │
//! │                        │                                        │
//! │                        ▼                                        │
//! │  total = Σ qty × sell      profit = Σ qty × (sell − buy)        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//! Totals supplied by a client are never trusted: tampering with prices in
//! the request body must not change what gets recorded. Profit is frozen at
//! sale time, so later catalog price edits never rewrite history.

use crate::money::Money;

/// One order line with the authoritative prices read at sale time.
#[derive(Debug, Clone, Copy)]
pub struct PricedLine {
    pub sell_price: Money,
    pub buy_price: Money,
    pub quantity: i64,
}

/// The computed figures recorded on an order row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub total: Money,
    pub profit: Money,
}

/// Computes order total and profit from priced lines.
///
/// `total = Σ(qty × sell)` and `profit = Σ(qty × (sell − buy))`, both in
/// integer cents, so the arithmetic is exact.
pub fn price_order(lines: &[PricedLine]) -> OrderTotals {
    let mut total = Money::zero();
    let mut profit = Money::zero();

    for line in lines {
        total += line.sell_price.multiply_quantity(line.quantity);
        profit += (line.sell_price - line.buy_price).multiply_quantity(line.quantity);
    }

    OrderTotals { total, profit }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(sell: i64, buy: i64, qty: i64) -> PricedLine {
        PricedLine {
            sell_price: Money::from_cents(sell),
            buy_price: Money::from_cents(buy),
            quantity: qty,
        }
    }

    #[test]
    fn test_single_line_profit() {
        // buy 500, sell 800, qty 3 → total 2400, profit 900
        let totals = price_order(&[line(800, 500, 3)]);
        assert_eq!(totals.total.cents(), 2400);
        assert_eq!(totals.profit.cents(), 900);
    }

    #[test]
    fn test_multiple_lines() {
        let totals = price_order(&[line(800, 500, 3), line(1000, 900, 2)]);
        assert_eq!(totals.total.cents(), 2400 + 2000);
        assert_eq!(totals.profit.cents(), 900 + 200);
    }

    #[test]
    fn test_empty_order_is_zero() {
        let totals = price_order(&[]);
        assert_eq!(totals.total, Money::zero());
        assert_eq!(totals.profit, Money::zero());
    }

    #[test]
    fn test_loss_making_line() {
        // Selling under cost records negative profit, not an error.
        let totals = price_order(&[line(400, 500, 2)]);
        assert_eq!(totals.total.cents(), 800);
        assert_eq!(totals.profit.cents(), -200);
    }
}

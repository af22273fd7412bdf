//! Pricing value types shared by quotes and booking sessions.

use rust_decimal::Decimal;
use serde::Serialize;

/// Computed monetary values for one booking.
///
/// Derived data: recomputed whenever base price, child count or discount
/// changes. A booking session copies it when payment starts, and that copy
/// is the amount charged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSnapshot {
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_percent: Decimal,
    pub child_prices: Vec<Decimal>,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub original_total: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_discount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub final_total: Decimal,
}

impl PricingSnapshot {
    /// Whether the guardian saves anything compared to full price.
    pub fn has_savings(&self) -> bool {
        self.total_discount > Decimal::ZERO
    }
}

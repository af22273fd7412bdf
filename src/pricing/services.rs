//! Pricing service functions.
//!
//! Combines plan price parsing, discount code handling and the calculators
//! into a quote, the unit the booking form displays.

use rust_decimal::Decimal;

use super::calculators::{base_price_or_zero, calculate_snapshot};
use super::discounts::DiscountState;
use super::models::PricingSnapshot;

/// Pricing calculation error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("Invalid plan price {raw:?}")]
    InvalidBasePrice { raw: String },

    #[error("Invalid discount code")]
    InvalidDiscountCode,

    #[error("Amount {amount} cannot be charged")]
    AmountOutOfRange { amount: Decimal },
}

/// A priced booking plus the discount input that produced it.
#[derive(Debug, Clone)]
pub struct Quote {
    pub snapshot: PricingSnapshot,
    pub discount: DiscountState,
}

/// Price `number_of_children` children for a plan.
///
/// An empty or missing code prices with sibling discounts. An unknown code
/// also prices with sibling discounts and leaves the error on
/// `quote.discount`.
///
/// # Arguments
/// * `plan_price` - Plan price as displayed, e.g. `"1,600"`
/// * `number_of_children` - Children on the booking
/// * `discount_code` - Code entered by the guardian, if any
pub fn quote(plan_price: &str, number_of_children: usize, discount_code: Option<&str>) -> Quote {
    let mut discount = DiscountState::new();
    if let Some(code) = discount_code.filter(|c| !c.trim().is_empty()) {
        // an invalid code is reported through the discount state
        let _ = discount.apply(code);
    }

    Quote {
        snapshot: price_with(plan_price, number_of_children, &discount),
        discount,
    }
}

/// Price a booking with an existing discount state.
pub fn price_with(plan_price: &str, number_of_children: usize, discount: &DiscountState) -> PricingSnapshot {
    calculate_snapshot(base_price_or_zero(plan_price), number_of_children, discount.percent())
}

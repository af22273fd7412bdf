//! Pricing engine module for camp and clinic bookings.
//!
//! Per-child prices with sibling discounts or a discount code, subtotal,
//! 5% VAT and the final total, all rounded to tenths of a dirham.

pub mod calculators;
pub mod discounts;
pub mod models;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{calculate_snapshot, round_money, round_tenth, to_minor_units};
pub use discounts::{AppliedDiscount, DiscountKind, DiscountState};
pub use models::PricingSnapshot;
pub use routes::router;
pub use services::{quote, PricingError, Quote};

//! Core pricing calculation functions.
//!
//! Pure functions for per-child pricing math - no I/O.
//! Every monetary value is rounded to tenths of a dirham at the point it is produced.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use crate::pricing::models::PricingSnapshot;
use crate::pricing::services::PricingError;

/// VAT applied to the discounted subtotal.
pub const TAX_RATE: Decimal = dec!(0.05);

/// Sibling discount for the second child, in percent.
pub const SIBLING_DISCOUNT_FIRST: Decimal = dec!(10);

/// Increase of the sibling discount per additional child, in percent.
pub const SIBLING_DISCOUNT_STEP: Decimal = dec!(5);

/// Upper bound of the sibling discount, in percent.
pub const SIBLING_DISCOUNT_CAP: Decimal = dec!(20);

/// Round to specified decimal places, midpoints away from zero.
///
/// This matches half-up rounding for every non-negative amount the engine
/// produces (prices, subtotals, tax).
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use camp_booking::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(116.875), 1), dec!(116.9));
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to one decimal place. Used at every monetary computation site.
pub fn round_tenth(amount: Decimal) -> Decimal {
    round_money(amount, 1)
}

/// Parse a plan price such as `"1,600"` into a whole-dirham amount.
///
/// Thousands separators are removed and the leading integer is read, so
/// `"850 AED"` parses as 850 and `"12.5"` as 12. Input without a leading
/// digit, or a negative amount, is rejected.
pub fn parse_base_price(raw: &str) -> Result<Decimal, PricingError> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim_start();

    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(cleaned)),
    };

    let leading: String = digits.chars().take_while(|c| c.is_ascii_digit()).collect();
    if leading.is_empty() || negative {
        return Err(PricingError::InvalidBasePrice {
            raw: raw.to_string(),
        });
    }

    leading
        .parse::<Decimal>()
        .map_err(|_| PricingError::InvalidBasePrice {
            raw: raw.to_string(),
        })
}

/// Lenient variant of [`parse_base_price`]: unparseable prices count as zero.
///
/// Quotes stay displayable with bad plan data; the booking session refuses to
/// charge a non-positive total, so a zero price can never reach the gateway.
pub fn base_price_or_zero(raw: &str) -> Decimal {
    match parse_base_price(raw) {
        Ok(price) => price,
        Err(e) => {
            tracing::warn!("{}; pricing with zero", e);
            Decimal::ZERO
        }
    }
}

/// Sibling discount percentage for the child at `child_index` (0-based).
///
/// 0% for the first child, then 10%, 15% and 20% for every further child.
pub fn sibling_discount_percent(child_index: usize) -> Decimal {
    if child_index == 0 {
        return Decimal::ZERO;
    }
    let steps = Decimal::from(child_index - 1);
    (SIBLING_DISCOUNT_FIRST + steps * SIBLING_DISCOUNT_STEP).min(SIBLING_DISCOUNT_CAP)
}

/// Price for a single child.
///
/// A positive `applied_discount_percent` (from a discount code) replaces the
/// sibling discount for every child; the two never stack.
pub fn child_price(base_price: Decimal, child_index: usize, applied_discount_percent: Decimal) -> Decimal {
    if applied_discount_percent > Decimal::ZERO {
        let discount_amount = base_price * applied_discount_percent / dec!(100);
        return round_tenth(base_price - discount_amount);
    }

    if child_index == 0 {
        return base_price;
    }

    let discount_amount = base_price * sibling_discount_percent(child_index) / dec!(100);
    round_tenth(base_price - discount_amount)
}

/// Calculate the full pricing snapshot for a booking.
///
/// Order of operations:
/// 1. per-child prices
/// 2. subtotal = round(sum of prices)
/// 3. original total = base price x children (no discount at all)
/// 4. total discount = round(original - subtotal)
/// 5. tax = round(subtotal x 5%)
/// 6. final total = round(subtotal + tax)
pub fn calculate_snapshot(
    base_price: Decimal,
    number_of_children: usize,
    applied_discount_percent: Decimal,
) -> PricingSnapshot {
    let child_prices: Vec<Decimal> = (0..number_of_children)
        .map(|i| child_price(base_price, i, applied_discount_percent))
        .collect();

    let subtotal = round_tenth(child_prices.iter().sum());
    let original_total = base_price * Decimal::from(number_of_children);
    let total_discount = round_tenth(original_total - subtotal);
    let tax_amount = round_tenth(subtotal * TAX_RATE);
    let final_total = round_tenth(subtotal + tax_amount);

    PricingSnapshot {
        base_price,
        discount_percent: applied_discount_percent,
        child_prices,
        subtotal,
        original_total,
        total_discount,
        tax_amount,
        final_total,
    }
}

/// Convert a dirham amount to fils for the payment gateway.
pub fn to_minor_units(amount: Decimal) -> Result<i64, PricingError> {
    amount
        .checked_mul(dec!(100))
        .and_then(|fils| round_money(fils, 0).to_i64())
        .ok_or(PricingError::AmountOutOfRange { amount })
}

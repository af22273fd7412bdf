//! Response DTOs for pricing API endpoints.

use rust_decimal::Decimal;
use serde::Serialize;

use super::discounts::{DiscountKind, DiscountState};
use super::models::PricingSnapshot;
use super::services::Quote;

pub const CURRENCY: &str = "AED";

/// Money value for JSON responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl MoneyResponse {
    pub fn aed(amount: Decimal) -> Self {
        Self {
            amount,
            currency: CURRENCY.to_string(),
        }
    }
}

/// Priced booking
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResponse {
    pub child_prices: Vec<MoneyResponse>,
    pub subtotal: MoneyResponse,
    pub original_total: MoneyResponse,
    pub total_discount: MoneyResponse,
    pub tax_amount: MoneyResponse,
    pub final_total: MoneyResponse,
    pub has_savings: bool,
}

impl From<&PricingSnapshot> for PricingResponse {
    fn from(snapshot: &PricingSnapshot) -> Self {
        Self {
            child_prices: snapshot.child_prices.iter().copied().map(MoneyResponse::aed).collect(),
            subtotal: MoneyResponse::aed(snapshot.subtotal),
            original_total: MoneyResponse::aed(snapshot.original_total),
            total_discount: MoneyResponse::aed(snapshot.total_discount),
            tax_amount: MoneyResponse::aed(snapshot.tax_amount),
            final_total: MoneyResponse::aed(snapshot.final_total),
            has_savings: snapshot.has_savings(),
        }
    }
}

/// Discount code state as shown next to the code input
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountResponse {
    pub code: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub percent: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<DiscountKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&DiscountState> for DiscountResponse {
    fn from(state: &DiscountState) -> Self {
        Self {
            code: state.entered_code().to_string(),
            percent: state.percent(),
            kind: state.applied().map(|applied| applied.kind),
            error: state.error().map(|e| e.to_string()),
        }
    }
}

/// Response for the quote endpoint
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub pricing: PricingResponse,
    pub discount: DiscountResponse,
}

impl From<&Quote> for QuoteResponse {
    fn from(quote: &Quote) -> Self {
        Self {
            pricing: PricingResponse::from(&quote.snapshot),
            discount: DiscountResponse::from(&quote.discount),
        }
    }
}

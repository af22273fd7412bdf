//! Request DTOs for pricing API endpoints.

use serde::Deserialize;

/// Request to price a booking
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub plan_price: String,
    #[serde(default = "default_children")]
    pub number_of_children: usize,
    #[serde(default)]
    pub discount_code: Option<String>,
}

fn default_children() -> usize {
    1
}

/// Request to check a discount code without pricing
#[derive(Debug, Deserialize)]
pub struct DiscountCheckRequest {
    pub code: String,
}

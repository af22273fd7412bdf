//! Booking session API request types

use serde::Deserialize;

use super::models::{CampType, Location, Plan};

/// Request to open a booking session for a selected plan
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub plan: Option<Plan>,
    pub location: Location,
    pub camp_type: CampType,
}

#[derive(Debug, Deserialize)]
pub struct SetChildrenRequest {
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct DiscountRequest {
    pub code: String,
}

/// Payment method collected by the card form, e.g. `pm_...` or `tok_...`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub payment_method: String,
}

//! Pricing API route handlers

use axum::{routing::post, Json, Router};

use crate::booking::models::MAX_CHILDREN;
use crate::error::{AppError, Result};
use crate::AppState;

use super::discounts::DiscountState;
use super::requests::{DiscountCheckRequest, QuoteRequest};
use super::responses::{DiscountResponse, QuoteResponse};
use super::services;

/// Pricing routes, mounted under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pricing/quote", post(quote))
        .route("/pricing/discounts/check", post(check_discount))
}

/// Price a plan for a number of children, optionally with a discount code
async fn quote(Json(req): Json<QuoteRequest>) -> Result<Json<QuoteResponse>> {
    if req.number_of_children == 0 || req.number_of_children > MAX_CHILDREN {
        return Err(AppError::BadRequest(format!(
            "numberOfChildren must be between 1 and {}",
            MAX_CHILDREN
        )));
    }

    let quote = services::quote(
        &req.plan_price,
        req.number_of_children,
        req.discount_code.as_deref(),
    );
    tracing::debug!(
        "Quote for {} x {}: {}",
        req.number_of_children,
        req.plan_price,
        quote.snapshot.final_total
    );

    Ok(Json(QuoteResponse::from(&quote)))
}

/// Validate a discount code
async fn check_discount(Json(req): Json<DiscountCheckRequest>) -> Json<DiscountResponse> {
    let mut state = DiscountState::new();
    let _ = state.apply(&req.code);
    Json(DiscountResponse::from(&state))
}

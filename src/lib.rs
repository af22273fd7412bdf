//! Booking service for the kids camp and football clinic.
//!
//! - [`pricing`]: per-child prices, discount codes, VAT
//! - [`booking`]: the booking form, its validation and the payment session
//! - [`gateway`] and [`persistence`]: the payment gateway and booking API
//!   the session talks to

pub mod booking;
pub mod config;
pub mod error;
pub mod gateway;
pub mod persistence;
pub mod pricing;
pub mod session_store;

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use booking::SeasonCalendar;
use config::Config;
use gateway::{PaymentGateway, StripeGateway};
use persistence::{BookingApi, HttpBookingApi};
use session_store::SessionStore;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub gateway: Arc<dyn PaymentGateway>,
    pub bookings: Arc<dyn BookingApi>,
    pub season: SeasonCalendar,
}

impl AppState {
    pub fn new(gateway: Arc<dyn PaymentGateway>, bookings: Arc<dyn BookingApi>, season: SeasonCalendar) -> Self {
        Self {
            sessions: SessionStore::new(),
            gateway,
            bookings,
            season,
        }
    }

    /// State wired to Stripe and the HTTP booking API
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(StripeGateway::new(
                &config.payment_server_url,
                &config.stripe_api_url,
                &config.stripe_publishable_key,
            )),
            Arc::new(HttpBookingApi::new(&config.booking_api_url)),
            config.season,
        )
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "status": "ok", "store": state.sessions.stats() }))
}

/// The full HTTP application
pub fn app(state: AppState) -> Router {
    let api = Router::new().merge(pricing::router()).merge(booking::router());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

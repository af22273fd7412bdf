//! Booking session API response types

use serde::Serialize;
use uuid::Uuid;

use crate::persistence::BookingReceipt;
use crate::pricing::responses::{DiscountResponse, PricingResponse};
use crate::pricing::AppliedDiscount;

use super::models::BookingDraft;
use super::schedule::{offering_label, AccessPeriod};
use super::session::{BookingSession, FrozenBooking, SessionState};
use super::validation::ValidationErrors;

/// Everything the booking page renders for a session
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub state: &'static str,
    pub draft: BookingDraft,
    pub pricing: PricingResponse,
    pub discount: DiscountResponse,
    pub errors: ValidationErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offering: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_period: Option<AccessPeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout: Option<CheckoutView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<BookingReceipt>,
}

/// The frozen amount being paid and the secret the card form confirms with
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub client_secret: String,
    pub amount_minor_units: i64,
    pub currency: String,
    pub pricing: PricingResponse,
}

/// The booking as it was when payment started
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrozenBookingView {
    pub draft: BookingDraft,
    pub pricing: PricingResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<AppliedDiscount>,
}

impl From<&FrozenBooking> for FrozenBookingView {
    fn from(booking: &FrozenBooking) -> Self {
        Self {
            draft: booking.draft.clone(),
            pricing: PricingResponse::from(&booking.snapshot),
            discount: booking.discount.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureView {
    pub code: String,
    pub message: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    pub booking: FrozenBookingView,
}

impl From<&BookingSession> for SessionView {
    fn from(session: &BookingSession) -> Self {
        let draft = session.draft();

        let (checkout, failure, receipt) = match session.state() {
            SessionState::AwaitingPayment(checkout) => (
                Some(CheckoutView {
                    client_secret: checkout.intent.client_secret.clone(),
                    amount_minor_units: checkout.intent.amount_minor_units,
                    currency: checkout.intent.currency.clone(),
                    pricing: PricingResponse::from(&checkout.booking.snapshot),
                }),
                None,
                None,
            ),
            SessionState::PaymentFailed(failure) => (
                None,
                Some(FailureView {
                    code: failure.error.code().to_string(),
                    message: failure.error.to_string(),
                    retryable: failure.error.is_retryable(),
                    payment_id: None,
                    booking: FrozenBookingView::from(&failure.booking),
                }),
                None,
            ),
            SessionState::PersistenceFailed(failure) => (
                None,
                Some(FailureView {
                    code: "booking_not_saved".to_string(),
                    message: failure.message(),
                    retryable: false,
                    payment_id: Some(failure.payment.payment_id.clone()),
                    booking: FrozenBookingView::from(&failure.booking),
                }),
                None,
            ),
            SessionState::Done(receipt) => (None, None, Some(receipt.clone())),
            SessionState::Editing | SessionState::SubmittingBooking { .. } => (None, None, None),
        };

        Self {
            id: session.id(),
            state: session.state().name(),
            draft: draft.clone(),
            pricing: PricingResponse::from(&session.pricing()),
            discount: DiscountResponse::from(session.discount()),
            errors: session.errors().clone(),
            offering: draft.plan.as_ref().map(|p| offering_label(p, draft.location)),
            access_period: match (draft.start_date, draft.plan.as_ref()) {
                (Some(start), Some(plan)) => Some(session.season().access_period(start, plan)),
                _ => None,
            },
            checkout,
            failure,
            receipt,
        }
    }
}

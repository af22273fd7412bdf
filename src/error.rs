//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::booking::responses::FrozenBookingView;
use crate::booking::SessionError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Booking session not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error_type: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

fn session_error_parts(error: &SessionError) -> (StatusCode, &'static str, Option<Value>) {
    match error {
        SessionError::Invalid(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation_error",
            serde_json::to_value(errors).ok(),
        ),
        SessionError::Draft(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_draft", None),
        SessionError::InvalidAmount(_) | SessionError::Pricing(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "invalid_amount", None)
        }
        SessionError::Locked { state } => (StatusCode::CONFLICT, "locked", Some(json!({ "state": state }))),
        SessionError::InvalidTransition { action, state } => (
            StatusCode::CONFLICT,
            "invalid_transition",
            Some(json!({ "action": action, "state": state })),
        ),
        SessionError::NotRetryable(e) => (StatusCode::CONFLICT, "not_retryable", Some(json!({ "code": e.code() }))),
        SessionError::StaleAttempt { generation } => (
            StatusCode::CONFLICT,
            "stale_attempt",
            Some(json!({ "generation": generation })),
        ),
        SessionError::SupersededPayment { payment_id } => (
            StatusCode::CONFLICT,
            "superseded_payment",
            Some(json!({ "paymentId": payment_id })),
        ),
        SessionError::DuplicatePayment { payment_id } => (
            StatusCode::CONFLICT,
            "duplicate_payment",
            Some(json!({ "paymentId": payment_id })),
        ),
        SessionError::PaymentFailed(failure) => (
            StatusCode::PAYMENT_REQUIRED,
            "payment_error",
            Some(json!({
                "code": failure.error.code(),
                "retryable": failure.error.is_retryable(),
                "booking": FrozenBookingView::from(&failure.booking),
            })),
        ),
        SessionError::BookingNotSaved(failure) => (
            StatusCode::BAD_GATEWAY,
            "booking_not_saved",
            Some(json!({
                "paymentId": failure.payment.payment_id,
                "booking": FrozenBookingView::from(&failure.booking),
            })),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, details) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", None),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", None),
            AppError::Session(e) => session_error_parts(e),
        };
        let message = self.to_string();

        let body = ErrorBody {
            error_type,
            message,
            details,
        };
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::session::{FrozenBooking, PaymentFailure, PersistenceFailure};
    use crate::booking::validation::{FieldError, FieldId, ValidationErrors};
    use crate::booking::{BookingDraft, CampType, Location};
    use crate::gateway::{PaymentConfirmation, PaymentError};
    use crate::persistence::PersistenceError;
    use crate::pricing::{services, DiscountState};

    fn frozen() -> FrozenBooking {
        let mut draft = BookingDraft::new(None, Location::AlAin, CampType::FootballClinic);
        draft.guardian.first_name = "Fatima".to_string();
        FrozenBooking {
            draft,
            snapshot: services::price_with("150", 1, &DiscountState::new()),
            discount: None,
        }
    }

    fn declined() -> SessionError {
        SessionError::PaymentFailed(Box::new(PaymentFailure {
            error: PaymentError::Declined {
                code: "card_declined".to_string(),
                message: "Your card was declined.".to_string(),
            },
            booking: frozen(),
            intent: None,
        }))
    }

    #[test]
    fn test_status_codes() {
        let cases = vec![
            (AppError::NotFound, StatusCode::NOT_FOUND),
            (AppError::BadRequest("bad".to_string()), StatusCode::BAD_REQUEST),
            (
                AppError::Session(SessionError::Locked { state: "done" }),
                StatusCode::CONFLICT,
            ),
            (
                AppError::Session(SessionError::DuplicatePayment {
                    payment_id: "pi_1".to_string(),
                }),
                StatusCode::CONFLICT,
            ),
            (AppError::Session(declined()), StatusCode::PAYMENT_REQUIRED),
            (
                AppError::Session(SessionError::BookingNotSaved(Box::new(PersistenceFailure {
                    payment: PaymentConfirmation {
                        payment_id: "pi_1".to_string(),
                        amount: 15750,
                        currency: "aed".to_string(),
                    },
                    error: PersistenceError::Transport("refused".to_string()),
                    booking: frozen(),
                }))),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_validation_error_details() {
        let mut errors = ValidationErrors::new();
        errors.set(FieldId::ChildName(1), Err(FieldError::Required("Child name")));

        let (status, error_type, details) = session_error_parts(&SessionError::Invalid(errors));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_type, "validation_error");
        assert_eq!(details, Some(json!({ "childName_1": "Child name is required" })));
    }

    #[test]
    fn test_payment_error_details_carry_frozen_booking() {
        let (status, error_type, details) = session_error_parts(&declined());
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(error_type, "payment_error");

        let details = details.unwrap();
        assert_eq!(details["code"], "card_declined");
        assert_eq!(details["retryable"], false);
        assert_eq!(details["booking"]["draft"]["guardian"]["firstName"], "Fatima");
        let total: rust_decimal::Decimal = details["booking"]["pricing"]["finalTotal"]["amount"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(total, rust_decimal_macros::dec!(157.5));
    }
}

//! Payment gateway contract.
//!
//! The booking session only needs two calls: open an intent for an amount,
//! and confirm it with the guardian's payment method.

pub mod stripe;

use async_trait::async_trait;
use serde::Serialize;

use crate::booking::models::GuardianInfo;

pub use stripe::StripeGateway;

/// Currency every booking is charged in
pub const CURRENCY: &str = "aed";

/// Gateway error code for an intent that expired or was already used
pub const SESSION_EXPIRED_CODE: &str = "payment_intent_unexpected_state";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub client_secret: String,
}

/// Billing details sent with a confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillingDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address_line1: String,
}

impl From<&GuardianInfo> for BillingDetails {
    fn from(guardian: &GuardianInfo) -> Self {
        Self {
            name: guardian.full_name(),
            email: guardian.email.trim().to_string(),
            phone: guardian.phone.trim().to_string(),
            address_line1: guardian.address.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethodDetails {
    /// Gateway payment method id, e.g. `pm_...`
    pub payment_method: String,
    pub billing: BillingDetails,
}

/// A captured payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub payment_id: String,
    /// Minor units (fils)
    pub amount: i64,
    pub currency: String,
}

/// Payment failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment session expired or already processed. Please try again.")]
    SessionExpired { message: String },

    #[error("Failed to initialize payment. Please try again.")]
    IntentCreation { message: String },

    #[error("{message}")]
    Declined { code: String, message: String },

    #[error("Payment status unexpected. Please try again.")]
    UnexpectedStatus { status: String },

    #[error("Payment of {received} {currency} does not match the expected {expected}")]
    AmountMismatch {
        expected: i64,
        received: i64,
        currency: String,
    },

    #[error("Payment gateway unreachable: {0}")]
    Transport(String),
}

impl PaymentError {
    /// Whether a fresh intent may be opened for the same booking
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::SessionExpired { .. } | PaymentError::IntentCreation { .. }
        )
    }

    pub fn code(&self) -> &str {
        match self {
            PaymentError::SessionExpired { .. } => SESSION_EXPIRED_CODE,
            PaymentError::IntentCreation { .. } => "intent_creation_failed",
            PaymentError::Declined { code, .. } => code,
            PaymentError::UnexpectedStatus { .. } => "unexpected_status",
            PaymentError::AmountMismatch { .. } => "amount_mismatch",
            PaymentError::Transport(_) => "network_error",
        }
    }
}

/// Trait implemented by payment processors
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a payment intent for `amount_minor_units` of `currency`
    async fn create_intent(&self, amount_minor_units: i64, currency: &str) -> Result<PaymentIntent, PaymentError>;

    /// Confirm the intent behind `client_secret`
    async fn confirm(
        &self,
        client_secret: &str,
        details: &PaymentMethodDetails,
    ) -> Result<PaymentConfirmation, PaymentError>;
}

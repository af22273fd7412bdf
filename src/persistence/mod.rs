//! Booking persistence API contract.
//!
//! Bookings are saved by an external API after payment succeeds. This module
//! defines the payload it accepts and the acknowledgement it returns.

pub mod http;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::booking::models::{BookingDraft, CampType, Child, Location, Plan};
use crate::pricing::{AppliedDiscount, PricingSnapshot};

pub use http::HttpBookingApi;

/// Persistence failures. Always raised after money was captured.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    #[error("{0}")]
    Rejected(String),

    #[error("Booking API unreachable: {0}")]
    Transport(String),

    #[error("Booking API returned an invalid response: {0}")]
    InvalidResponse(String),
}

fn decimal_floats<S: Serializer>(values: &[Decimal], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(values.iter().map(|v| v.to_f64().unwrap_or_default()))
}

/// Pricing as the booking API stores it (JSON numbers)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPayload {
    #[serde(serialize_with = "decimal_floats")]
    pub child_prices: Vec<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub original_total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_discount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub final_total: Decimal,
}

impl From<&PricingSnapshot> for PricingPayload {
    fn from(snapshot: &PricingSnapshot) -> Self {
        Self {
            child_prices: snapshot.child_prices.clone(),
            subtotal: snapshot.subtotal,
            original_total: snapshot.original_total,
            total_discount: snapshot.total_discount,
            tax_amount: snapshot.tax_amount,
            final_total: snapshot.final_total,
        }
    }
}

/// Body of `POST /api/bookings`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    pub first_name: String,
    pub last_name: String,
    pub parent_email: String,
    pub parent_phone: String,
    pub parent_address: String,
    pub number_of_children: usize,
    pub children: Vec<Child>,
    pub start_date: Option<NaiveDate>,
    pub plan: Option<Plan>,
    pub location: Location,
    pub camp_type: CampType,
    pub pricing: PricingPayload,
    pub payment_id: String,
    pub discount_code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_percent: Decimal,
    pub discount_type: String,
}

impl BookingPayload {
    pub fn new(
        draft: &BookingDraft,
        snapshot: &PricingSnapshot,
        discount: Option<&AppliedDiscount>,
        payment_id: &str,
    ) -> Self {
        let guardian = &draft.guardian;
        Self {
            first_name: guardian.first_name.trim().to_string(),
            last_name: guardian.last_name.trim().to_string(),
            parent_email: guardian.email.trim().to_string(),
            parent_phone: guardian.phone.trim().to_string(),
            parent_address: guardian.address.trim().to_string(),
            number_of_children: draft.number_of_children(),
            children: draft.children().to_vec(),
            start_date: draft.start_date,
            plan: draft.plan.clone(),
            location: draft.location,
            camp_type: draft.camp_type,
            pricing: PricingPayload::from(snapshot),
            payment_id: payment_id.to_string(),
            discount_code: discount.map(|d| d.code.clone()).unwrap_or_default(),
            discount_percent: discount.map(|d| d.percent).unwrap_or(Decimal::ZERO),
            discount_type: discount
                .map(|d| d.kind.as_str().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Acknowledgement returned by the booking API
#[derive(Debug, Clone, Deserialize)]
pub struct BookingAck {
    pub success: bool,
    #[serde(default)]
    pub booking: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A saved booking
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingReceipt {
    pub booking_id: String,
    pub booking: Value,
}

impl BookingAck {
    /// Turn the acknowledgement into a receipt, or the reason it is not one
    pub fn into_receipt(self) -> Result<BookingReceipt, PersistenceError> {
        if !self.success {
            return Err(PersistenceError::Rejected(
                self.message
                    .unwrap_or_else(|| "Failed to save booking.".to_string()),
            ));
        }

        let booking = self
            .booking
            .ok_or_else(|| PersistenceError::InvalidResponse("missing booking".to_string()))?;

        let booking_id = ["_id", "id"]
            .iter()
            .find_map(|key| match &booking[*key] {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .ok_or_else(|| PersistenceError::InvalidResponse("booking has no id".to_string()))?;

        Ok(BookingReceipt {
            booking_id,
            booking,
        })
    }
}

/// Trait implemented by booking stores
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn create_booking(&self, payload: &BookingPayload) -> Result<BookingAck, PersistenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{calculate_snapshot, DiscountState};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn draft() -> BookingDraft {
        let mut draft = BookingDraft::new(
            Some(Plan {
                name: "1 Day Access".to_string(),
                description: "Perfect for trying out our football clinic".to_string(),
                price: "150".to_string(),
            }),
            Location::AlAin,
            CampType::FootballClinic,
        );
        draft.guardian.first_name = " Fatima ".to_string();
        draft.set_number_of_children(2).unwrap();
        draft
    }

    #[test]
    fn test_payload_with_discount() {
        let mut discount = DiscountState::new();
        discount.apply("ADQ20@ADSS2025").unwrap();
        let snapshot = calculate_snapshot(dec!(150), 2, discount.percent());

        let payload = BookingPayload::new(&draft(), &snapshot, discount.applied(), "pi_123");
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["firstName"], "Fatima");
        assert_eq!(json["numberOfChildren"], 2);
        assert_eq!(json["location"], "alAin");
        assert_eq!(json["campType"], "footballClinic");
        assert_eq!(json["paymentId"], "pi_123");
        assert_eq!(json["discountCode"], "ADQ20@ADSS2025");
        assert_eq!(json["discountPercent"], json!(32.73));
        assert_eq!(json["discountType"], "adq employees");
        assert_eq!(json["pricing"]["childPrices"], json!([100.9, 100.9]));
        assert_eq!(json["pricing"]["originalTotal"], json!(300.0));
        assert_eq!(json["children"][1]["dateOfBirth"], Value::Null);
    }

    #[test]
    fn test_payload_without_discount() {
        let snapshot = calculate_snapshot(dec!(150), 2, Decimal::ZERO);
        let payload = BookingPayload::new(&draft(), &snapshot, None, "pi_9");
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["discountCode"], "");
        assert_eq!(json["discountPercent"], json!(0.0));
        assert_eq!(json["discountType"], "");
        assert_eq!(json["pricing"]["finalTotal"], json!(299.3));
    }

    #[test]
    fn test_ack_into_receipt() {
        let ack: BookingAck =
            serde_json::from_value(json!({ "success": true, "booking": { "_id": "66a1", "status": "paid" } }))
                .unwrap();
        let receipt = ack.into_receipt().unwrap();
        assert_eq!(receipt.booking_id, "66a1");
        assert_eq!(receipt.booking["status"], "paid");
    }

    #[test]
    fn test_ack_numeric_id() {
        let ack: BookingAck = serde_json::from_value(json!({ "success": true, "booking": { "id": 42 } })).unwrap();
        assert_eq!(ack.into_receipt().unwrap().booking_id, "42");
    }

    #[test]
    fn test_ack_rejected() {
        let ack: BookingAck = serde_json::from_value(json!({ "success": false })).unwrap();
        assert_eq!(
            ack.into_receipt(),
            Err(PersistenceError::Rejected("Failed to save booking.".to_string()))
        );

        let ack: BookingAck =
            serde_json::from_value(json!({ "success": false, "message": "Duplicate booking" })).unwrap();
        assert_eq!(ack.into_receipt().unwrap_err().to_string(), "Duplicate booking");
    }

    #[test]
    fn test_ack_without_booking_id() {
        let ack: BookingAck = serde_json::from_value(json!({ "success": true, "booking": {} })).unwrap();
        assert!(matches!(ack.into_receipt(), Err(PersistenceError::InvalidResponse(_))));
    }
}

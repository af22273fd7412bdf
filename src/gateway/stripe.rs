//! Stripe integration via REST API (no SDK dependency)
//!
//! Intents are created by the payment server, which holds the secret key.
//! Confirmation goes straight to Stripe with the publishable key, the same
//! call Stripe.js makes from a browser.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{
    PaymentConfirmation, PaymentError, PaymentGateway, PaymentIntent, PaymentMethodDetails,
    SESSION_EXPIRED_CODE,
};

/// Stripe-backed [`PaymentGateway`]
#[derive(Debug, Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    payment_server_url: String,
    api_url: String,
    publishable_key: String,
}

impl StripeGateway {
    pub fn new(payment_server_url: &str, api_url: &str, publishable_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            payment_server_url: payment_server_url.trim_end_matches('/').to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            publishable_key: publishable_key.to_string(),
        }
    }
}

/// Intent id embedded in a client secret (`pi_123_secret_abc` -> `pi_123`)
pub fn intent_id(client_secret: &str) -> Option<&str> {
    client_secret
        .split_once("_secret_")
        .map(|(id, _)| id)
        .filter(|id| !id.is_empty())
}

/// Form fields for the confirm call.
///
/// Card tokens are sent as inline payment method data carrying the billing
/// details; saved payment methods are referenced by id.
pub fn confirm_form(client_secret: &str, details: &PaymentMethodDetails) -> Vec<(&'static str, String)> {
    let billing = &details.billing;
    let mut form = vec![("client_secret", client_secret.to_string())];

    if details.payment_method.starts_with("tok_") {
        form.extend([
            ("payment_method_data[type]", "card".to_string()),
            ("payment_method_data[card][token]", details.payment_method.clone()),
            ("payment_method_data[billing_details][name]", billing.name.clone()),
            ("payment_method_data[billing_details][email]", billing.email.clone()),
            ("payment_method_data[billing_details][phone]", billing.phone.clone()),
            (
                "payment_method_data[billing_details][address][line1]",
                billing.address_line1.clone(),
            ),
        ]);
    } else {
        form.push(("payment_method", details.payment_method.clone()));
    }

    form.push(("receipt_email", billing.email.clone()));
    form
}

/// Map a confirm response body to an outcome
pub fn parse_confirmation(resp: &Value) -> Result<PaymentConfirmation, PaymentError> {
    if let Some(error) = resp.get("error").filter(|e| e.is_object()) {
        let message = error["message"]
            .as_str()
            .unwrap_or("Payment processing failed")
            .to_string();
        let code = error["code"]
            .as_str()
            .or_else(|| error["type"].as_str())
            .unwrap_or("UNKNOWN_ERROR")
            .to_string();

        if code == SESSION_EXPIRED_CODE {
            return Err(PaymentError::SessionExpired { message });
        }
        return Err(PaymentError::Declined { code, message });
    }

    let status = resp["status"].as_str().unwrap_or("unknown");
    if status != "succeeded" {
        return Err(PaymentError::UnexpectedStatus {
            status: status.to_string(),
        });
    }

    let payment_id = resp["id"].as_str().ok_or_else(|| PaymentError::UnexpectedStatus {
        status: format!("{status} without id"),
    })?;

    Ok(PaymentConfirmation {
        payment_id: payment_id.to_string(),
        amount: resp["amount"].as_i64().unwrap_or(0),
        currency: resp["currency"].as_str().unwrap_or_default().to_string(),
    })
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, amount_minor_units: i64, currency: &str) -> Result<PaymentIntent, PaymentError> {
        tracing::info!("Creating payment intent for {} {}", amount_minor_units, currency);

        let resp = self
            .client
            .post(format!("{}/create-payment-intent", self.payment_server_url))
            .json(&json!({ "amount": amount_minor_units, "currency": currency }))
            .send()
            .await
            .map_err(|e| PaymentError::IntentCreation {
                message: e.to_string(),
            })?;

        let ok = resp.status().is_success();
        let body: Value = resp.json().await.map_err(|e| PaymentError::IntentCreation {
            message: e.to_string(),
        })?;

        if !ok {
            return Err(PaymentError::IntentCreation {
                message: body["error"]
                    .as_str()
                    .unwrap_or("Failed to create payment intent")
                    .to_string(),
            });
        }

        body["clientSecret"]
            .as_str()
            .map(|secret| PaymentIntent {
                client_secret: secret.to_string(),
            })
            .ok_or_else(|| PaymentError::IntentCreation {
                message: format!("create-payment-intent returned no clientSecret: {body}"),
            })
    }

    async fn confirm(
        &self,
        client_secret: &str,
        details: &PaymentMethodDetails,
    ) -> Result<PaymentConfirmation, PaymentError> {
        let id = intent_id(client_secret).ok_or_else(|| PaymentError::SessionExpired {
            message: "Malformed client secret".to_string(),
        })?;

        let resp: Value = self
            .client
            .post(format!("{}/v1/payment_intents/{}/confirm", self.api_url, id))
            .bearer_auth(&self.publishable_key)
            .form(&confirm_form(client_secret, details))
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let outcome = parse_confirmation(&resp);
        if let Err(e) = &outcome {
            tracing::warn!("Stripe confirmation for {} failed: {} ({})", id, e, e.code());
        }
        outcome
    }
}

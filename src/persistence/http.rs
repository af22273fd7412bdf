//! Booking API over HTTP

use async_trait::async_trait;

use super::{BookingAck, BookingApi, BookingPayload, PersistenceError};

#[derive(Debug, Clone)]
pub struct HttpBookingApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBookingApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn bookings_url(&self) -> String {
        format!("{}/api/bookings", self.base_url)
    }
}

#[async_trait]
impl BookingApi for HttpBookingApi {
    async fn create_booking(&self, payload: &BookingPayload) -> Result<BookingAck, PersistenceError> {
        tracing::info!(
            "Saving booking for payment {} ({} children)",
            payload.payment_id,
            payload.number_of_children
        );

        let resp = self
            .client
            .post(self.bookings_url())
            .json(payload)
            .send()
            .await
            .map_err(|e| PersistenceError::Transport(e.to_string()))?;

        let status = resp.status();
        let ack: BookingAck = resp
            .json()
            .await
            .map_err(|e| PersistenceError::InvalidResponse(format!("{status}: {e}")))?;

        if !status.is_success() && ack.success {
            return Err(PersistenceError::InvalidResponse(format!(
                "{status} with a successful body"
            )));
        }

        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bookings_url() {
        let api = HttpBookingApi::new("http://localhost:5000/");
        assert_eq!(api.bookings_url(), "http://localhost:5000/api/bookings");
    }
}

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use super::{shapes, ApiError, BookingApi};
use crate::models::{BookingRequest, PaymentRecord, PaymentStatus};

/// `BookingApi` over the remote REST backend.
pub struct HttpBookingApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBookingApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json(resp: reqwest::Response) -> Result<serde_json::Value, ApiError> {
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: shapes::error_message(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }
}

fn network(e: reqwest::Error) -> ApiError {
    ApiError::Network(e.to_string())
}

#[async_trait]
impl BookingApi for HttpBookingApi {
    async fn create_booking(
        &self,
        token: Option<&str>,
        request: &BookingRequest,
    ) -> Result<serde_json::Value, ApiError> {
        let mut builder = self.client.post(self.url("/bookings")).json(&request.to_wire());
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        let resp = builder.send().await.map_err(network)?;
        let created = Self::read_json(resp).await?;
        tracing::info!(
            check_in = %request.check_in,
            check_out = %request.check_out,
            guests = request.adults + request.children,
            "booking created"
        );
        Ok(created)
    }

    async fn update_payment_status(
        &self,
        token: &str,
        booking_id: &str,
        status: PaymentStatus,
    ) -> Result<(), ApiError> {
        let resp = self
            .client
            .patch(self.url(&format!("/admin/bookings/{booking_id}/payment_status")))
            .bearer_auth(token)
            .json(&json!({ "payment_status": status.as_str() }))
            .send()
            .await
            .map_err(network)?;

        let status_code = resp.status();
        if !status_code.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ApiError::Rejected {
                status: status_code.as_u16(),
                message: shapes::error_message(&text),
            });
        }
        Ok(())
    }

    async fn list_payments(&self, token: &str) -> Result<Vec<PaymentRecord>, ApiError> {
        let resp = self
            .client
            .get(self.url("/admin/payments"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(network)?;

        let body = Self::read_json(resp).await?;
        shapes::payments(&body, Utc::now())
    }

    async fn nationalities(&self) -> Result<Vec<String>, ApiError> {
        let resp = self
            .client
            .get(self.url("/nationalities"))
            .send()
            .await
            .map_err(network)?;
        let body = Self::read_json(resp).await?;
        shapes::catalog(&body, "nationalities")
    }

    async fn room_types(&self) -> Result<Vec<String>, ApiError> {
        let resp = self
            .client
            .get(self.url("/room_types"))
            .send()
            .await
            .map_err(network)?;
        let body = Self::read_json(resp).await?;
        shapes::catalog(&body, "room_types")
    }
}

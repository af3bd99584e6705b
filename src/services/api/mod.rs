pub mod http;
pub mod shapes;

use async_trait::async_trait;

use crate::models::{BookingRequest, PaymentRecord, PaymentStatus};

pub use http::HttpBookingApi;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("remote API rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ApiError {
    /// Network failures and non-2xx answers; recovered by re-fetching.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Rejected { .. })
    }
}

/// The remote REST backend. Every call that needs auth takes the bearer token explicitly.
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn create_booking(
        &self,
        token: Option<&str>,
        request: &BookingRequest,
    ) -> Result<serde_json::Value, ApiError>;

    async fn update_payment_status(
        &self,
        token: &str,
        booking_id: &str,
        status: PaymentStatus,
    ) -> Result<(), ApiError>;

    async fn list_payments(&self, token: &str) -> Result<Vec<PaymentRecord>, ApiError>;

    async fn nationalities(&self) -> Result<Vec<String>, ApiError>;

    async fn room_types(&self) -> Result<Vec<String>, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_bodies_are_not_transient() {
        assert!(ApiError::Network("connection refused".to_string()).is_transient());
        assert!(ApiError::Rejected {
            status: 503,
            message: "maintenance".to_string(),
        }
        .is_transient());
        assert!(!ApiError::MalformedResponse("expected a list".to_string()).is_transient());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    PartialPaid,
    PaymentMade,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::PartialPaid => "partial_paid",
            PaymentStatus::PaymentMade => "payment_made",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "pending" => Some(PaymentStatus::Pending),
            "partial_paid" => Some(PaymentStatus::PartialPaid),
            "payment_made" => Some(PaymentStatus::PaymentMade),
            _ => None,
        }
    }

    /// Admins may move between any two distinct statuses, corrections included.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        *self != next
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    pub booking_id: String,
    pub status: PaymentStatus,
    pub amount: f64,
    pub last_seen_at: DateTime<Utc>,
}

/// What callers get to see of the payment list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PaymentView {
    pub records: Vec<PaymentRecord>,
    pub loading: bool,
    pub pending_operations: usize,
    pub last_error: Option<String>,
}

impl PaymentView {
    pub fn status_of(&self, booking_id: &str) -> Option<PaymentStatus> {
        self.records
            .iter()
            .find(|r| r.booking_id == booking_id)
            .map(|r| r.status)
    }
}

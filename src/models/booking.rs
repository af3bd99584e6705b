use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw booking form state as the front end submits it. Every value is still a string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingForm {
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub room_type: String,
    #[serde(default)]
    pub check_in: String,
    #[serde(default)]
    pub check_out: String,
    #[serde(default)]
    pub adults: String,
    #[serde(default)]
    pub children: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A booking request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub nationality: String,
    pub room_type: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub children: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl BookingRequest {
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Body for `POST /bookings`. Admin-authored requests also carry owner and status.
    pub fn to_wire(&self) -> serde_json::Value {
        let mut booking = serde_json::json!({
            "nationality": self.nationality,
            "room_type": self.room_type,
            "check_in": self.check_in.format("%Y-%m-%d").to_string(),
            "check_out": self.check_out.format("%Y-%m-%d").to_string(),
            "adults": self.adults,
            "children": self.children,
        });
        if let Some(user_id) = &self.user_id {
            booking["user_id"] = serde_json::json!(user_id);
        }
        if let Some(status) = &self.status {
            booking["status"] = serde_json::json!(status);
        }
        serde_json::json!({ "booking": booking })
    }
}

/// Which booking surface a request comes from. Each carries its own guest caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingSurface {
    #[default]
    QuickSearch,
    PackagePage,
    Admin,
}

impl BookingSurface {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingSurface::QuickSearch => "quick_search",
            BookingSurface::PackagePage => "package_page",
            BookingSurface::Admin => "admin",
        }
    }
}

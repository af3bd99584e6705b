use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// An issued bearer token. Immutable once created; `expiry` is derived from the TTL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expiry: DateTime<Utc>,
}

impl SessionToken {
    pub fn issue(token: impl Into<String>, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            token: token.into(),
            issued_at,
            expiry: issued_at + ttl,
        }
    }
}

/// Contents of the `adminSessionData` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub issued_at: DateTime<Utc>,
    pub expiry: DateTime<Utc>,
    #[serde(default)]
    pub remember: bool,
}

/// "Remember me" record. Survives logout; restoring it is gated by the logout quarantine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RememberedSession {
    pub session: SessionToken,
    #[serde(default)]
    pub user: Option<super::User>,
}

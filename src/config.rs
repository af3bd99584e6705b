use std::env;
use std::time::Duration;

use crate::services::session::SessionExpiryPolicy;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub api_base_url: String,
    pub allowed_origin: Option<String>,
    pub poll_interval: Duration,
    pub confirm_delay: Duration,
    pub session_ttl_hours: i64,
    pub logout_quarantine_secs: i64,
    pub max_stay_days: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Out-of-range numbers are clamped.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var_or = |key: &str, default: i64| -> i64 {
            lookup(key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };

        Self {
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "southcoast.db".to_string()),
            api_base_url: lookup("API_BASE_URL")
                .unwrap_or_else(|| "http://localhost:8080/api/v1".to_string()),
            allowed_origin: lookup("ALLOWED_ORIGIN").filter(|v| !v.is_empty()),
            // tokio intervals panic on a zero period
            poll_interval: Duration::from_secs(var_or("POLL_INTERVAL_SECS", 10).max(1) as u64),
            confirm_delay: Duration::from_millis(var_or("CONFIRM_DELAY_MS", 1000).max(0) as u64),
            session_ttl_hours: var_or("SESSION_TTL_HOURS", 24).max(1),
            logout_quarantine_secs: var_or("LOGOUT_QUARANTINE_SECS", 300).max(0),
            max_stay_days: lookup("MAX_STAY_DAYS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }

    pub fn session_policy(&self) -> SessionExpiryPolicy {
        let defaults = SessionExpiryPolicy::default();
        SessionExpiryPolicy {
            ttl: chrono::Duration::try_hours(self.session_ttl_hours).unwrap_or(defaults.ttl),
            logout_quarantine: chrono::Duration::try_seconds(self.logout_quarantine_secs)
                .unwrap_or(defaults.logout_quarantine),
        }
    }
}

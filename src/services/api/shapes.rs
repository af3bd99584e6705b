//! Maps the response shapes the remote API is known to return onto one internal type.
//! Anything outside the known shapes is logged and rejected, never guessed.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::ApiError;
use crate::models::{PaymentRecord, PaymentStatus};

/// `GET /admin/payments`: a bare array, `{ payments: [...] }` or `{ data: [...] }`.
pub fn payments(body: &Value, now: DateTime<Utc>) -> Result<Vec<PaymentRecord>, ApiError> {
    let items = list_payload(body, &["payments", "data"]).ok_or_else(|| {
        tracing::warn!(body = %truncate(&body.to_string()), "unrecognized payments payload");
        ApiError::MalformedResponse("unrecognized payments payload".to_string())
    })?;

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match payment_record(item, now) {
            Some(record) => records.push(record),
            None => tracing::warn!(item = %truncate(&item.to_string()), "skipping unrecognized payment record"),
        }
    }
    Ok(records)
}

/// Catalog lists: array or `{ data: [...] }`, of strings or `{ name }` objects.
pub fn catalog(body: &Value, key: &str) -> Result<Vec<String>, ApiError> {
    let items = list_payload(body, &[key, "data"]).ok_or_else(|| {
        tracing::warn!(catalog = key, "unrecognized catalog payload");
        ApiError::MalformedResponse(format!("unrecognized {key} payload"))
    })?;

    Ok(items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Object(_) => item
                .get("name")
                .or_else(|| item.get("label"))
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect())
}

/// Best human-readable message out of an error body: `error`, `errors[]` or `message`.
pub fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return truncate(body.trim());
    };

    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return error.to_string();
    }
    if let Some(errors) = value.get("errors").and_then(Value::as_array) {
        let joined = errors
            .iter()
            .map(|e| match e {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        if !joined.is_empty() {
            return joined;
        }
    }
    if let Some(message) = value.get("message").and_then(Value::as_str) {
        return message.to_string();
    }
    truncate(body.trim())
}

fn list_payload<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    if let Some(list) = body.as_array() {
        return Some(list);
    }
    keys.iter()
        .find_map(|key| body.get(key).and_then(Value::as_array))
}

fn payment_record(item: &Value, now: DateTime<Utc>) -> Option<PaymentRecord> {
    let booking_id = item
        .get("booking_id")
        .and_then(id_string)
        .or_else(|| item.get("booking").and_then(|b| b.get("id")).and_then(id_string))
        .or_else(|| item.get("id").and_then(id_string))?;

    let status = ["payment_status", "status"]
        .iter()
        .find_map(|key| item.get(key).and_then(Value::as_str))
        .and_then(PaymentStatus::parse)?;

    let amount = ["amount", "total_amount", "total_price"]
        .iter()
        .find_map(|key| item.get(key).and_then(amount_value))
        .unwrap_or(0.0);

    Some(PaymentRecord {
        booking_id,
        status,
        amount,
        last_seen_at: now,
    })
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn amount_value(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn truncate(s: &str) -> String {
    s.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payments_top_level_array() {
        let body = json!([
            {"booking_id": 12, "payment_status": "partial_paid", "amount": "250.50"},
            {"id": "13", "status": "pending", "amount": 100}
        ]);
        let records = payments(&body, Utc::now()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].booking_id, "12");
        assert_eq!(records[0].status, PaymentStatus::PartialPaid);
        assert_eq!(records[0].amount, 250.5);
        assert_eq!(records[1].booking_id, "13");
        assert_eq!(records[1].amount, 100.0);
    }

    #[test]
    fn test_payments_nested_under_payments_and_data() {
        let nested = json!({"payments": [{"booking_id": "7", "payment_status": "payment_made"}]});
        assert_eq!(payments(&nested, Utc::now()).unwrap()[0].booking_id, "7");

        let data = json!({"data": [{"booking": {"id": 8}, "payment_status": "pending", "total_amount": 75}]});
        let records = payments(&data, Utc::now()).unwrap();
        assert_eq!(records[0].booking_id, "8");
        assert_eq!(records[0].amount, 75.0);
    }

    #[test]
    fn test_payments_unknown_shape_is_malformed() {
        let body = json!({"bookings": []});
        assert!(matches!(
            payments(&body, Utc::now()),
            Err(ApiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_payments_skips_unknown_status() {
        let body = json!([
            {"booking_id": "1", "payment_status": "refunded"},
            {"booking_id": "2", "payment_status": "pending"}
        ]);
        let records = payments(&body, Utc::now()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].booking_id, "2");
    }

    #[test]
    fn test_catalog_strings_and_objects() {
        let body = json!({"data": ["Filipino", {"name": "Korean"}, {"id": 3}, ""]});
        assert_eq!(catalog(&body, "nationalities").unwrap(), vec!["Filipino", "Korean"]);

        let keyed = json!({"room_types": [{"label": "Deluxe"}]});
        assert_eq!(catalog(&keyed, "room_types").unwrap(), vec!["Deluxe"]);
    }

    #[test]
    fn test_error_message_variants() {
        assert_eq!(error_message(r#"{"error":"Room unavailable"}"#), "Room unavailable");
        assert_eq!(
            error_message(r#"{"errors":["Check in can't be blank","Adults is invalid"]}"#),
            "Check in can't be blank, Adults is invalid"
        );
        assert_eq!(error_message(r#"{"message":"Forbidden"}"#), "Forbidden");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }
}

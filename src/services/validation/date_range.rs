use chrono::NaiveDate;

use crate::models::{ErrorCode, Field, ValidationResult};

/// Check-in/check-out rule. `today` is supplied by the caller.
pub fn validate(
    check_in: NaiveDate,
    check_out: NaiveDate,
    today: NaiveDate,
    max_stay_days: u32,
) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if check_in < today {
        result.reject(
            Field::CheckIn,
            ErrorCode::PastCheckIn,
            "Check-in date cannot be in the past",
        );
    }

    if check_out < today {
        result.reject(
            Field::CheckOut,
            ErrorCode::PastCheckOut,
            "Check-out date cannot be in the past",
        );
    }

    if check_out <= check_in {
        result.reject(
            Field::CheckOut,
            ErrorCode::InvertedRange,
            "Check-out date must be after check-in date",
        );
    } else if (check_out - check_in).num_days() > i64::from(max_stay_days) {
        result.reject(
            Field::CheckOut,
            ErrorCode::StayTooLong,
            format!("Stay cannot be longer than {max_stay_days} nights"),
        );
    }

    result
}

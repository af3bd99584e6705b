use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Form fields a validation error can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Nationality,
    RoomType,
    CheckIn,
    CheckOut,
    Adults,
    Children,
    Guests,
    UserId,
    Status,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Nationality => "nationality",
            Field::RoomType => "room_type",
            Field::CheckIn => "check_in",
            Field::CheckOut => "check_out",
            Field::Adults => "adults",
            Field::Children => "children",
            Field::Guests => "guests",
            Field::UserId => "user_id",
            Field::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Required,
    Invalid,
    PastCheckIn,
    PastCheckOut,
    InvertedRange,
    StayTooLong,
    AdultsOutOfRange,
    ChildrenOutOfRange,
    TotalOutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub code: ErrorCode,
    pub message: String,
}

/// Outcome of one validation pass. Holds at most one error per field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub field_errors: BTreeMap<Field, FieldError>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            field_errors: BTreeMap::new(),
        }
    }

    /// Records an error unless the field already carries one; the first failing check wins.
    pub fn reject(&mut self, field: Field, code: ErrorCode, message: impl Into<String>) {
        self.field_errors.entry(field).or_insert_with(|| FieldError {
            code,
            message: message.into(),
        });
        self.valid = false;
    }

    pub fn merge(&mut self, other: ValidationResult) {
        for (field, error) in other.field_errors {
            self.reject(field, error.code, error.message);
        }
    }

    pub fn error(&self, field: Field) -> Option<&FieldError> {
        self.field_errors.get(&field)
    }

    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.field_errors.values().any(|e| e.code == code)
    }
}

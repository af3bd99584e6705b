use serde::{Deserialize, Serialize};

use crate::models::{ErrorCode, Field, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCaps {
    pub max_adults: u32,
    pub max_children: u32,
    pub max_total: u32,
}

impl GuestCaps {
    /// Caps used by the quick-search widget.
    pub const QUICK_SEARCH: GuestCaps = GuestCaps {
        max_adults: 2,
        max_children: 3,
        max_total: 5,
    };

    /// Caps used by the full package page and admin authoring.
    pub const PACKAGE_PAGE: GuestCaps = GuestCaps {
        max_adults: 20,
        max_children: 20,
        max_total: 20,
    };
}

pub fn validate(adults: u32, children: u32, caps: &GuestCaps) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if !(1..=caps.max_adults).contains(&adults) {
        result.reject(
            Field::Adults,
            ErrorCode::AdultsOutOfRange,
            format!("Adults must be between 1 and {}", caps.max_adults),
        );
    }

    if children > caps.max_children {
        result.reject(
            Field::Children,
            ErrorCode::ChildrenOutOfRange,
            format!("Children must be between 0 and {}", caps.max_children),
        );
    }

    let total = adults.saturating_add(children);
    if !(1..=caps.max_total).contains(&total) {
        result.reject(
            Field::Guests,
            ErrorCode::TotalOutOfRange,
            format!("Total guests must be between 1 and {}", caps.max_total),
        );
    }

    result
}

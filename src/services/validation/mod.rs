pub mod date_range;
pub mod guest_count;

use chrono::NaiveDate;

use crate::models::{BookingForm, BookingRequest, BookingSurface, ErrorCode, Field, ValidationResult};

pub use guest_count::GuestCaps;

/// Everything a validation pass needs besides the form itself.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    pub surface: BookingSurface,
    pub caps: GuestCaps,
    pub max_stay_days: u32,
}

impl ValidationContext {
    pub fn for_surface(surface: BookingSurface, max_stay_days: u32) -> Self {
        let caps = match surface {
            BookingSurface::QuickSearch => GuestCaps::QUICK_SEARCH,
            BookingSurface::PackagePage | BookingSurface::Admin => GuestCaps::PACKAGE_PAGE,
        };
        Self {
            surface,
            caps,
            max_stay_days,
        }
    }

    fn requires_author_fields(&self) -> bool {
        self.surface == BookingSurface::Admin
    }
}

/// Runs every rule over the form and reports all failing fields at once.
pub fn validate(form: &BookingForm, ctx: &ValidationContext, today: NaiveDate) -> ValidationResult {
    check(form, ctx, today).0
}

/// Validates and, when nothing failed, returns the typed request.
pub fn build(
    form: &BookingForm,
    ctx: &ValidationContext,
    today: NaiveDate,
) -> Result<BookingRequest, ValidationResult> {
    match check(form, ctx, today) {
        (result, Some(request)) if result.valid => Ok(request),
        (result, _) => Err(result),
    }
}

fn check(
    form: &BookingForm,
    ctx: &ValidationContext,
    today: NaiveDate,
) -> (ValidationResult, Option<BookingRequest>) {
    let mut result = ValidationResult::ok();

    let nationality = required_text(&mut result, Field::Nationality, &form.nationality, "Nationality");
    let room_type = required_text(&mut result, Field::RoomType, &form.room_type, "Room type");

    let (user_id, status) = if ctx.requires_author_fields() {
        let user_id = required_text(
            &mut result,
            Field::UserId,
            form.user_id.as_deref().unwrap_or_default(),
            "User",
        );
        let status = required_text(
            &mut result,
            Field::Status,
            form.status.as_deref().unwrap_or_default(),
            "Status",
        );
        (user_id, status)
    } else {
        (None, None)
    };

    let check_in = parse_date(&mut result, Field::CheckIn, &form.check_in, "Check-in date");
    let check_out = parse_date(&mut result, Field::CheckOut, &form.check_out, "Check-out date");
    if let (Some(check_in), Some(check_out)) = (check_in, check_out) {
        result.merge(date_range::validate(check_in, check_out, today, ctx.max_stay_days));
    }

    let adults = parse_count(&mut result, Field::Adults, &form.adults, "Adults", true);
    let children = parse_count(&mut result, Field::Children, &form.children, "Children", false);
    let guests = match (adults, children) {
        (Some(adults), Some(children)) => {
            let (adults, children) = clamp_negative(&mut result, adults, children, &ctx.caps);
            result.merge(guest_count::validate(adults, children, &ctx.caps));
            Some((adults, children))
        }
        _ => None,
    };

    let request = match (nationality, room_type, check_in, check_out, guests) {
        (Some(nationality), Some(room_type), Some(check_in), Some(check_out), Some((adults, children)))
            if result.valid =>
        {
            Some(BookingRequest {
                nationality,
                room_type,
                check_in,
                check_out,
                adults,
                children,
                user_id,
                status,
            })
        }
        _ => None,
    };

    (result, request)
}

fn required_text(
    result: &mut ValidationResult,
    field: Field,
    value: &str,
    label: &str,
) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        result.reject(field, ErrorCode::Required, format!("{label} is required"));
        return None;
    }
    Some(value.to_string())
}

fn parse_date(
    result: &mut ValidationResult,
    field: Field,
    value: &str,
    label: &str,
) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        result.reject(field, ErrorCode::Required, format!("{label} is required"));
        return None;
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            result.reject(
                field,
                ErrorCode::Invalid,
                format!("{label} must be a valid date (YYYY-MM-DD)"),
            );
            None
        }
    }
}

// An empty children field means none; an empty adults field is missing.
fn parse_count(
    result: &mut ValidationResult,
    field: Field,
    value: &str,
    label: &str,
    required: bool,
) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        if required {
            result.reject(field, ErrorCode::Required, format!("{label} is required"));
            return None;
        }
        return Some(0);
    }
    match value.parse::<i64>() {
        Ok(n) => Some(n),
        Err(_) => {
            result.reject(field, ErrorCode::Invalid, format!("{label} must be a whole number"));
            None
        }
    }
}

fn clamp_negative(
    result: &mut ValidationResult,
    adults: i64,
    children: i64,
    caps: &GuestCaps,
) -> (u32, u32) {
    if children < 0 {
        result.reject(
            Field::Children,
            ErrorCode::ChildrenOutOfRange,
            format!("Children must be between 0 and {}", caps.max_children),
        );
    }
    let adults = u32::try_from(adults.max(0)).unwrap_or(u32::MAX);
    let children = u32::try_from(children.max(0)).unwrap_or(u32::MAX);
    (adults, children)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::parse_from_str("2025-06-01", "%Y-%m-%d").unwrap()
    }

    fn form(check_in: &str, check_out: &str, adults: &str, children: &str) -> BookingForm {
        BookingForm {
            nationality: "Filipino".to_string(),
            room_type: "Deluxe".to_string(),
            check_in: check_in.to_string(),
            check_out: check_out.to_string(),
            adults: adults.to_string(),
            children: children.to_string(),
            user_id: None,
            status: None,
        }
    }

    fn quick_search() -> ValidationContext {
        ValidationContext::for_surface(BookingSurface::QuickSearch, 30)
    }

    #[test]
    fn test_inverted_range_scenario() {
        let result = validate(&form("2025-06-10", "2025-06-09", "1", "0"), &quick_search(), today());
        assert!(!result.valid);
        assert_eq!(
            result.error(Field::CheckOut).unwrap().code,
            ErrorCode::InvertedRange
        );
    }

    #[test]
    fn test_valid_scenario_builds_request() {
        let request = build(&form("2025-06-10", "2025-06-11", "1", "0"), &quick_search(), today())
            .unwrap();
        assert_eq!(request.adults, 1);
        assert_eq!(request.children, 0);
        assert_eq!(request.nights(), 1);
        assert_eq!(request.nationality, "Filipino");
    }

    #[test]
    fn test_three_adults_in_quick_search() {
        let result = validate(&form("2025-06-10", "2025-06-11", "3", "0"), &quick_search(), today());
        let err = result.error(Field::Adults).unwrap();
        assert_eq!(err.code, ErrorCode::AdultsOutOfRange);
        assert_eq!(err.message, "Adults must be between 1 and 2");
    }

    #[test]
    fn test_three_adults_allowed_on_package_page() {
        let ctx = ValidationContext::for_surface(BookingSurface::PackagePage, 30);
        let result = validate(&form("2025-06-10", "2025-06-11", "3", "0"), &ctx, today());
        assert!(result.valid);
    }

    #[test]
    fn test_reports_every_failing_field() {
        let mut f = form("2025-06-10", "2025-06-09", "3", "9");
        f.nationality = "  ".to_string();
        f.room_type = String::new();

        let result = validate(&f, &quick_search(), today());
        let fields: Vec<Field> = result.field_errors.keys().copied().collect();
        assert_eq!(
            fields,
            vec![
                Field::Nationality,
                Field::RoomType,
                Field::CheckOut,
                Field::Adults,
                Field::Children,
                Field::Guests,
            ]
        );
    }

    #[test]
    fn test_error_set_independent_of_field_order() {
        let a: BookingForm = serde_json::from_str(
            r#"{"nationality":"","room_type":"Suite","check_in":"2025-06-10","check_out":"2025-06-01","adults":"0","children":"1"}"#,
        )
        .unwrap();
        let b: BookingForm = serde_json::from_str(
            r#"{"children":"1","adults":"0","check_out":"2025-06-01","check_in":"2025-06-10","room_type":"Suite","nationality":""}"#,
        )
        .unwrap();

        assert_eq!(
            validate(&a, &quick_search(), today()),
            validate(&b, &quick_search(), today())
        );
    }

    #[test]
    fn test_unparseable_values() {
        let result = validate(&form("10/06/2025", "", "two", "x"), &quick_search(), today());
        assert_eq!(result.error(Field::CheckIn).unwrap().code, ErrorCode::Invalid);
        assert_eq!(result.error(Field::CheckOut).unwrap().code, ErrorCode::Required);
        assert_eq!(result.error(Field::Adults).unwrap().code, ErrorCode::Invalid);
        assert_eq!(result.error(Field::Children).unwrap().code, ErrorCode::Invalid);
        assert!(result.error(Field::Guests).is_none());
    }

    #[test]
    fn test_empty_children_means_none() {
        let result = validate(&form("2025-06-10", "2025-06-11", "2", ""), &quick_search(), today());
        assert!(result.valid);
    }

    #[test]
    fn test_negative_children_rejected() {
        let result = validate(&form("2025-06-10", "2025-06-11", "1", "-1"), &quick_search(), today());
        assert_eq!(
            result.error(Field::Children).unwrap().code,
            ErrorCode::ChildrenOutOfRange
        );
    }

    #[test]
    fn test_admin_context_requires_user_and_status() {
        let ctx = ValidationContext::for_surface(BookingSurface::Admin, 30);
        let result = validate(&form("2025-06-10", "2025-06-11", "2", "0"), &ctx, today());
        assert_eq!(result.error(Field::UserId).unwrap().message, "User is required");
        assert_eq!(result.error(Field::Status).unwrap().message, "Status is required");

        let mut f = form("2025-06-10", "2025-06-11", "2", "0");
        f.user_id = Some("42".to_string());
        f.status = Some("confirmed".to_string());
        let request = build(&f, &ctx, today()).unwrap();
        assert_eq!(request.user_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_author_fields_ignored_outside_admin() {
        let result = validate(&form("2025-06-10", "2025-06-11", "2", "0"), &quick_search(), today());
        assert!(result.error(Field::UserId).is_none());
    }
}

// Query parameter validation
//
// Dates, limits and categories are parsed here before any store access.
// Failures become 400 responses carrying the parse error message.

use axum::http::StatusCode;
use axum::Json;
use pulse_core::{DateRange, EventCategory};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::common::ErrorResponse;

/// Returned when a route that needs a window gets only part of one
pub const RANGE_REQUIRED_MESSAGE: &str = "startDate and endDate are required";

/// Validation error carrying the client-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl From<pulse_core::Error> for ValidationError {
    fn from(e: pulse_core::Error) -> Self {
        ValidationError(e.to_string())
    }
}

impl From<ValidationError> for (StatusCode, Json<ErrorResponse>) {
    fn from(e: ValidationError) -> Self {
        (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.0)))
    }
}

/// Date window query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RangeParams {
    /// Window start, `YYYY-MM-DD`, inclusive.
    pub start_date: Option<String>,
    /// Window end, `YYYY-MM-DD`, inclusive of the whole day.
    pub end_date: Option<String>,
}

impl RangeParams {
    /// Both bounds are mandatory
    pub fn required(&self) -> Result<DateRange, ValidationError> {
        match (non_empty(&self.start_date), non_empty(&self.end_date)) {
            (Some(start), Some(end)) => Ok(DateRange::parse(start, end)?),
            _ => {
                tracing::debug!(
                    start_date = ?self.start_date,
                    end_date = ?self.end_date,
                    "Rejecting request without a complete date range"
                );
                Err(ValidationError(RANGE_REQUIRED_MESSAGE.to_string()))
            }
        }
    }

    /// Both bounds or neither
    pub fn optional(&self) -> Result<Option<DateRange>, ValidationError> {
        Ok(DateRange::parse_optional(
            non_empty(&self.start_date),
            non_empty(&self.end_date),
        )?)
    }
}

/// Event listing query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EventParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Exact page path, e.g. `/pricing`.
    pub page_path: Option<String>,
    /// Maximum number of events, newest first.
    pub limit: Option<String>,
}

impl EventParams {
    pub fn range(&self) -> RangeParams {
        RangeParams {
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
        }
    }

    pub fn page_path(&self) -> Option<&str> {
        non_empty(&self.page_path)
    }
}

/// Positive integer limit, `default` when absent
pub fn parse_limit(raw: Option<&str>, default: usize) -> Result<usize, ValidationError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(value) => match value.parse::<usize>() {
            Ok(limit) if limit > 0 => Ok(limit),
            _ => Err(pulse_core::Error::InvalidLimit(value.to_string()).into()),
        },
    }
}

pub fn parse_category(raw: &str) -> Result<EventCategory, ValidationError> {
    Ok(raw.parse::<EventCategory>()?)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(start: Option<&str>, end: Option<&str>) -> RangeParams {
        RangeParams {
            start_date: start.map(String::from),
            end_date: end.map(String::from),
        }
    }

    #[test]
    fn test_required_range_needs_both_dates() {
        let err = params(Some("2025-01-01"), None).required().unwrap_err();
        assert_eq!(err.0, RANGE_REQUIRED_MESSAGE);

        let err = params(Some(""), Some("2025-01-01")).required().unwrap_err();
        assert_eq!(err.0, RANGE_REQUIRED_MESSAGE);

        assert!(params(Some("2025-01-01"), Some("2025-01-31")).required().is_ok());
    }

    #[test]
    fn test_required_range_rejects_bad_dates() {
        assert!(params(Some("2025-13-01"), Some("2025-01-31")).required().is_err());
        assert!(params(Some("2025-02-01"), Some("2025-01-31")).required().is_err());
    }

    #[test]
    fn test_optional_range() {
        assert_eq!(params(None, None).optional().unwrap(), None);
        assert!(params(Some("2025-01-01"), None).optional().is_err());
        assert!(params(Some("2025-01-01"), Some("2025-01-02"))
            .optional()
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None, 100).unwrap(), 100);
        assert_eq!(parse_limit(Some("25"), 100).unwrap(), 25);
        assert!(parse_limit(Some("0"), 100).is_err());
        assert!(parse_limit(Some("-3"), 100).is_err());
        assert!(parse_limit(Some("ten"), 100).is_err());
    }

    #[test]
    fn test_parse_category() {
        assert_eq!(parse_category("scroll").unwrap(), EventCategory::Scroll);
        assert!(parse_category("hover").is_err());
    }
}

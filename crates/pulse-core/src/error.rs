// Error types for the analytics domain

use thiserror::Error;

/// Result type alias for domain operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while validating analytics inputs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A date parameter was not a `YYYY-MM-DD` calendar date
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Only one of the two range bounds was supplied
    #[error("startDate and endDate must be provided together")]
    IncompleteRange,

    /// Start date falls after end date
    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: String, end: String },

    /// Event category outside the closed set
    #[error("unknown event category: {0}")]
    UnknownCategory(String),

    /// Flow key did not split into exactly two non-empty parts
    #[error("invalid flow key '{0}': expected '<source>-><target>'")]
    InvalidFlowKey(String),

    /// Flow count missing or not a non-negative integer
    #[error("invalid flow count: {0}")]
    InvalidCount(String),

    /// Page filter path segments could not be interpreted
    #[error("invalid page filter: {0}")]
    InvalidPageFilter(String),

    /// Limit must be a positive integer
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
}

impl Error {
    pub fn invalid_date(value: impl Into<String>) -> Self {
        Error::InvalidDate(value.into())
    }

    pub fn invalid_flow_key(key: impl Into<String>) -> Self {
        Error::InvalidFlowKey(key.into())
    }

    pub fn invalid_page_filter(msg: impl Into<String>) -> Self {
        Error::InvalidPageFilter(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::invalid_date("2025-13-01").to_string(),
            "invalid date '2025-13-01': expected YYYY-MM-DD"
        );
        assert_eq!(
            Error::InvalidRange {
                start: "2025-02-01".into(),
                end: "2025-01-01".into()
            }
            .to_string(),
            "invalid date range: 2025-02-01 is after 2025-01-01"
        );
        assert_eq!(
            Error::invalid_flow_key("onlysource").to_string(),
            "invalid flow key 'onlysource': expected '<source>-><target>'"
        );
    }
}

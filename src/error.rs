//! Error types shared by the query, repository and HTTP layers.

/// Failure while running a query or decoding its rows.
///
/// A decode failure aborts the whole operation just like a connectivity or
/// syntax failure; callers never see partial results.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("decode error in column {column}: expected {expected}, found {found}")]
    Decode {
        column: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("unsupported column type {type_name} in column {column}")]
    UnsupportedColumn { column: usize, type_name: String },

    #[error("query cancelled")]
    Cancelled,

    #[error("query deadline exceeded")]
    DeadlineExceeded,
}

impl QueryError {
    /// True for caller-initiated aborts (explicit cancellation or deadline).
    pub fn is_cancellation(&self) -> bool {
        matches!(self, QueryError::Cancelled | QueryError::DeadlineExceeded)
    }
}

/// Rejected client input. Raised before any storage access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("start_date and end_date are required (YYYY-MM-DD)")]
    MissingDateRange,

    #[error("invalid {field} format, use YYYY-MM-DD")]
    InvalidDate { field: &'static str },

    #[error("end_date must not be before start_date")]
    InvertedDateRange,

    #[error("'{0}' is required")]
    MissingParameter(&'static str),

    #[error("'{0}' must be a single non-empty word")]
    InvalidKeyword(String),

    #[error("at least one keyword is required")]
    EmptyKeywordList,

    #[error("invalid value for '{field}': {value}")]
    InvalidChoice { field: &'static str, value: String },
}

/// Error returned by every repository operation.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_kinds() {
        assert!(QueryError::Cancelled.is_cancellation());
        assert!(QueryError::DeadlineExceeded.is_cancellation());
        assert!(!QueryError::Database(sqlx::Error::RowNotFound).is_cancellation());
    }

    #[test]
    fn test_validation_messages_are_readable() {
        let err = ValidationError::InvalidKeyword("two words".to_string());
        assert_eq!(err.to_string(), "'two words' must be a single non-empty word");

        let err: AnalyticsError = ValidationError::EmptyKeywordList.into();
        assert_eq!(err.to_string(), "at least one keyword is required");
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Remote catalog fetch failed: {0}")]
    Fetch(String),

    #[error("no match found for {record}")]
    NoMatch { record: String },

    #[error("no price available for {record}")]
    NoPrice { record: String },

    #[error("price update rejected for record {id}")]
    UpdateRejected { id: i64 },
}

impl AppError {
    /// Record-scoped errors are isolated per record; everything else aborts the run.
    pub fn is_record_scoped(&self) -> bool {
        matches!(
            self,
            AppError::NoMatch { .. } | AppError::NoPrice { .. } | AppError::UpdateRejected { .. }
        )
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_message() {
        let err = AppError::NoMatch {
            record: "Classic Tote (id 7)".to_string(),
        };
        assert_eq!(err.to_string(), "no match found for Classic Tote (id 7)");
        assert!(err.is_record_scoped());
    }

    #[test]
    fn test_no_price_message() {
        let err = AppError::NoPrice {
            record: "record 12".to_string(),
        };
        assert_eq!(err.to_string(), "no price available for record 12");
        assert!(err.is_record_scoped());
    }

    #[test]
    fn test_fetch_error_is_fatal() {
        let err = AppError::Fetch("page at offset 200 returned 503".to_string());
        assert!(!err.is_record_scoped());
        assert!(err.to_string().contains("offset 200"));
    }

    #[test]
    fn test_update_rejected_message() {
        let err = AppError::UpdateRejected { id: 42 };
        assert_eq!(err.to_string(), "price update rejected for record 42");
    }
}

//! Error types for loading, preparing and querying the plant table.

use std::path::PathBuf;

use super::model::{Year, YearRange};

/// Result type for data operations
pub type DataResult<T> = Result<T, DataError>;

/// Error type for data operations
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Failed to load dataset {}: {source}", path.display())]
    DataLoad {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("Row {row}, column '{column}': '{value}' is not a number")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Year {year} is outside the dataset range {range}")]
    InvalidYear { year: Year, range: YearRange },

    #[error("Station not found: {0}")]
    StationNotFound(String),
}

impl DataError {
    /// Whether the error is fatal at startup (no table can be served).
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            DataError::DataLoad { .. }
                | DataError::MissingColumn(_)
                | DataError::InvalidCell { .. }
                | DataError::Schema(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_errors_are_not_fatal() {
        assert!(DataError::Schema("x".into()).is_load_error());
        assert!(DataError::MissingColumn("City".into()).is_load_error());
        assert!(!DataError::StationNotFound("A".into()).is_load_error());
        assert!(!DataError::InvalidYear {
            year: 2030,
            range: YearRange::default(),
        }
        .is_load_error());
    }
}

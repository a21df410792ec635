use thiserror::Error;

/// `origin` names the sheet or file the failure came from; `row` is the
/// 1-based line in that sheet or file.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("{origin} is unavailable: {reason}")]
    Unavailable { origin: String, reason: String },
    #[error("{origin}: CSV error: {error}")]
    Csv {
        origin: String,
        #[source]
        error: csv::Error,
    },
    #[error("{origin}: missing column '{column}'")]
    MissingColumn { origin: String, column: String },
    #[error("{origin}: row {row}: invalid date {value:?}")]
    InvalidDate { origin: String, row: usize, value: String },
    #[error("{origin}: row {row}: invalid amount {value:?}")]
    InvalidAmount { origin: String, row: usize, value: String },
    #[error("{origin}: header row {header_row} is past the end of the sheet ({rows} rows)")]
    HeaderOutOfRange {
        origin: String,
        header_row: usize,
        rows: usize,
    },
}

impl SourceError {
    pub(crate) fn unavailable(origin: &str, reason: impl ToString) -> Self {
        SourceError::Unavailable {
            origin: origin.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn csv(origin: &str, error: csv::Error) -> Self {
        SourceError::Csv {
            origin: origin.to_string(),
            error,
        }
    }
}

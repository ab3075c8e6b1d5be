use epidash_common::EpidashError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Unknown variable key: {0}")]
    UnknownVariable(String),

    #[error("Invalid raw data format: expected an array of rows, got {0}")]
    NotASequence(&'static str),

    #[error("Invalid raw data format: row {index} is not an object")]
    RowNotAnObject { index: usize },

    #[error("Unknown chart type: {0}")]
    UnknownChartType(String),
}

impl From<AnalyticsError> for EpidashError {
    fn from(e: AnalyticsError) -> Self {
        match e {
            AnalyticsError::UnknownChartType(_) => EpidashError::InvalidInput(e.to_string()),
            _ => EpidashError::Precondition(e.to_string()),
        }
    }
}

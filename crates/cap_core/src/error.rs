use thiserror::Error;

/// Reasons a dataset file could not be turned into records.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to parse dataset JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("dataset must be a JSON array of records, found {found}")]
    NotAnArray { found: &'static str },
}

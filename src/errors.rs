use std::io;

use thiserror::Error;

use crate::types::{FieldName, TableName};

/// Error type for configuration, remote fetch, and setup failures.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("fetching table '{table}' failed: {reason}")]
    TableFetch { table: TableName, reason: String },
    #[error("field '{field}' in table '{table}' has an unsupported shape: {details}")]
    FieldShape {
        table: TableName,
        field: FieldName,
        details: String,
    },
    #[error("setup prompt failed: {0}")]
    Setup(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

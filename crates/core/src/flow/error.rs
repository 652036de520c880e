//! Flow parsing errors.

use thiserror::Error;

/// Errors that can occur while parsing a flow table.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The CSV could not be read at all.
    #[error("failed to read csv: {0}")]
    Csv(#[from] csv::Error),

    /// The file parsed but yielded no usable rows.
    #[error("no parsable flow rows")]
    NoRows,
}

use tax_core::{BracketTableError, LawVersion, WageTableError};
use thiserror::Error;

/// Errors that can occur when loading table data.
#[derive(Debug, Error)]
pub enum TableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("unknown law '{law}' on row {row}")]
    UnknownLaw { law: String, row: usize },

    #[error("no brackets for the {0} law")]
    MissingSchedule(LawVersion),

    #[error("invalid bracket schedule for the {law} law: {source}")]
    InvalidSchedule {
        law: LawVersion,
        #[source]
        source: BracketTableError,
    },

    #[error("invalid wage table: {0}")]
    InvalidWageTable(#[from] WageTableError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for TableLoaderError {
    fn from(err: csv::Error) -> Self {
        TableLoaderError::CsvParse(err.to_string())
    }
}

//! Error types for Mirrorseed

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("csv error: {0}")]
    CsvError(String),

    #[error("ledger error: {path} - {message}")]
    LedgerError { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn csv(message: impl Into<String>) -> Self {
        Self::CsvError(message.into())
    }

    pub fn ledger(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LedgerError {
            path: path.into(),
            message: message.into(),
        }
    }
}

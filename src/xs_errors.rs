use thiserror::Error;

use crate::{
    catalog::diagnostics::NotFoundError,
    endf::FormatError,
    query::{OutOfRangeError, QueryDefect},
};

#[derive(Error, Debug)]
pub enum XsError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Catalog build rejected: {} record(s) failed to decode{}", .0.len(), first_failure(.0))]
    CatalogRejected(Vec<FormatError>),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    OutOfRange(#[from] OutOfRangeError),

    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] QueryDefect),

    #[error("Invalid ingestion source: {0}")]
    InvalidSource(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("UTF-8 Path error: {0}")]
    Utf8PathError(String),

    #[error("Reaction dictionary error: {0}")]
    DictionaryError(#[from] csv::Error),

    #[error("Invalid reaction dictionary entry: {0}")]
    InvalidDictionaryEntry(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unable to read JSON configuration: {0}")]
    ConfigJsonError(#[from] serde_json::Error),

    #[error("Query service is closed")]
    ServiceClosed,

    #[error("Internal error: {0}")]
    Internal(String),

    #[cfg(feature = "endf-download")]
    #[error("HTTP reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[cfg(feature = "endf-download")]
    #[error("Base dir creation error for the download cache: {0}")]
    UnableToCreateBaseDir(String),
}

fn first_failure(failures: &[FormatError]) -> String {
    failures
        .first()
        .map(|f| format!("; first: {f}"))
        .unwrap_or_default()
}

impl PartialEq for XsError {
    fn eq(&self, other: &Self) -> bool {
        use XsError::*;
        match (self, other) {
            (Format(a), Format(b)) => a == b,
            (CatalogRejected(a), CatalogRejected(b)) => a == b,
            (NotFound(a), NotFound(b)) => a == b,
            (OutOfRange(a), OutOfRange(b)) => a == b,
            (InvalidQuery(a), InvalidQuery(b)) => a == b,
            (InvalidSource(a), InvalidSource(b)) => a == b,
            (Utf8PathError(a), Utf8PathError(b)) => a == b,
            (InvalidDictionaryEntry(a), InvalidDictionaryEntry(b)) => a == b,
            (InvalidConfig(a), InvalidConfig(b)) => a == b,
            (Internal(a), Internal(b)) => a == b,

            // not comparable, equal when the variant matches
            (IoError(_), IoError(_)) => true,
            (DictionaryError(_), DictionaryError(_)) => true,
            (ConfigJsonError(_), ConfigJsonError(_)) => true,
            #[cfg(feature = "endf-download")]
            (ReqwestError(_), ReqwestError(_)) => true,
            #[cfg(feature = "endf-download")]
            (UnableToCreateBaseDir(a), UnableToCreateBaseDir(b)) => a == b,

            (ServiceClosed, ServiceClosed) => true,

            _ => false,
        }
    }
}

//! Error types for folio operations.

use thiserror::Error;

use crate::dom::QueryEngine;

/// Errors that can occur while reading a TEI document.
#[derive(Error, Debug)]
pub enum Error {
    /// The text cannot yield a usable root element.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// The configured tree-query engine was not compiled into this build.
    #[error("Query engine unavailable: {0}")]
    EngineUnavailable(QueryEngine),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedDocument(reason.into())
    }

    /// True when the input itself was rejected (as opposed to a setup problem).
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedDocument(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

//! Error types for pdfhighlight.

use std::io;
use thiserror::Error;

/// Result type alias for pdfhighlight operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while highlighting a PDF.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF document is encrypted and cannot be read.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error parsing PDF structure or a content stream.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF structure is corrupted or malformed.
    #[error("Corrupted PDF structure: {0}")]
    Corrupted(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// The search term is not a valid regular expression.
    #[error("Invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A color string could not be parsed.
    #[error("Only six-digit hex colors are allowed prefixed with #. (got {0:?})")]
    InvalidColor(String),

    /// Error while serializing the output document.
    #[error("PDF write error: {0}")]
    Write(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

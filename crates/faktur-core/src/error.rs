//! Error types for the faktur-core library.
//!
//! Field extraction itself has no error path: a rule that finds nothing yields
//! an empty field. These errors cover the collaborators around the engine.

use thiserror::Error;

/// Error type for loading and saving [`FakturConfig`](crate::models::config::FakturConfig).
#[derive(Error, Debug)]
pub enum FakturError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a valid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to reading the PDF text layer.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors raised while writing tabular or filing output.
#[derive(Error, Debug)]
pub enum ExportError {
    /// CSV/TSV writer failure.
    #[error("failed to write table: {0}")]
    Csv(#[from] csv::Error),

    /// XML writer failure.
    #[error("failed to write XML: {0}")]
    Xml(String),

    /// Output bytes were not valid UTF-8.
    #[error("output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// XLSX workbook writer failure.
    #[error("failed to write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// JSON serialization failure.
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while flushing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to the header/detail spreadsheet input.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// The workbook could not be opened.
    #[error("failed to open workbook: {0}")]
    Workbook(String),

    /// A required sheet is not present.
    #[error("missing sheet: {0}")]
    MissingSheet(String),

    /// No header row (a row containing a `Baris` cell) was found.
    #[error("no header row found in {0}")]
    NoHeader(String),

    /// The CSV input could not be read.
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for the faktur library.
pub type Result<T> = std::result::Result<T, FakturError>;

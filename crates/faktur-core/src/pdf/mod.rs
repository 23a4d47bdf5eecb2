//! PDF text-layer reading.

#[cfg(feature = "pdf")]
mod extractor;

#[cfg(feature = "pdf")]
pub use extractor::LopdfTextReader;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Reads the embedded text layer of a PDF.
///
/// The extraction engine only ever sees the returned text, so any reader that
/// produces plain text with line breaks can stand in for the built-in one.
pub trait PdfTextReader: Send + Sync {
    /// Extract the full text of the document.
    fn read_text(&self, data: &[u8]) -> Result<String>;
}

//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, warn};

use super::{PdfTextReader, Result};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Text-layer reader backed by lopdf (parsing, decryption) and pdf-extract
/// (text).
#[derive(Debug, Clone)]
pub struct LopdfTextReader {
    min_text_length: usize,
}

impl LopdfTextReader {
    pub fn new() -> Self {
        Self::from_config(&PdfConfig::default())
    }

    pub fn from_config(config: &PdfConfig) -> Self {
        Self {
            min_text_length: config.min_text_length,
        }
    }

    /// Load the document and return bytes pdf-extract can read.
    ///
    /// Documents encrypted with an empty user password are decrypted and
    /// re-serialized first.
    fn prepare(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }
        debug!("Loaded PDF with {} pages", page_count);

        if !doc.is_encrypted() {
            return Ok(data.to_vec());
        }

        if doc.decrypt("").is_err() {
            return Err(PdfError::Encrypted);
        }
        debug!("Decrypted PDF with empty password");

        let mut decrypted = Vec::new();
        doc.save_to(&mut decrypted)
            .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
        Ok(decrypted)
    }
}

impl Default for LopdfTextReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfTextReader for LopdfTextReader {
    fn read_text(&self, data: &[u8]) -> Result<String> {
        let bytes = self.prepare(data)?;
        let text = pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        let length = text.trim().chars().count();
        if length < self.min_text_length {
            warn!(
                "PDF text layer has only {} characters; the document may be a scan",
                length
            );
        }

        Ok(text)
    }
}

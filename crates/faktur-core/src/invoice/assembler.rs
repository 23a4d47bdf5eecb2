//! Combines the field rule chains into one canonical record.

use std::time::Instant;

use tracing::debug;

use super::registry::ExtractorRegistry;
use crate::models::config::ExtractionConfig;
use crate::models::record::{CanonicalRecord, LineItem};

/// Result of extracting one document.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Assembled record.
    pub record: CanonicalRecord,
    /// One message per field that could not be extracted.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Runs every field chain once against a document's text.
#[derive(Default)]
pub struct RecordAssembler {
    registry: ExtractorRegistry,
}

impl RecordAssembler {
    /// Assembler with the default rule order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembler with rule order taken from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            registry: ExtractorRegistry::from_config(config),
        }
    }

    /// Build the record for one document. Never fails: anything the rules
    /// cannot find is left empty.
    pub fn assemble(&self, filename: &str, text: &str) -> CanonicalRecord {
        let r = &self.registry;

        let mut line_items = r.line_items.extract(text).unwrap_or_default();
        if line_items.is_empty() {
            line_items.push(LineItem::placeholder());
        }

        CanonicalRecord {
            source_filename: filename.to_string(),
            transaction_date: r.transaction_date.extract(text),
            document: r.document_code.extract(text).unwrap_or_default(),
            reference: r.reference.extract(text),
            buyer: r.buyer.extract(text).unwrap_or_default(),
            seller: r.seller.extract(text).unwrap_or_default(),
            line_items,
            totals: r.totals.extract(text).unwrap_or_default(),
        }
    }

    /// Like [`RecordAssembler::assemble`], also reporting missing fields and
    /// timing.
    pub fn extract(&self, filename: &str, text: &str) -> ExtractionResult {
        let start = Instant::now();

        let record = self.assemble(filename, text);
        let warnings: Vec<String> = record
            .missing_fields()
            .into_iter()
            .map(|field| format!("Could not extract {}", field))
            .collect();

        let processing_time_ms = start.elapsed().as_millis() as u64;

        debug!(
            "Extracted {} ({} line items, {} missing fields) in {}ms",
            filename,
            record.line_items.len(),
            warnings.len(),
            processing_time_ms
        );
        for warning in &warnings {
            debug!("{}: {}", filename, warning);
        }

        ExtractionResult {
            record,
            warnings,
            processing_time_ms,
        }
    }
}

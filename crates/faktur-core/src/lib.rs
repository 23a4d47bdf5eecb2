//! Core library for Faktur Pajak (Indonesian tax invoice) extraction.
//!
//! This crate provides:
//! - Line segmentation and locale-aware number/date normalization
//! - Named field-extraction rules for the Coretax layout, grouped into
//!   configurable per-field rule chains
//! - Record assembly and batch processing
//! - Tabular (CSV/TSV/XLSX/JSON) and Coretax XML output
//! - Conversion of header/detail spreadsheets into the XML filing
//! - PDF text-layer reading (feature `pdf`)

pub mod batch;
pub mod error;
pub mod export;
pub mod invoice;
pub mod models;
pub mod pdf;
pub mod text;

pub use batch::{BatchResult, BatchRunner, DocumentFailure, EventStatus, ProcessingEvent, SourceDocument};
pub use error::{FakturError, Result};
pub use export::{Conversion, ExportRow, FilingDocument, TableFormat};
pub use invoice::{ExtractionResult, ExtractorRegistry, FieldExtractor, RecordAssembler, RuleChain};
pub use models::config::{FakturConfig, TaxRules};
pub use models::record::{CanonicalRecord, DocumentCode, DocumentType, LineItem, Party};
pub use pdf::PdfTextReader;
#[cfg(feature = "pdf")]
pub use pdf::LopdfTextReader;

//! Batch extraction over many documents.
//!
//! A batch always yields one record per input document, in input order. A
//! document whose text cannot be read still contributes an empty record and
//! is listed in [`BatchResult::failures`].

use std::sync::Arc;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::invoice::RecordAssembler;
use crate::models::record::CanonicalRecord;
use crate::pdf::PdfTextReader;

/// Content of one input document.
#[derive(Debug, Clone)]
pub enum DocumentContent {
    /// Text that has already been extracted.
    Text(String),
    /// Raw PDF bytes, read through the batch's [`PdfTextReader`].
    Pdf(Vec<u8>),
    /// The document could not be loaded at all.
    Unreadable(String),
}

/// One document of a batch.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub filename: String,
    pub content: DocumentContent,
}

impl SourceDocument {
    pub fn text(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: DocumentContent::Text(text.into()),
        }
    }

    pub fn pdf(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content: DocumentContent::Pdf(data),
        }
    }

    pub fn unreadable(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: DocumentContent::Unreadable(reason.into()),
        }
    }
}

/// A document whose text could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    pub filename: String,
    pub reason: String,
}

/// Lifecycle status of a logged batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Processed,
    Downloaded,
}

/// Files covered by a processing event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub files: Vec<String>,
}

/// Entry for the append-only processing log, emitted once per batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingEvent {
    pub processed_count: usize,
    pub status: EventStatus,
    pub details: EventDetails,
}

impl ProcessingEvent {
    pub fn processed(files: Vec<String>) -> Self {
        Self {
            processed_count: files.len(),
            status: EventStatus::Processed,
            details: EventDetails { files },
        }
    }
}

/// Outcome of a batch run.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// One record per input document, in input order.
    pub records: Vec<CanonicalRecord>,
    /// Documents whose text could not be read.
    pub failures: Vec<DocumentFailure>,
    /// Event describing the batch for the processing log.
    pub event: ProcessingEvent,
}

impl BatchResult {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs the record assembler over a batch of documents.
pub struct BatchRunner {
    assembler: Arc<RecordAssembler>,
    reader: Option<Arc<dyn PdfTextReader>>,
}

impl BatchRunner {
    pub fn new(assembler: RecordAssembler) -> Self {
        Self {
            assembler: Arc::new(assembler),
            reader: None,
        }
    }

    /// Use `reader` for [`DocumentContent::Pdf`] inputs.
    pub fn with_pdf_reader(mut self, reader: impl PdfTextReader + 'static) -> Self {
        self.reader = Some(Arc::new(reader));
        self
    }

    /// Process documents one after another.
    pub fn run(&self, documents: &[SourceDocument]) -> BatchResult {
        self.run_with_progress(documents, |_| {})
    }

    /// Process documents one after another, calling `progress` after each.
    pub fn run_with_progress<F>(&self, documents: &[SourceDocument], mut progress: F) -> BatchResult
    where
        F: FnMut(&str),
    {
        info!("Processing {} documents", documents.len());

        let outcomes: Vec<Outcome> = documents
            .iter()
            .map(|doc| {
                let outcome = self.process(doc);
                progress(&doc.filename);
                outcome
            })
            .collect();

        Self::collect(documents, outcomes)
    }

    /// Process documents on a pool of `jobs` threads. Records come back in
    /// input order.
    pub fn run_parallel(&self, documents: &[SourceDocument], jobs: usize) -> BatchResult {
        if jobs <= 1 || documents.len() <= 1 {
            return self.run(documents);
        }

        let pool = match ThreadPoolBuilder::new().num_threads(jobs).build() {
            Ok(pool) => pool,
            Err(e) => {
                warn!("Could not start {} workers ({}); processing sequentially", jobs, e);
                return self.run(documents);
            }
        };

        info!("Processing {} documents on {} threads", documents.len(), jobs);

        let outcomes: Vec<Outcome> =
            pool.install(|| documents.par_iter().map(|doc| self.process(doc)).collect());

        Self::collect(documents, outcomes)
    }

    fn process(&self, doc: &SourceDocument) -> Outcome {
        match self.read_text(doc) {
            Ok(text) => {
                let result = self.assembler.extract(&doc.filename, &text);
                Outcome {
                    record: result.record,
                    failure: None,
                }
            }
            Err(reason) => {
                warn!("Could not read {}: {}", doc.filename, reason);
                Outcome::failed(doc, reason)
            }
        }
    }

    fn read_text(&self, doc: &SourceDocument) -> std::result::Result<String, String> {
        match &doc.content {
            DocumentContent::Text(text) => Ok(text.clone()),
            DocumentContent::Pdf(data) => match &self.reader {
                Some(reader) => reader.read_text(data).map_err(|e| e.to_string()),
                None => Err("no PDF reader configured".to_string()),
            },
            DocumentContent::Unreadable(reason) => Err(reason.clone()),
        }
    }

    fn collect(documents: &[SourceDocument], outcomes: Vec<Outcome>) -> BatchResult {
        let mut records = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();

        for outcome in outcomes {
            records.push(outcome.record);
            failures.extend(outcome.failure);
        }

        let files = documents.iter().map(|d| d.filename.clone()).collect();
        debug!("Batch finished: {} records, {} failures", records.len(), failures.len());

        BatchResult {
            records,
            failures,
            event: ProcessingEvent::processed(files),
        }
    }
}

struct Outcome {
    record: CanonicalRecord,
    failure: Option<DocumentFailure>,
}

impl Outcome {
    fn failed(doc: &SourceDocument, reason: String) -> Self {
        Self {
            record: CanonicalRecord::empty(doc.filename.clone()),
            failure: Some(DocumentFailure {
                filename: doc.filename.clone(),
                reason,
            }),
        }
    }
}

//! Invoice field extraction module.

mod assembler;
pub mod registry;
pub mod rules;

pub use assembler::{ExtractionResult, RecordAssembler};
pub use registry::{ExtractorRegistry, RuleChain};
pub use rules::FieldExtractor;

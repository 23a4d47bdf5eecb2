//! Rule-based field extractors for the Coretax Faktur Pajak layout.

pub mod amounts;
pub mod dates;
pub mod document;
pub mod ids;
pub mod line_items;
pub mod party;
pub mod patterns;
pub mod reference;
pub mod totals;

pub use amounts::normalize_amount;
pub use dates::{format_date, normalize_named_month_date, NamedMonthDateRule, NumericDateRule};
pub use document::SerialCodeRule;
pub use ids::{digits_only, pad_numeric_id};
pub use line_items::GoodsTableRule;
pub use party::{parse_party_block, BuyerBlockRule, SellerBlockRule};
pub use reference::ReferenceRule;
pub use totals::TotalsRule;

/// A named extraction rule for one field.
///
/// Rules never fail: a document the rule does not understand yields `None`.
pub trait FieldExtractor: Send + Sync {
    /// The type of value this extractor produces.
    type Output;

    /// Stable name used to order and select rules in configuration.
    fn name(&self) -> &'static str;

    /// Extract the field from the full document text.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}

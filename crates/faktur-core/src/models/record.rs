//! Canonical record extracted from one Faktur Pajak document.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::invoice::rules::amounts::normalize_amount;

/// One extracted tax invoice.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CanonicalRecord {
    /// Name of the file the text came from.
    pub source_filename: String,

    /// Transaction date printed next to the signature place.
    pub transaction_date: Option<NaiveDate>,

    /// Serial code; carries the derived document type.
    pub document: DocumentCode,

    /// Free-text reference ("Referensi").
    pub reference: Option<String>,

    /// Buyer identity block.
    pub buyer: Party,

    /// Seller identity block ("Pengusaha Kena Pajak").
    pub seller: Party,

    /// Goods/services entries. Never empty once assembled.
    pub line_items: Vec<LineItem>,

    /// Labeled summary amounts below the goods table.
    pub totals: DocumentTotals,
}

impl CanonicalRecord {
    /// A record with every field empty and the single placeholder line item.
    pub fn empty(source_filename: impl Into<String>) -> Self {
        Self {
            source_filename: source_filename.into(),
            line_items: vec![LineItem::placeholder()],
            ..Self::default()
        }
    }

    /// Names of the fields that could not be extracted.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if self.transaction_date.is_none() {
            missing.push("transaction_date");
        }
        if self.document.is_empty() {
            missing.push("document_code");
        }
        if self.reference.is_none() {
            missing.push("reference");
        }
        if self.buyer.tax_id.is_empty() {
            missing.push("buyer_npwp");
        }
        if self.buyer.name.is_empty() {
            missing.push("buyer_name");
        }
        if self.line_items.iter().all(LineItem::is_placeholder) {
            missing.push("line_items");
        }

        missing
    }
}

/// Serial code of the invoice ("Kode dan Nomor Seri Faktur Pajak").
///
/// The document type is always derived from the code and never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentCode(String);

impl DocumentCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Normal` when the code starts with `040`, `Correction` otherwise.
    /// An empty code has no type.
    pub fn document_type(&self) -> Option<DocumentType> {
        if self.0.is_empty() {
            None
        } else if self.0.starts_with("040") {
            Some(DocumentType::Normal)
        } else {
            Some(DocumentType::Correction)
        }
    }

    /// Transaction code: the first two characters of the serial code.
    pub fn transaction_code(&self) -> &str {
        match self.0.char_indices().nth(2) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl Serialize for DocumentCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DocumentCode", 2)?;
        state.serialize_field("code", &self.0)?;
        state.serialize_field("type", &self.document_type())?;
        state.end()
    }
}

/// Type of tax invoice document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    /// Regular invoice (status digit 0).
    Normal,
    /// Replacement/correction invoice ("Pembetulan").
    Correction,
}

impl DocumentType {
    /// Label used in exports.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Normal => "Normal",
            DocumentType::Correction => "Pembetulan",
        }
    }
}

impl Serialize for DocumentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// A party block (seller or buyer).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Party {
    /// Tax identification number (NPWP), digits only.
    pub tax_id: String,

    /// Registered name.
    pub name: String,

    /// Address joined into a single line.
    pub address: String,

    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Location identifier (ID TKU) printed after `#`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

impl Party {
    pub fn is_empty(&self) -> bool {
        self.tax_id.is_empty()
            && self.name.is_empty()
            && self.address.is_empty()
            && self.email.is_none()
            && self.location_id.is_none()
    }
}

/// A single goods/services entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineItem {
    /// Name of the goods or service.
    pub description: String,

    /// Amount exactly as printed.
    pub tax_base_raw: String,

    /// Normalized amount; `None` when the raw text does not parse.
    pub tax_base_value: Option<Decimal>,
}

impl LineItem {
    /// Build an item, normalizing the raw amount.
    pub fn new(description: impl Into<String>, tax_base_raw: impl Into<String>) -> Self {
        let tax_base_raw = tax_base_raw.into();
        let tax_base_value = normalize_amount(&tax_base_raw);

        Self {
            description: description.into(),
            tax_base_raw,
            tax_base_value,
        }
    }

    /// The blank item standing in for a document without detected items.
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn is_placeholder(&self) -> bool {
        self.description.is_empty() && self.tax_base_raw.is_empty() && self.tax_base_value.is_none()
    }
}

/// An amount with the text it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonetaryAmount {
    pub raw: String,
    pub value: Option<Decimal>,
}

impl MonetaryAmount {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let value = normalize_amount(&raw);
        Self { raw, value }
    }
}

/// Summary amounts printed under the goods table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentTotals {
    /// Harga Jual / Penggantian / Uang Muka / Termin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selling_price: Option<MonetaryAmount>,

    /// Dikurangi Potongan Harga.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<MonetaryAmount>,

    /// Dikurangi Uang Muka yang telah diterima.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<MonetaryAmount>,

    /// Dasar Pengenaan Pajak.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_base: Option<MonetaryAmount>,

    /// Jumlah PPN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat: Option<MonetaryAmount>,

    /// Jumlah PPnBM.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub luxury_tax: Option<MonetaryAmount>,
}

impl DocumentTotals {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_document_type_derivation() {
        assert_eq!(
            DocumentCode::new("0400250031234567").document_type(),
            Some(DocumentType::Normal)
        );
        assert_eq!(
            DocumentCode::new("0410250031234567").document_type(),
            Some(DocumentType::Correction)
        );
        assert_eq!(DocumentCode::new("04").document_type(), Some(DocumentType::Correction));
        assert_eq!(DocumentCode::default().document_type(), None);
    }

    #[test]
    fn test_document_type_for_generated_codes() {
        for prefix in 0..1000u32 {
            let code = DocumentCode::new(format!("{:03}0250031234567", prefix));
            let expected = if prefix == 40 {
                DocumentType::Normal
            } else {
                DocumentType::Correction
            };
            assert_eq!(code.document_type(), Some(expected), "prefix {:03}", prefix);
        }
    }

    #[test]
    fn test_transaction_code() {
        assert_eq!(DocumentCode::new("0400250031234567").transaction_code(), "04");
        assert_eq!(DocumentCode::new("0").transaction_code(), "0");
        assert_eq!(DocumentCode::default().transaction_code(), "");
    }

    #[test]
    fn test_line_item_keeps_unparsed_amount_distinct_from_zero() {
        let zero = LineItem::new("Jasa", "0");
        assert_eq!(zero.tax_base_value, Some(Decimal::ZERO));

        let broken = LineItem::new("Jasa", "n/a");
        assert_eq!(broken.tax_base_raw, "n/a");
        assert_eq!(broken.tax_base_value, None);
    }

    #[test]
    fn test_empty_record() {
        let record = CanonicalRecord::empty("a.pdf");
        assert_eq!(record.line_items, vec![LineItem::placeholder()]);
        assert!(record.buyer.is_empty());
        assert!(record.totals.is_empty());
        assert!(record.missing_fields().contains(&"line_items"));
    }

    #[test]
    fn test_document_code_serializes_with_type() {
        let json = serde_json::to_value(DocumentCode::new("0400001")).unwrap();
        assert_eq!(json, serde_json::json!({"code": "0400001", "type": "Normal"}));
    }

    #[test]
    fn test_monetary_amount_parse() {
        let amount = MonetaryAmount::parse("916.666,67");
        assert_eq!(amount.value, Some(Decimal::from_str("916666.67").unwrap()));
    }
}

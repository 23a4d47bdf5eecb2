//! Serial code ("Kode dan Nomor Seri Faktur Pajak") extraction.

use super::FieldExtractor;
use super::patterns::SERIAL_CODE;
use crate::models::record::DocumentCode;

/// Labeled serial code; the document type follows from its first three
/// characters.
pub struct SerialCodeRule;

impl FieldExtractor for SerialCodeRule {
    type Output = DocumentCode;

    fn name(&self) -> &'static str {
        "labeled_serial"
    }

    fn extract(&self, text: &str) -> Option<DocumentCode> {
        let caps = SERIAL_CODE.captures(text)?;
        let code = caps[1].trim();
        (!code.is_empty()).then(|| DocumentCode::new(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::DocumentType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_normal_code() {
        let code = SerialCodeRule
            .extract("Faktur Pajak\nKode dan Nomor Seri Faktur Pajak: 0400250031234567\n")
            .unwrap();
        assert_eq!(code.as_str(), "0400250031234567");
        assert_eq!(code.document_type(), Some(DocumentType::Normal));
    }

    #[test]
    fn test_extract_correction_code_with_spacing() {
        let code = SerialCodeRule
            .extract("Kode dan Nomor Seri Faktur Pajak :\n  0410250031234567")
            .unwrap();
        assert_eq!(code.as_str(), "0410250031234567");
        assert_eq!(code.document_type(), Some(DocumentType::Correction));
    }

    #[test]
    fn test_missing_label() {
        assert_eq!(SerialCodeRule.extract("Nomor Seri: 0400250031234567"), None);
        assert_eq!(SerialCodeRule.extract(""), None);
    }
}

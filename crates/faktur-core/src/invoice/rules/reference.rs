//! Reference ("Referensi") extraction.

use super::FieldExtractor;
use super::patterns::REFERENCE;

/// Rest of the line after `Referensi:`, with one closing parenthesis removed
/// (the layout prints the label inside parentheses).
pub struct ReferenceRule;

impl FieldExtractor for ReferenceRule {
    type Output = String;

    fn name(&self) -> &'static str {
        "labeled_reference"
    }

    fn extract(&self, text: &str) -> Option<String> {
        let caps = REFERENCE.captures(text)?;
        let line = caps[1].trim();
        let line = line.strip_suffix(')').unwrap_or(line).trim_end();
        (!line.is_empty()).then(|| line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reference_in_parentheses() {
        let text = "(Referensi: INV/2025/09/001)\nNext line";
        assert_eq!(ReferenceRule.extract(text).as_deref(), Some("INV/2025/09/001"));
    }

    #[test]
    fn test_only_one_parenthesis_is_stripped() {
        let text = "Referensi: PO (lama))";
        assert_eq!(ReferenceRule.extract(text).as_deref(), Some("PO (lama)"));
    }

    #[test]
    fn test_reference_stops_at_line_break() {
        let text = "Referensi :  SO-123  \nPembeli";
        assert_eq!(ReferenceRule.extract(text).as_deref(), Some("SO-123"));
    }

    #[test]
    fn test_missing_reference() {
        assert_eq!(ReferenceRule.extract("no label here"), None);
    }
}

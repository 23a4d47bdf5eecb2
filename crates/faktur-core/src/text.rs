//! Line segmentation of extracted page text.

/// Cleaned, ordered, non-empty lines of a document with a lowercase view for
/// case-insensitive label search.
#[derive(Debug, Clone, Default)]
pub struct Lines {
    lines: Vec<String>,
    lower: Vec<String>,
}

impl Lines {
    /// Split text on line breaks, trim each line and drop the empty ones.
    pub fn new(text: &str) -> Self {
        let lines: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        let lower = lines.iter().map(|l| l.to_lowercase()).collect();

        Self { lines, lower }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Lowercase form of the line at `index`.
    pub fn lower(&self, index: usize) -> Option<&str> {
        self.lower.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Index of the first line whose lowercase form contains any of `phrases`.
    pub fn find_first_containing(&self, phrases: &[&str]) -> Option<usize> {
        self.find_first_containing_from(0, phrases)
    }

    /// Like [`Lines::find_first_containing`], scanning from `start` onwards.
    pub fn find_first_containing_from(&self, start: usize, phrases: &[&str]) -> Option<usize> {
        let phrases: Vec<String> = phrases.iter().map(|p| p.to_lowercase()).collect();

        self.lower
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, line)| phrases.iter().any(|p| line.contains(p.as_str())))
            .map(|(i, _)| i)
    }

    /// Lines in the half-open range `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> &[String] {
        let end = end.min(self.lines.len());
        let start = start.min(end);
        &self.lines[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lines_trim_and_drop_empty() {
        let lines = Lines::new("  first  \n\n\t\nsecond\r\n   third");
        assert_eq!(lines.iter().collect::<Vec<_>>(), vec!["first", "second", "third"]);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_find_first_containing_is_case_insensitive() {
        let lines = Lines::new("Header\nNama Barang Kena Pajak\nnama barang again");
        assert_eq!(lines.find_first_containing(&["NAMA BARANG"]), Some(1));
        assert_eq!(lines.find_first_containing_from(2, &["nama barang"]), Some(2));
        assert_eq!(lines.find_first_containing(&["missing", "also missing"]), None);
    }

    #[test]
    fn test_empty_text() {
        let lines = Lines::new("");
        assert!(lines.is_empty());
        assert_eq!(lines.find_first_containing(&["x"]), None);
        assert!(lines.slice(0, 10).is_empty());
    }
}

//! Numeric identifier helpers (NPWP, ID TKU).

/// Keep only ASCII digits.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Strip non-digits and left-pad with zeros to `target_len`.
///
/// Longer identifiers are returned unchanged, never truncated.
pub fn pad_numeric_id(raw: &str, target_len: usize) -> String {
    let digits = digits_only(raw);
    format!("{:0>width$}", digits, width = target_len)
}

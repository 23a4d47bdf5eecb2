//! Date extraction for Indonesian invoices.

use chrono::NaiveDate;

use super::FieldExtractor;
use super::patterns::{DATE_DMY, DATE_NAMED_MONTH};

/// Indonesian month names in calendar order.
pub const MONTHS_ID: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni",
    "Juli", "Agustus", "September", "Oktober", "November", "Desember",
];

/// Build a date from a day, an Indonesian month name and a year.
///
/// The month name is compared in capitalized form ("SEPTEMBER" and
/// "september" both become "September"). Unknown names and impossible dates
/// give `None`.
pub fn normalize_named_month_date(day: u32, month_name: &str, year: i32) -> Option<NaiveDate> {
    let month = month_number(month_name)?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Render a date as zero-padded `DD/MM/YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn month_number(name: &str) -> Option<u32> {
    let capitalized = capitalize(name);
    MONTHS_ID
        .iter()
        .position(|m| *m == capitalized)
        .map(|i| i as u32 + 1)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Transaction date written as "<place>, 30 September 2025".
///
/// Only the first day/word/year triple is considered; if its word is not a
/// month the field stays empty.
pub struct NamedMonthDateRule;

impl FieldExtractor for NamedMonthDateRule {
    type Output = NaiveDate;

    fn name(&self) -> &'static str {
        "named_month_date"
    }

    fn extract(&self, text: &str) -> Option<NaiveDate> {
        let caps = DATE_NAMED_MONTH.captures(text)?;
        let day: u32 = caps[1].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        normalize_named_month_date(day, &caps[2], year)
    }
}

/// Numeric `DD/MM/YYYY` (also `-` or `.` separated) date.
pub struct NumericDateRule;

impl FieldExtractor for NumericDateRule {
    type Output = NaiveDate;

    fn name(&self) -> &'static str {
        "numeric_date"
    }

    fn extract(&self, text: &str) -> Option<NaiveDate> {
        let caps = DATE_DMY.captures(text)?;
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

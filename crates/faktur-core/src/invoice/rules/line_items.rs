//! Goods/services table extraction.

use tracing::trace;

use super::FieldExtractor;
use super::patterns::{CURRENCY_AMOUNT, ITEM_PREFIX, ITEM_START, TABLE_SUMMARY_LINE};
use crate::models::record::LineItem;
use crate::text::Lines;

const TABLE_ANCHOR: &[&str] = &["nama barang kena pajak"];

const TABLE_END: &[&str] = &["dikurangi potongan harga", "dasar pengenaan pajak", "jumlah ppn"];

/// Numbered rows of the goods table.
///
/// The region starts after the table header and ends before the first
/// summary line. Each row starts with its ordinal; the first line of a row,
/// up to any `Rp` amount on it, is the description and the first `Rp` amount
/// anywhere in the row is its tax base.
pub struct GoodsTableRule;

impl GoodsTableRule {
    fn region_end(lines: &Lines, start: usize) -> usize {
        let by_phrase = lines
            .find_first_containing_from(start, TABLE_END)
            .unwrap_or(lines.len());
        let by_summary = (start..lines.len())
            .find(|&i| lines.lower(i).is_some_and(|l| TABLE_SUMMARY_LINE.is_match(l)))
            .unwrap_or(lines.len());

        by_phrase.min(by_summary)
    }

    fn chunks(region: &[String]) -> Vec<&[String]> {
        let starts: Vec<usize> = region
            .iter()
            .enumerate()
            .filter(|(_, line)| ITEM_START.is_match(line))
            .map(|(i, _)| i)
            .collect();

        starts
            .iter()
            .enumerate()
            .map(|(n, &start)| {
                let end = starts.get(n + 1).copied().unwrap_or(region.len());
                &region[start..end]
            })
            .collect()
    }

    fn parse_chunk(chunk: &[String]) -> Option<LineItem> {
        let first = chunk.first()?;
        let rest = ITEM_PREFIX.replace(first, "");
        // A one-line row carries its amount after the name.
        let description = match CURRENCY_AMOUNT.find(&rest) {
            Some(m) => &rest[..m.start()],
            None => &rest[..],
        }
        .trim()
        .to_string();

        let tax_base_raw = chunk
            .iter()
            .find_map(|line| CURRENCY_AMOUNT.captures(line).map(|c| c[1].to_string()))
            .unwrap_or_default();

        Some(LineItem::new(description, tax_base_raw))
    }
}

impl FieldExtractor for GoodsTableRule {
    type Output = Vec<LineItem>;

    fn name(&self) -> &'static str {
        "numbered_goods_table"
    }

    fn extract(&self, text: &str) -> Option<Vec<LineItem>> {
        let lines = Lines::new(text);
        let anchor = lines.find_first_containing(TABLE_ANCHOR)?;
        let start = anchor + 1;
        let end = Self::region_end(&lines, start);
        let region = lines.slice(start, end);

        let items: Vec<LineItem> = Self::chunks(region)
            .into_iter()
            .filter_map(Self::parse_chunk)
            .collect();

        trace!("Goods table rows {}..{} gave {} items", start, end, items.len());

        (!items.is_empty()).then_some(items)
    }
}

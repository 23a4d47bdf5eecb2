//! Tabular output: one row per (record, line item).

use std::io::Write;
use std::str::FromStr;

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::Serialize;

use super::Result;
use crate::invoice::rules::format_date;
use crate::models::record::{CanonicalRecord, LineItem};

/// Column names, in output order.
pub const COLUMNS: [&str; 13] = [
    "source_filename",
    "date",
    "facture_type",
    "kode_seri_raw",
    "reference",
    "buyer_npwp",
    "buyer_name",
    "buyer_address",
    "buyer_email",
    "buyer_id_tku",
    "goods_service",
    "dpp",
    "dpp_raw",
];

/// Name of the sheet written by [`TableFormat::Xlsx`].
pub const XLSX_SHEET: &str = "extraction";

const DPP_COLUMN: usize = 11;

/// Flattened view of one line item together with its record's fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub source_filename: String,
    pub date: String,
    pub facture_type: String,
    pub kode_seri_raw: String,
    pub reference: String,
    pub buyer_npwp: String,
    pub buyer_name: String,
    pub buyer_address: String,
    pub buyer_email: String,
    pub buyer_id_tku: String,
    pub goods_service: String,
    pub dpp: String,
    pub dpp_raw: String,
}

impl ExportRow {
    fn new(record: &CanonicalRecord, item: &LineItem) -> Self {
        Self {
            source_filename: record.source_filename.clone(),
            date: record.transaction_date.map(format_date).unwrap_or_default(),
            facture_type: record
                .document
                .document_type()
                .map(|t| t.label().to_string())
                .unwrap_or_default(),
            kode_seri_raw: record.document.as_str().to_string(),
            reference: record.reference.clone().unwrap_or_default(),
            buyer_npwp: record.buyer.tax_id.clone(),
            buyer_name: record.buyer.name.clone(),
            buyer_address: record.buyer.address.clone(),
            buyer_email: record.buyer.email.clone().unwrap_or_default(),
            buyer_id_tku: record.buyer.location_id.clone().unwrap_or_default(),
            goods_service: item.description.clone(),
            dpp: item
                .tax_base_value
                .map(|v| v.normalize().to_string())
                .unwrap_or_default(),
            dpp_raw: item.tax_base_raw.clone(),
        }
    }

    /// Cell values in [`COLUMNS`] order.
    pub fn values(&self) -> [&str; 13] {
        [
            &self.source_filename,
            &self.date,
            &self.facture_type,
            &self.kode_seri_raw,
            &self.reference,
            &self.buyer_npwp,
            &self.buyer_name,
            &self.buyer_address,
            &self.buyer_email,
            &self.buyer_id_tku,
            &self.goods_service,
            &self.dpp,
            &self.dpp_raw,
        ]
    }
}

/// Rows for every line item of every record, in input order.
///
/// A record without line items still produces one row with empty item
/// columns.
pub fn rows_from_records(records: &[CanonicalRecord]) -> Vec<ExportRow> {
    let placeholder = LineItem::placeholder();

    records
        .iter()
        .flat_map(|record| {
            let items: Vec<&LineItem> = if record.line_items.is_empty() {
                vec![&placeholder]
            } else {
                record.line_items.iter().collect()
            };
            items
                .into_iter()
                .map(|item| ExportRow::new(record, item))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Tabular output flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableFormat {
    #[default]
    Csv,
    Tsv,
    /// Excel workbook with a single `extraction` sheet.
    Xlsx,
}

impl TableFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Tsv => "tsv",
            TableFormat::Xlsx => "xlsx",
        }
    }

    /// Whether the output is binary and unsuitable for a terminal.
    pub fn is_binary(&self) -> bool {
        matches!(self, TableFormat::Xlsx)
    }
}

impl FromStr for TableFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(TableFormat::Csv),
            "tsv" => Ok(TableFormat::Tsv),
            "xlsx" => Ok(TableFormat::Xlsx),
            other => Err(format!("unknown table format: {}", other)),
        }
    }
}

/// Write rows with a header line.
pub fn write_rows<W: Write>(rows: &[ExportRow], writer: W, format: TableFormat) -> Result<()> {
    match format {
        TableFormat::Csv => write_delimited(rows, writer, b','),
        TableFormat::Tsv => write_delimited(rows, writer, b'\t'),
        TableFormat::Xlsx => write_workbook(rows, writer),
    }
}

fn write_delimited<W: Write>(rows: &[ExportRow], writer: W, delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_writer(writer);

    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Header row in bold, then one row per [`ExportRow`]. The DPP column is
/// numeric when the amount parsed.
fn write_workbook<W: Write>(rows: &[ExportRow], mut writer: W) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(XLSX_SHEET)?;

    for (col, name) in (0u16..).zip(COLUMNS) {
        sheet.write_string_with_format(0, col, name, &bold)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = u32::try_from(i + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (col, value) in (0u16..).zip(row.values()) {
            match value.parse::<f64>() {
                Ok(number) if usize::from(col) == DPP_COLUMN => {
                    sheet.write_number(r, col, number)?;
                }
                _ => {
                    sheet.write_string(r, col, value)?;
                }
            }
        }
    }

    let bytes = workbook.save_to_buffer()?;
    writer.write_all(&bytes)?;
    Ok(())
}

/// Write the records themselves as pretty-printed JSON.
pub fn write_json<W: Write>(records: &[CanonicalRecord], writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, records)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::DocumentCode;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn record(name: &str, items: Vec<LineItem>) -> CanonicalRecord {
        CanonicalRecord {
            source_filename: name.to_string(),
            transaction_date: NaiveDate::from_ymd_opt(2025, 9, 30),
            document: DocumentCode::new("0100250031234567"),
            line_items: items,
            ..CanonicalRecord::default()
        }
    }

    #[test]
    fn test_cross_product_keeps_order() {
        let records = vec![
            record("a.pdf", vec![LineItem::new("X", "1.000"), LineItem::new("Y", "2.000")]),
            record("b.pdf", vec![LineItem::new("Z", "3.000")]),
        ];
        let rows = rows_from_records(&records);

        let summary: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|r| (r.source_filename.as_str(), r.goods_service.as_str(), r.dpp.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![("a.pdf", "X", "1000"), ("a.pdf", "Y", "2000"), ("b.pdf", "Z", "3000")]
        );
        assert_eq!(rows[0].date, "30/09/2025");
        assert_eq!(rows[0].facture_type, "Pembetulan");
    }

    #[test]
    fn test_record_without_items_gives_one_row() {
        let rows = rows_from_records(&[record("a.pdf", Vec::new())]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].goods_service, "");
        assert_eq!(rows[0].dpp, "");
        assert_eq!(rows[0].dpp_raw, "");

        let rows = rows_from_records(&[CanonicalRecord::empty("b.pdf")]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kode_seri_raw, "");
        assert_eq!(rows[0].facture_type, "");
    }

    #[test]
    fn test_unparsed_amount_is_blank_not_zero() {
        let rows = rows_from_records(&[record("a.pdf", vec![LineItem::new("X", "n/a")])]);
        assert_eq!(rows[0].dpp, "");
        assert_eq!(rows[0].dpp_raw, "n/a");
    }

    #[test]
    fn test_csv_header_and_rows() {
        let rows = rows_from_records(&[record("a.pdf", vec![LineItem::new("Jasa", "762.300")])]);
        let mut out = Vec::new();
        write_rows(&rows, &mut out, TableFormat::Csv).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("source_filename,date,facture_type,kode_seri_raw,reference,buyer_npwp,buyer_name,buyer_address,buyer_email,buyer_id_tku,goods_service,dpp,dpp_raw")
        );
        assert_eq!(
            lines.next(),
            Some("a.pdf,30/09/2025,Pembetulan,0100250031234567,,,,,,,Jasa,762300,762.300")
        );
    }

    #[test]
    fn test_tsv_delimiter() {
        let rows = rows_from_records(&[CanonicalRecord::empty("a.pdf")]);
        let mut out = Vec::new();
        write_rows(&rows, &mut out, TableFormat::Tsv).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("source_filename\tdate\t"));
    }

    #[test]
    fn test_table_format_from_str() {
        assert_eq!("TSV".parse::<TableFormat>(), Ok(TableFormat::Tsv));
        assert_eq!("xlsx".parse::<TableFormat>(), Ok(TableFormat::Xlsx));
        assert!("ods".parse::<TableFormat>().is_err());
    }

    #[test]
    fn test_header_matches_columns() {
        let mut out = Vec::new();
        write_rows(&rows_from_records(&[CanonicalRecord::empty("a.pdf")]), &mut out, TableFormat::Csv)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().next(), Some(COLUMNS.join(",").as_str()));
    }

    #[test]
    fn test_xlsx_sheet_reads_back() {
        use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
        use std::io::Cursor;

        let rows = rows_from_records(&[
            record("a.pdf", vec![LineItem::new("Jasa", "762.300")]),
            record("b.pdf", vec![LineItem::new("Sewa", "n/a")]),
        ]);
        let mut out = Vec::new();
        write_rows(&rows, &mut out, TableFormat::Xlsx).unwrap();

        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(out)).unwrap();
        assert_eq!(workbook.sheet_names(), vec![XLSX_SHEET.to_string()]);
        let range = workbook.worksheet_range(XLSX_SHEET).unwrap();

        assert_eq!(range.get_size(), (3, 13));
        assert_eq!(range.get((0, 0)), Some(&Data::String("source_filename".into())));
        assert_eq!(range.get((0, 12)), Some(&Data::String("dpp_raw".into())));
        assert_eq!(range.get((1, 0)), Some(&Data::String("a.pdf".into())));
        assert_eq!(range.get((1, 1)), Some(&Data::String("30/09/2025".into())));
        assert_eq!(range.get((1, 10)), Some(&Data::String("Jasa".into())));
        assert_eq!(range.get((1, 11)), Some(&Data::Float(762300.0)));
        assert_eq!(range.get((1, 12)), Some(&Data::String("762.300".into())));
        assert_eq!(range.get((2, 12)), Some(&Data::String("n/a".into())));
    }
}

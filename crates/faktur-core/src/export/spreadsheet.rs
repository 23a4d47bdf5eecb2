//! Header/detail spreadsheet input ("Faktur" and "DetailFaktur" sheets).
//!
//! Each header row describes one invoice and each detail row one goods or
//! service entry; both carry a `Baris` number that joins them. Amounts the
//! sheet leaves blank are derived with the configured tax rules.

use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Read};
use std::str::FromStr;

use calamine::{Data, DataType, Range, Reader, Xlsx, open_workbook_from_rs};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::filing::{FilingDocument, FilingInvoice, GoodService, seller_id_tku};
use crate::error::SpreadsheetError;
use crate::invoice::rules::{digits_only, normalize_amount, pad_numeric_id};
use crate::models::config::TaxRules;

/// Sheet holding one row per invoice.
pub const HEADER_SHEET: &str = "Faktur";
/// Sheet holding one row per goods/service entry.
pub const DETAIL_SHEET: &str = "DetailFaktur";

const ROW_KEY: &str = "baris";
const SELLER_TIN_LABEL: &str = "npwp penjual";
const END_MARKER: &str = "end";

/// Result of a spreadsheet conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub document: FilingDocument,
    /// Rows that could not be matched up. These never abort a conversion.
    pub warnings: Vec<String>,
}

/// Read an `.xlsx` workbook with `Faktur` and `DetailFaktur` sheets.
pub fn read_workbook(bytes: &[u8], rules: &TaxRules) -> Result<Conversion, SpreadsheetError> {
    let mut workbook: Xlsx<Cursor<&[u8]>> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e: calamine::XlsxError| SpreadsheetError::Workbook(e.to_string()))?;

    let header = sheet_table(&mut workbook, HEADER_SHEET)?;
    let detail = sheet_table(&mut workbook, DETAIL_SHEET)?;

    convert(&header, &detail, rules)
}

/// Read the two sheets exported as CSV files.
pub fn read_csv_pair<H: Read, D: Read>(
    header: H,
    detail: D,
    rules: &TaxRules,
) -> Result<Conversion, SpreadsheetError> {
    let header = csv_table(HEADER_SHEET, header)?;
    let detail = csv_table(DETAIL_SHEET, detail)?;

    convert(&header, &detail, rules)
}

/// A sheet as rows of trimmed cell text.
struct Table {
    name: String,
    rows: Vec<Vec<String>>,
}

fn sheet_table<R>(workbook: &mut Xlsx<R>, name: &str) -> Result<Table, SpreadsheetError>
where
    R: Read + std::io::Seek,
{
    let range: Range<Data> = workbook
        .worksheet_range(name)
        .map_err(|_| SpreadsheetError::MissingSheet(name.to_string()))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok(Table {
        name: name.to_string(),
        rows,
    })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) => cell
            .as_date()
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default(),
    }
}

fn csv_table<R: Read>(name: &str, input: R) -> Result<Table, SpreadsheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|c| c.trim().to_string()).collect());
    }

    Ok(Table {
        name: name.to_string(),
        rows,
    })
}

/// Data rows of a sheet keyed by lowercase column name.
struct SheetRows {
    seller_tin: Option<String>,
    rows: Vec<Row>,
}

struct Row {
    number: usize,
    cells: HashMap<String, String>,
}

impl Row {
    fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .get(&column.to_lowercase())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    fn text(&self, column: &str) -> String {
        self.get(column).unwrap_or_default().to_string()
    }

    fn text_or(&self, column: &str, default: &str) -> String {
        self.get(column).unwrap_or(default).to_string()
    }

    fn amount(&self, column: &str) -> Option<Decimal> {
        self.get(column).and_then(parse_cell_amount)
    }

    fn key(&self) -> Option<&str> {
        self.get(ROW_KEY)
    }
}

fn parse_cell_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim())
        .ok()
        .or_else(|| normalize_amount(raw))
}

fn parse_cell_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);

    ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok())
}

fn sheet_rows(table: &Table) -> Result<SheetRows, SpreadsheetError> {
    let header_index = table
        .rows
        .iter()
        .position(|row| row.iter().any(|c| c.eq_ignore_ascii_case(ROW_KEY)))
        .ok_or_else(|| SpreadsheetError::NoHeader(table.name.clone()))?;

    let seller_tin = table.rows[..header_index].iter().find_map(|row| {
        let label = row
            .iter()
            .position(|c| c.to_lowercase() == SELLER_TIN_LABEL)?;
        row[label + 1..]
            .iter()
            .find(|c| !c.is_empty())
            .map(|c| digits_only(c))
    });

    let columns: Vec<String> = table.rows[header_index]
        .iter()
        .map(|c| c.to_lowercase())
        .collect();

    let rows = table.rows[header_index + 1..]
        .iter()
        .enumerate()
        .map(|(i, cells)| Row {
            number: header_index + i + 2,
            cells: columns
                .iter()
                .zip(cells.iter())
                .filter(|(name, _)| !name.is_empty())
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        })
        .filter(|row| {
            row.key()
                .is_some_and(|key| !key.eq_ignore_ascii_case(END_MARKER))
        })
        .collect();

    Ok(SheetRows { seller_tin, rows })
}

fn convert(header: &Table, detail: &Table, rules: &TaxRules) -> Result<Conversion, SpreadsheetError> {
    let header_rows = sheet_rows(header)?;
    let detail_rows = sheet_rows(detail)?;
    let mut warnings = Vec::new();

    let seller_tin = header_rows
        .seller_tin
        .clone()
        .or_else(|| rules.seller_tin.clone())
        .unwrap_or_default();
    let default_seller_tku = seller_id_tku(&seller_tin, rules);

    let mut goods: BTreeMap<String, Vec<GoodService>> = BTreeMap::new();
    for row in &detail_rows.rows {
        if let Some(key) = row.key() {
            goods
                .entry(key.to_string())
                .or_default()
                .push(good_from_row(row, rules));
        }
    }

    let mut invoices = Vec::with_capacity(header_rows.rows.len());
    for row in &header_rows.rows {
        let key = row.key().unwrap_or_default().to_string();
        let mut invoice = invoice_from_row(row, &default_seller_tku, rules);

        match goods.remove(&key) {
            Some(items) => invoice.goods = items,
            None => warnings.push(format!(
                "{} row {} (Baris {}) has no {} rows",
                header.name, row.number, key, detail.name
            )),
        }
        invoices.push(invoice);
    }

    for row in &detail_rows.rows {
        if let Some(key) = row.key().filter(|k| goods.contains_key(*k)) {
            warnings.push(format!(
                "{} row {} refers to unknown Baris {}",
                detail.name, row.number, key
            ));
        }
    }

    for warning in &warnings {
        warn!("{}", warning);
    }
    debug!(
        "Converted {} invoices from {} detail rows",
        invoices.len(),
        detail_rows.rows.len()
    );

    Ok(Conversion {
        document: FilingDocument {
            seller_tin,
            invoices,
        },
        warnings,
    })
}

fn invoice_from_row(row: &Row, default_seller_tku: &str, rules: &TaxRules) -> FilingInvoice {
    let buyer_tin = row.get("NPWP/NIK Pembeli").map(digits_only).unwrap_or_default();
    let buyer_id_tku = match row.get("ID TKU Pembeli") {
        Some(id) => id.to_string(),
        None if buyer_tin.is_empty() => String::new(),
        None => pad_numeric_id(&buyer_tin, rules.id_tku_length),
    };

    FilingInvoice {
        date: row.get("Tanggal Faktur").and_then(parse_cell_date),
        option: row.text_or("Jenis Faktur", "Normal"),
        trx_code: transaction_code(&row.text("Kode Transaksi")),
        add_info: row.text("Keterangan Tambahan"),
        custom_doc: row.text("Dokumen Pendukung"),
        ref_desc: row.text("Referensi"),
        facility_stamp: row.text("Cap Fasilitas"),
        seller_id_tku: row.text_or("ID TKU Penjual", default_seller_tku),
        buyer_tin,
        buyer_document: row.text_or("Jenis ID Pembeli", &rules.buyer_document),
        buyer_country: row.text_or("Negara Pembeli", &rules.buyer_country),
        buyer_document_number: row.text("Nomor Dokumen Pembeli"),
        buyer_name: row.text("Nama Pembeli"),
        buyer_address: row.text("Alamat Pembeli"),
        buyer_email: row.text("Email Pembeli"),
        buyer_id_tku,
        goods: Vec::new(),
    }
}

/// Numeric cells lose their leading zero ("4" for "04").
fn transaction_code(raw: &str) -> String {
    if raw.len() == 1 && raw.chars().all(|c| c.is_ascii_digit()) {
        format!("0{}", raw)
    } else {
        raw.to_string()
    }
}

fn good_from_row(row: &Row, rules: &TaxRules) -> GoodService {
    let price = row.amount("Harga Satuan");
    let qty = row.amount("Jumlah Barang Jasa").unwrap_or(Decimal::ONE);
    let total_discount = row.amount("Total Diskon").unwrap_or(Decimal::ZERO);

    let tax_base = row
        .amount("DPP")
        .or_else(|| price.map(|p| p * qty - total_discount));
    let other_tax_base = row
        .amount("DPP Nilai Lain")
        .or_else(|| tax_base.map(|b| rules.other_tax_base(b)));
    let vat = row
        .amount("PPN")
        .or_else(|| other_tax_base.map(|o| rules.vat(o)));

    GoodService {
        option: row.text_or("Barang/Jasa", &rules.goods_option),
        code: row.text_or("Kode Barang Jasa", &rules.goods_code),
        name: row.text("Nama Barang/Jasa"),
        unit: row.text_or("Nama Satuan Ukur", &rules.unit_code),
        price,
        qty,
        total_discount,
        tax_base,
        other_tax_base,
        vat_rate: row.amount("Tarif PPN").unwrap_or(rules.vat_rate_label),
        vat,
        stlg_rate: row.amount("Tarif PPnBM").unwrap_or(Decimal::ZERO),
        stlg: row.amount("PPnBM").unwrap_or(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER_CSV: &str = "\
NPWP Penjual,0987654321098000
Baris,Tanggal Faktur,Jenis Faktur,Kode Transaksi,Referensi,NPWP/NIK Pembeli,Nama Pembeli,Alamat Pembeli
1,30/09/2025,Normal,4,INV-1,01.234.567.8-901.000,PT Contoh,Jl. Satu
2,2025-10-01,Normal,04,INV-2,1234,PT Dua,Jl. Dua
3,01/10/2025,Normal,04,INV-3,5678,PT Tiga,Jl. Tiga
END
";

    const DETAIL_CSV: &str = "\
Baris,Barang/Jasa,Kode Barang Jasa,Nama Barang/Jasa,Nama Satuan Ukur,Harga Satuan,Jumlah Barang Jasa,Total Diskon,DPP,DPP Nilai Lain,Tarif PPN,PPN
1,B,000000,Jasa Konsultasi,UM.0030,900000,1,0,,,,
1,A,000000,Kertas,UM.0018,1.000,10,0,10000,9167,12,1100
2,B,000000,Sewa,UM.0030,500000,2,100000,,,,
9,A,000000,Orphan,UM.0018,1,1,0,,,,
";

    fn convert_fixture() -> Conversion {
        read_csv_pair(
            HEADER_CSV.as_bytes(),
            DETAIL_CSV.as_bytes(),
            &TaxRules::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_rows_join_on_baris() {
        let conversion = convert_fixture();
        let doc = &conversion.document;

        assert_eq!(doc.seller_tin, "0987654321098000");
        assert_eq!(doc.invoices.len(), 3);
        assert_eq!(doc.invoices[0].goods.len(), 2);
        assert_eq!(doc.invoices[0].goods[0].name, "Jasa Konsultasi");
        assert_eq!(doc.invoices[0].goods[1].name, "Kertas");
        assert_eq!(doc.invoices[1].goods.len(), 1);
        assert!(doc.invoices[2].goods.is_empty());
    }

    #[test]
    fn test_header_fields() {
        let conversion = convert_fixture();
        let inv = &conversion.document.invoices[0];

        assert_eq!(inv.date, NaiveDate::from_ymd_opt(2025, 9, 30));
        assert_eq!(inv.trx_code, "04");
        assert_eq!(inv.ref_desc, "INV-1");
        assert_eq!(inv.buyer_tin, "012345678901000");
        assert_eq!(inv.buyer_id_tku, "0000000012345678901000");
        assert_eq!(inv.buyer_country, "IDN");
        assert_eq!(inv.seller_id_tku, "0000000987654321098000");
        assert_eq!(
            conversion.document.invoices[1].date,
            NaiveDate::from_ymd_opt(2025, 10, 1)
        );
    }

    #[test]
    fn test_missing_amounts_are_derived() {
        let conversion = convert_fixture();
        let good = &conversion.document.invoices[0].goods[0];

        assert_eq!(good.tax_base, Some(Decimal::from(900_000)));
        assert_eq!(good.other_tax_base, Some(Decimal::from(825_000)));
        assert_eq!(good.vat, Some(Decimal::from(99_000)));
        assert_eq!(good.vat_rate, Decimal::from(12));

        let sewa = &conversion.document.invoices[1].goods[0];
        assert_eq!(sewa.tax_base, Some(Decimal::from(900_000)));
    }

    #[test]
    fn test_given_amounts_are_kept() {
        let conversion = convert_fixture();
        let good = &conversion.document.invoices[0].goods[1];

        assert_eq!(good.price, Some(Decimal::from_str("1.000").unwrap()));
        assert_eq!(good.tax_base, Some(Decimal::from(10_000)));
        assert_eq!(good.other_tax_base, Some(Decimal::from(9_167)));
        assert_eq!(good.vat, Some(Decimal::from(1_100)));
        assert_eq!(good.unit, "UM.0018");
    }

    #[test]
    fn test_unmatched_rows_are_warnings() {
        let conversion = convert_fixture();

        assert_eq!(conversion.warnings.len(), 2);
        assert!(conversion.warnings[0].contains("Baris 3"));
        assert!(conversion.warnings[1].contains("unknown Baris 9"));
    }

    #[test]
    fn test_missing_header_row() {
        let result = read_csv_pair(
            "no header here\n".as_bytes(),
            DETAIL_CSV.as_bytes(),
            &TaxRules::default(),
        );
        assert!(matches!(result, Err(SpreadsheetError::NoHeader(name)) if name == "Faktur"));
    }

    #[test]
    fn test_invalid_workbook() {
        let result = read_workbook(b"not a workbook", &TaxRules::default());
        assert!(matches!(result, Err(SpreadsheetError::Workbook(_))));
    }

    #[test]
    fn test_parse_cell_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 9, 30);
        assert_eq!(parse_cell_date("30/09/2025"), expected);
        assert_eq!(parse_cell_date("2025-09-30"), expected);
        assert_eq!(parse_cell_date("30-09-2025"), expected);
        assert_eq!(parse_cell_date("2025-09-30T00:00:00"), expected);
        assert_eq!(parse_cell_date("yesterday"), None);
    }
}

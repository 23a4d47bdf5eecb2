//! Output serializers and the spreadsheet input path.

pub mod filing;
pub mod spreadsheet;
pub mod table;
mod xml;

pub use filing::{FilingDocument, FilingInvoice, GoodService};
pub use spreadsheet::{read_csv_pair, read_workbook, Conversion};
pub use table::{rows_from_records, write_json, write_rows, ExportRow, TableFormat, COLUMNS, XLSX_SHEET};

use crate::error::ExportError;

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

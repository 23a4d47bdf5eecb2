//! Common regex patterns for the Coretax Faktur Pajak layout.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Dates
    pub static ref DATE_NAMED_MONTH: Regex = Regex::new(
        r"(?:,|\b)\s*(\d{1,2})\s+([A-Za-z]+)\s+(\d{4})"
    ).unwrap();

    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[./\-](\d{1,2})[./\-](\d{4})\b"
    ).unwrap();

    // Serial code and reference
    pub static ref SERIAL_CODE: Regex = Regex::new(
        r"Kode dan Nomor Seri Faktur Pajak\s*:\s*([0-9A-Za-z\-]+)"
    ).unwrap();

    pub static ref REFERENCE: Regex = Regex::new(
        r"Referensi\s*:\s*(.+)"
    ).unwrap();

    // Party sections
    pub static ref BUYER_SECTION: Regex = Regex::new(
        r"(?s)Pembeli Barang Kena Pajak\s*/\s*Penerima Jasa Kena Pajak(.*?)(?:Nama Barang Kena Pajak|Dasar Pengenaan Pajak)"
    ).unwrap();

    pub static ref SELLER_SECTION: Regex = Regex::new(
        r"(?s)Pengusaha Kena Pajak(.*?)Pembeli Barang Kena Pajak"
    ).unwrap();

    // Party sub-fields
    pub static ref PARTY_NPWP: Regex = Regex::new(
        r"NPWP\s*:\s*([0-9][0-9.\-]*)"
    ).unwrap();

    pub static ref PARTY_NAME: Regex = Regex::new(
        r"Nama\s*:\s*([^\n]+)"
    ).unwrap();

    pub static ref PARTY_ADDRESS: Regex = Regex::new(
        r"(?s)Alamat\s*:\s*(.*?)\s*(?:(?:NPWP|NIK|Nomor Paspor|Identitas Lain|Email)\s*:|\z)"
    ).unwrap();

    pub static ref PARTY_EMAIL: Regex = Regex::new(
        r"Email\s*:\s*([\w.\-]+@[\w.\-]+)"
    ).unwrap();

    pub static ref PARTY_ID_TKU: Regex = Regex::new(
        r"#\s*(\d{8,30})"
    ).unwrap();

    // Goods table
    pub static ref ITEM_START: Regex = Regex::new(
        r"^\d{1,3}\s+\S"
    ).unwrap();

    pub static ref ITEM_PREFIX: Regex = Regex::new(
        r"^\d{1,3}\s+(?:\d{6}\s+)?"
    ).unwrap();

    pub static ref CURRENCY_AMOUNT: Regex = Regex::new(
        r"Rp\.?\s*(-?\d[\d.,]*)"
    ).unwrap();

    pub static ref TABLE_SUMMARY_LINE: Regex = Regex::new(
        r"(?i)^harga jual\s*/\s*penggantian\s*/\s*uang muka\s*/\s*termin\s*:?\s*(?:rp\.?\s*)?\d"
    ).unwrap();

    // Totals
    pub static ref TOTAL_SELLING_PRICE: Regex = Regex::new(
        r"(?im)^[ \t]*Harga Jual\s*/\s*Penggantian\s*/\s*Uang Muka\s*/\s*Termin[ \t]*:?[ \t]*(?:Rp\.?[ \t]*)?(\d[\d.,]*)"
    ).unwrap();

    pub static ref TOTAL_DISCOUNT: Regex = Regex::new(
        r"(?i)Dikurangi Potongan Harga[ \t]*:?[ \t]*(?:Rp\.?[ \t]*)?(\d[\d.,]*)"
    ).unwrap();

    pub static ref TOTAL_DOWN_PAYMENT: Regex = Regex::new(
        r"(?i)Dikurangi Uang Muka[^\n\d]*?[ \t]*(?:Rp\.?[ \t]*)?(\d[\d.,]*)"
    ).unwrap();

    pub static ref TOTAL_TAX_BASE: Regex = Regex::new(
        r"(?i)Dasar Pengenaan Pajak[ \t]*:?[ \t]*(?:Rp\.?[ \t]*)?(\d[\d.,]*)"
    ).unwrap();

    pub static ref TOTAL_VAT: Regex = Regex::new(
        r"(?i)Jumlah PPN[ \t]*(?:\([^)\n]*\))?[ \t]*:?[ \t]*(?:Rp\.?[ \t]*)?(\d[\d.,]*)"
    ).unwrap();

    pub static ref TOTAL_LUXURY_TAX: Regex = Regex::new(
        r"(?i)Jumlah PPnBM[ \t]*(?:\([^)\n]*\))?[ \t]*:?[ \t]*(?:Rp\.?[ \t]*)?(\d[\d.,]*)"
    ).unwrap();
}

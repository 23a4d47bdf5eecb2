//! Summary amounts printed under the goods table.

use regex::Regex;

use super::FieldExtractor;
use super::patterns::{
    TOTAL_DISCOUNT, TOTAL_DOWN_PAYMENT, TOTAL_LUXURY_TAX, TOTAL_SELLING_PRICE, TOTAL_TAX_BASE,
    TOTAL_VAT,
};
use crate::models::record::{DocumentTotals, MonetaryAmount};

fn labeled_amount(pattern: &Regex, text: &str) -> Option<MonetaryAmount> {
    pattern
        .captures(text)
        .map(|c| MonetaryAmount::parse(c[1].trim_end_matches(['.', ','])))
}

/// Amount on the same line as each summary label.
pub struct TotalsRule;

impl FieldExtractor for TotalsRule {
    type Output = DocumentTotals;

    fn name(&self) -> &'static str {
        "labeled_totals"
    }

    fn extract(&self, text: &str) -> Option<DocumentTotals> {
        let totals = DocumentTotals {
            selling_price: labeled_amount(&TOTAL_SELLING_PRICE, text),
            discount: labeled_amount(&TOTAL_DISCOUNT, text),
            down_payment: labeled_amount(&TOTAL_DOWN_PAYMENT, text),
            tax_base: labeled_amount(&TOTAL_TAX_BASE, text),
            vat: labeled_amount(&TOTAL_VAT, text),
            luxury_tax: labeled_amount(&TOTAL_LUXURY_TAX, text),
        };

        (!totals.is_empty()).then_some(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn value(amount: &Option<MonetaryAmount>) -> Option<Decimal> {
        amount.as_ref().and_then(|a| a.value)
    }

    #[test]
    fn test_summary_amounts() {
        let text = "\
Harga Jual / Penggantian / Uang Muka / Termin 1.000.000,00
Dikurangi Potongan Harga 0,00
Dikurangi Uang Muka yang telah diterima
Dasar Pengenaan Pajak 916.666,67
Jumlah PPN (Pajak Pertambahan Nilai) 110.000,00
Jumlah PPnBM (Pajak Penjualan atas Barang Mewah) 0,00
";
        let totals = TotalsRule.extract(text).unwrap();

        assert_eq!(value(&totals.selling_price), Some(Decimal::from(1_000_000)));
        assert_eq!(value(&totals.discount), Some(Decimal::ZERO));
        assert_eq!(totals.down_payment, None);
        assert_eq!(
            value(&totals.tax_base),
            Some(Decimal::from_str("916666.67").unwrap())
        );
        assert_eq!(totals.tax_base.as_ref().unwrap().raw, "916.666,67");
        assert_eq!(value(&totals.vat), Some(Decimal::from(110_000)));
        assert_eq!(value(&totals.luxury_tax), Some(Decimal::ZERO));
    }

    #[test]
    fn test_table_header_is_not_a_total() {
        let text = "No. Kode Barang Nama Barang Kena Pajak / Jasa Kena Pajak Harga Jual / Penggantian / Uang Muka / Termin (Rp)";
        assert_eq!(TotalsRule.extract(text), None);
    }

    #[test]
    fn test_no_totals() {
        assert_eq!(TotalsRule.extract("Faktur Pajak"), None);
    }
}

//! Coretax bulk-import XML ("TaxInvoiceBulk").

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::Result;
use super::xml::XmlWriter;
use crate::invoice::rules::pad_numeric_id;
use crate::models::config::TaxRules;
use crate::models::record::{CanonicalRecord, DocumentType, LineItem};

/// One tax filing: the seller TIN and its invoices, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilingDocument {
    pub seller_tin: String,
    pub invoices: Vec<FilingInvoice>,
}

/// One `TaxInvoice` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilingInvoice {
    pub date: Option<NaiveDate>,
    pub option: String,
    pub trx_code: String,
    pub add_info: String,
    pub custom_doc: String,
    pub ref_desc: String,
    pub facility_stamp: String,
    pub seller_id_tku: String,
    pub buyer_tin: String,
    pub buyer_document: String,
    pub buyer_country: String,
    pub buyer_document_number: String,
    pub buyer_name: String,
    pub buyer_address: String,
    pub buyer_email: String,
    pub buyer_id_tku: String,
    pub goods: Vec<GoodService>,
}

/// One `GoodService` entry. Amounts that could not be determined are `None`
/// and are written as empty elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GoodService {
    pub option: String,
    pub code: String,
    pub name: String,
    pub unit: String,
    pub price: Option<Decimal>,
    pub qty: Decimal,
    pub total_discount: Decimal,
    pub tax_base: Option<Decimal>,
    pub other_tax_base: Option<Decimal>,
    pub vat_rate: Decimal,
    pub vat: Option<Decimal>,
    pub stlg_rate: Decimal,
    pub stlg: Decimal,
}

impl GoodService {
    /// Entry for an extracted line item: quantity one, price and tax base
    /// equal to the item's amount, derived amounts from `rules`.
    pub fn from_line_item(item: &LineItem, rules: &TaxRules) -> Self {
        let base = item.tax_base_value;
        let other_tax_base = base.map(|b| rules.other_tax_base(b));

        Self {
            option: rules.goods_option.clone(),
            code: rules.goods_code.clone(),
            name: item.description.clone(),
            unit: rules.unit_code.clone(),
            price: base,
            qty: Decimal::ONE,
            total_discount: Decimal::ZERO,
            tax_base: base,
            other_tax_base,
            vat_rate: rules.vat_rate_label,
            vat: other_tax_base.map(|o| rules.vat(o)),
            stlg_rate: Decimal::ZERO,
            stlg: Decimal::ZERO,
        }
    }
}

impl FilingInvoice {
    /// Invoice entry for an extracted record. Placeholder line items are not
    /// carried over.
    pub fn from_record(record: &CanonicalRecord, seller_id_tku: &str, rules: &TaxRules) -> Self {
        let buyer_id_tku = if record.buyer.tax_id.is_empty() {
            String::new()
        } else {
            pad_numeric_id(&record.buyer.tax_id, rules.id_tku_length)
        };

        Self {
            date: record.transaction_date,
            option: record
                .document
                .document_type()
                .unwrap_or(DocumentType::Normal)
                .label()
                .to_string(),
            trx_code: record.document.transaction_code().to_string(),
            add_info: String::new(),
            custom_doc: String::new(),
            ref_desc: record.reference.clone().unwrap_or_default(),
            facility_stamp: String::new(),
            seller_id_tku: seller_id_tku.to_string(),
            buyer_tin: record.buyer.tax_id.clone(),
            buyer_document: rules.buyer_document.clone(),
            buyer_country: rules.buyer_country.clone(),
            buyer_document_number: String::new(),
            buyer_name: record.buyer.name.clone(),
            buyer_address: record.buyer.address.clone(),
            buyer_email: record.buyer.email.clone().unwrap_or_default(),
            buyer_id_tku,
            goods: record
                .line_items
                .iter()
                .filter(|item| !item.is_placeholder())
                .map(|item| GoodService::from_line_item(item, rules))
                .collect(),
        }
    }
}

impl FilingDocument {
    /// Build the filing for extracted records, in input order.
    ///
    /// The seller TIN comes from `rules.seller_tin` or, when that is unset,
    /// from the first record whose seller block has one.
    pub fn from_records(records: &[CanonicalRecord], rules: &TaxRules) -> Self {
        let seller_tin = rules
            .seller_tin
            .clone()
            .or_else(|| {
                records
                    .iter()
                    .map(|r| r.seller.tax_id.as_str())
                    .find(|tin| !tin.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_default();

        let seller_id_tku = seller_id_tku(&seller_tin, rules);

        let invoices: Vec<FilingInvoice> = records
            .iter()
            .map(|r| FilingInvoice::from_record(r, &seller_id_tku, rules))
            .collect();

        debug!("Filing document with {} invoices", invoices.len());

        Self {
            seller_tin,
            invoices,
        }
    }

    /// Render the Coretax `TaxInvoiceBulk` XML.
    pub fn to_xml(&self) -> Result<String> {
        let mut w = XmlWriter::new()?;

        w.start_element("TaxInvoiceBulk")?;
        w.text_element("TIN", &self.seller_tin)?;
        w.start_element("ListOfTaxInvoice")?;
        for invoice in &self.invoices {
            write_invoice(&mut w, invoice)?;
        }
        w.end_element("ListOfTaxInvoice")?;
        w.end_element("TaxInvoiceBulk")?;

        w.finish()
    }
}

/// Seller location id: configured, else the padded seller TIN.
pub(crate) fn seller_id_tku(seller_tin: &str, rules: &TaxRules) -> String {
    match &rules.seller_id_tku {
        Some(id) => id.clone(),
        None if seller_tin.is_empty() => String::new(),
        None => pad_numeric_id(seller_tin, rules.id_tku_length),
    }
}

fn write_invoice(w: &mut XmlWriter, inv: &FilingInvoice) -> Result<()> {
    w.start_element("TaxInvoice")?;
    w.text_element("TaxInvoiceDate", &format_xml_date(inv.date))?;
    w.text_element("TaxInvoiceOpt", &inv.option)?;
    w.text_element("TrxCode", &inv.trx_code)?;
    w.text_element("AddInfo", &inv.add_info)?;
    w.text_element("CustomDoc", &inv.custom_doc)?;
    w.text_element("RefDesc", &inv.ref_desc)?;
    w.text_element("FacilityStamp", &inv.facility_stamp)?;
    w.text_element("SellerIDTKU", &inv.seller_id_tku)?;
    w.text_element("BuyerTin", &inv.buyer_tin)?;
    w.text_element("BuyerDocument", &inv.buyer_document)?;
    w.text_element("BuyerCountry", &inv.buyer_country)?;
    w.text_element("BuyerDocumentNumber", &inv.buyer_document_number)?;
    w.text_element("BuyerName", &inv.buyer_name)?;
    // Element name as defined by the import schema.
    w.text_element("BuyerAdress", &inv.buyer_address)?;
    w.text_element("BuyerEmail", &inv.buyer_email)?;
    w.text_element("BuyerIDTKU", &inv.buyer_id_tku)?;

    w.start_element("ListOfGoodService")?;
    for good in &inv.goods {
        write_good(w, good)?;
    }
    w.end_element("ListOfGoodService")?;

    w.end_element("TaxInvoice")
}

fn write_good(w: &mut XmlWriter, g: &GoodService) -> Result<()> {
    w.start_element("GoodService")?;
    w.text_element("Opt", &g.option)?;
    w.text_element("Code", &g.code)?;
    w.text_element("Name", &g.name)?;
    w.text_element("Unit", &g.unit)?;
    w.text_element("Price", &format_xml_amount(g.price))?;
    w.text_element("Qty", &format_xml_amount(Some(g.qty)))?;
    w.text_element("TotalDiscount", &format_xml_amount(Some(g.total_discount)))?;
    w.text_element("TaxBase", &format_xml_amount(g.tax_base))?;
    w.text_element("OtherTaxBase", &format_xml_amount(g.other_tax_base))?;
    w.text_element("VATRate", &format_xml_amount(Some(g.vat_rate)))?;
    w.text_element("VAT", &format_xml_amount(g.vat))?;
    w.text_element("STLGRate", &format_xml_amount(Some(g.stlg_rate)))?;
    w.text_element("STLG", &format_xml_amount(Some(g.stlg)))?;
    w.end_element("GoodService")
}

fn format_xml_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn format_xml_amount(amount: Option<Decimal>) -> String {
    amount.map(|a| a.normalize().to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{DocumentCode, Party};
    use pretty_assertions::assert_eq;

    fn record() -> CanonicalRecord {
        CanonicalRecord {
            source_filename: "a.pdf".into(),
            transaction_date: NaiveDate::from_ymd_opt(2025, 9, 30),
            document: DocumentCode::new("0400250031234567"),
            reference: Some("INV/001".into()),
            buyer: Party {
                tax_id: "1234".into(),
                name: "PT Contoh & Co".into(),
                address: "Jl. Satu".into(),
                ..Party::default()
            },
            seller: Party {
                tax_id: "0987654321098000".into(),
                ..Party::default()
            },
            line_items: vec![LineItem::new("Jasa", "900.000"), LineItem::new("Lain", "n/a")],
            ..CanonicalRecord::default()
        }
    }

    #[test]
    fn test_derived_amounts() {
        let doc = FilingDocument::from_records(&[record()], &TaxRules::default());
        let good = &doc.invoices[0].goods[0];

        assert_eq!(good.tax_base, Some(Decimal::from(900_000)));
        assert_eq!(good.other_tax_base, Some(Decimal::from(825_000)));
        assert_eq!(good.vat, Some(Decimal::from(99_000)));
        assert_eq!(good.vat_rate, Decimal::from(12));
    }

    #[test]
    fn test_unknown_base_stays_empty() {
        let doc = FilingDocument::from_records(&[record()], &TaxRules::default());
        let good = &doc.invoices[0].goods[1];

        assert_eq!(good.price, None);
        assert_eq!(good.tax_base, None);
        assert_eq!(good.other_tax_base, None);
        assert_eq!(good.vat, None);
    }

    #[test]
    fn test_invoice_fields() {
        let doc = FilingDocument::from_records(&[record()], &TaxRules::default());
        let inv = &doc.invoices[0];

        assert_eq!(doc.seller_tin, "0987654321098000");
        assert_eq!(inv.trx_code, "04");
        assert_eq!(inv.option, "Normal");
        assert_eq!(inv.buyer_id_tku, format!("{}1234", "0".repeat(18)));
        assert_eq!(inv.seller_id_tku, "0000000987654321098000");
    }

    #[test]
    fn test_configured_seller_wins() {
        let rules = TaxRules {
            seller_tin: Some("1111111111111111".into()),
            seller_id_tku: Some("1111111111111111000000".into()),
            ..TaxRules::default()
        };
        let doc = FilingDocument::from_records(&[record()], &rules);
        assert_eq!(doc.seller_tin, "1111111111111111");
        assert_eq!(doc.invoices[0].seller_id_tku, "1111111111111111000000");
    }

    #[test]
    fn test_placeholder_items_are_skipped() {
        let doc =
            FilingDocument::from_records(&[CanonicalRecord::empty("x.pdf")], &TaxRules::default());
        assert_eq!(doc.invoices.len(), 1);
        assert!(doc.invoices[0].goods.is_empty());
        assert_eq!(doc.invoices[0].buyer_id_tku, "");
    }

    #[test]
    fn test_xml_output() {
        let xml = FilingDocument::from_records(&[record()], &TaxRules::default())
            .to_xml()
            .unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<TIN>0987654321098000</TIN>"));
        assert!(xml.contains("<TaxInvoiceDate>2025-09-30</TaxInvoiceDate>"));
        assert!(xml.contains("<TrxCode>04</TrxCode>"));
        assert!(xml.contains("<BuyerName>PT Contoh &amp; Co</BuyerName>"));
        assert!(xml.contains("<BuyerAdress>Jl. Satu</BuyerAdress>"));
        assert!(xml.contains("<BuyerIDTKU>0000000000000000001234</BuyerIDTKU>"));
        assert!(xml.contains("<OtherTaxBase>825000</OtherTaxBase>"));
        assert!(xml.contains("<VAT>99000</VAT>"));
        assert!(xml.contains("<AddInfo/>"));
        assert!(xml.contains("<Price/>"));

        let first = xml.find("<Name>Jasa</Name>").unwrap();
        let second = xml.find("<Name>Lain</Name>").unwrap();
        assert!(first < second);
    }
}

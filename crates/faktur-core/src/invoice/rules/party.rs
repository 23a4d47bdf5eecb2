//! Seller and buyer identity blocks.

use regex::Regex;

use super::FieldExtractor;
use super::ids::digits_only;
use super::patterns::{
    BUYER_SECTION, PARTY_ADDRESS, PARTY_EMAIL, PARTY_ID_TKU, PARTY_NAME, PARTY_NPWP,
    SELLER_SECTION,
};
use crate::models::record::Party;

/// Parse the labeled sub-fields of one party block.
///
/// Every sub-field is looked up independently; anything not found stays
/// empty.
pub fn parse_party_block(block: &str) -> Party {
    let tax_id = PARTY_NPWP
        .captures(block)
        .map(|c| digits_only(&c[1]))
        .unwrap_or_default();

    let name = PARTY_NAME
        .captures(block)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default();

    let address = PARTY_ADDRESS
        .captures(block)
        .map(|c| join_lines(&c[1]))
        .unwrap_or_default();

    let email = PARTY_EMAIL.captures(block).map(|c| c[1].to_string());

    let location_id = PARTY_ID_TKU.captures(block).map(|c| c[1].to_string());

    Party {
        tax_id,
        name,
        address,
        email,
        location_id,
    }
}

fn join_lines(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn block_party(section: &Regex, text: &str) -> Option<Party> {
    let caps = section.captures(text)?;
    let party = parse_party_block(&caps[1]);
    (!party.is_empty()).then_some(party)
}

/// Buyer block between the "Pembeli Barang Kena Pajak / Penerima Jasa Kena
/// Pajak" header and the goods table (or the tax base line).
pub struct BuyerBlockRule;

impl FieldExtractor for BuyerBlockRule {
    type Output = Party;

    fn name(&self) -> &'static str {
        "coretax_buyer_block"
    }

    fn extract(&self, text: &str) -> Option<Party> {
        block_party(&BUYER_SECTION, text)
    }
}

/// Seller block ("Pengusaha Kena Pajak") printed above the buyer block.
pub struct SellerBlockRule;

impl FieldExtractor for SellerBlockRule {
    type Output = Party;

    fn name(&self) -> &'static str {
        "coretax_seller_block"
    }

    fn extract(&self, text: &str) -> Option<Party> {
        block_party(&SELLER_SECTION, text)
    }
}

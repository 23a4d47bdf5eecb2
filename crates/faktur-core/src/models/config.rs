//! Configuration structures for the extraction pipeline.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::FakturError;

/// Main configuration for the faktur pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FakturConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Tax rules and fixed values for the filing document.
    pub filing: TaxRules,

    /// PDF text-layer configuration.
    pub pdf: PdfConfig,

    /// Remote processing log.
    pub event_log: EventLogConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Rule names per field, in priority order. Fields not listed use the
    /// built-in order (see `invoice::registry`).
    pub rule_order: BTreeMap<String, Vec<String>>,

    /// Number of documents processed concurrently (1 = sequential).
    pub jobs: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            rule_order: BTreeMap::new(),
            jobs: 1,
        }
    }
}

/// Rounding applied to derived tax amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Ties go to the even neighbour (0.5 -> 0, 1.5 -> 2).
    #[default]
    HalfEven,
    /// Ties go away from zero (0.5 -> 1).
    HalfUp,
}

/// Jurisdiction-specific constants used when deriving the filing document.
///
/// These rates change over time; none of them is assumed permanent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxRules {
    /// Numerator of the alternate tax base ratio ("DPP Nilai Lain").
    pub other_base_numerator: Decimal,

    /// Denominator of the alternate tax base ratio.
    pub other_base_denominator: Decimal,

    /// Rate applied to the alternate tax base to get the VAT amount.
    pub vat_rate: Decimal,

    /// Value written to the `VATRate` element.
    pub vat_rate_label: Decimal,

    /// Rounding for derived amounts.
    pub rounding: RoundingMode,

    /// Seller TIN written at the document root; taken from the first record
    /// when unset.
    pub seller_tin: Option<String>,

    /// Seller location identifier; the padded seller TIN when unset.
    pub seller_id_tku: Option<String>,

    /// Length TKU identifiers are zero-padded to.
    pub id_tku_length: usize,

    /// Goods/service option code ("A" goods, "B" services).
    pub goods_option: String,

    /// Goods/service classification code.
    pub goods_code: String,

    /// Unit of measure code.
    pub unit_code: String,

    /// Buyer document kind.
    pub buyer_document: String,

    /// Buyer country code.
    pub buyer_country: String,
}

impl Default for TaxRules {
    fn default() -> Self {
        Self {
            other_base_numerator: Decimal::from(11),
            other_base_denominator: Decimal::from(12),
            vat_rate: Decimal::new(12, 2),
            vat_rate_label: Decimal::from(12),
            rounding: RoundingMode::HalfEven,
            seller_tin: None,
            seller_id_tku: None,
            id_tku_length: 22,
            goods_option: "A".to_string(),
            goods_code: "000000".to_string(),
            unit_code: "UM.0018".to_string(),
            buyer_document: "TIN".to_string(),
            buyer_country: "IDN".to_string(),
        }
    }
}

impl TaxRules {
    /// Alternate tax base: `round(base * numerator / denominator)`.
    pub fn other_tax_base(&self, base: Decimal) -> Decimal {
        if self.other_base_denominator.is_zero() {
            return self.round(base);
        }
        self.round(base * self.other_base_numerator / self.other_base_denominator)
    }

    /// VAT on the alternate tax base: `round(other_tax_base * vat_rate)`.
    pub fn vat(&self, other_tax_base: Decimal) -> Decimal {
        self.round(other_tax_base * self.vat_rate)
    }

    fn round(&self, value: Decimal) -> Decimal {
        let strategy = match self.rounding {
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
        };
        value.round_dp_with_strategy(0, strategy)
    }
}

/// PDF text-layer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum text length to consider the text layer usable.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 50 }
    }
}

/// Remote append-only processing log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLogConfig {
    /// Base URL of the REST endpoint; logging is skipped when unset.
    pub url: Option<String>,

    /// API key sent with each request.
    pub api_key: Option<String>,

    /// Table receiving the events.
    pub table: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            table: "extraction_logs".to_string(),
            timeout_secs: 10,
        }
    }
}

impl EventLogConfig {
    /// Fill unset URL and key from `FAKTUR_LOG_URL` / `FAKTUR_LOG_KEY`.
    pub fn with_env_overrides(mut self) -> Self {
        if self.url.is_none() {
            self.url = std::env::var("FAKTUR_LOG_URL").ok().filter(|v| !v.is_empty());
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("FAKTUR_LOG_KEY").ok().filter(|v| !v.is_empty());
        }
        self
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.api_key.is_some()
    }
}

impl FakturConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| FakturError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> crate::Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| FakturError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

//! Named rule chains, one per record field.

use chrono::NaiveDate;
use tracing::{trace, warn};

use super::rules::{
    BuyerBlockRule, FieldExtractor, GoodsTableRule, NamedMonthDateRule, NumericDateRule,
    ReferenceRule, SellerBlockRule, SerialCodeRule, TotalsRule,
};
use crate::models::config::ExtractionConfig;
use crate::models::record::{DocumentCode, DocumentTotals, LineItem, Party};

/// Boxed extraction rule producing `T`.
pub type BoxedRule<T> = Box<dyn FieldExtractor<Output = T>>;

/// Rules for one field, tried in priority order. The first hit wins.
pub struct RuleChain<T> {
    field: &'static str,
    rules: Vec<BoxedRule<T>>,
}

impl<T> RuleChain<T> {
    pub fn new(field: &'static str, rules: Vec<BoxedRule<T>>) -> Self {
        Self { field, rules }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Names of the enabled rules in the order they run.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run the rules in order and return the first value found.
    pub fn extract(&self, text: &str) -> Option<T> {
        self.rules.iter().find_map(|rule| {
            let value = rule.extract(text);
            if value.is_some() {
                trace!("{}: hit by rule {}", self.field, rule.name());
            }
            value
        })
    }

    /// Keep only the named rules, in the given order.
    ///
    /// Unknown names are skipped with a warning. An empty list, or one that
    /// names no known rule, leaves the chain unchanged.
    pub fn reorder(self, order: &[String]) -> Self {
        if order.is_empty() {
            return self;
        }

        let mut available: Vec<Option<BoxedRule<T>>> = self.rules.into_iter().map(Some).collect();
        let mut ordered = Vec::with_capacity(order.len());

        for name in order {
            let position = available
                .iter()
                .position(|slot| matches!(slot, Some(rule) if rule.name() == name.as_str()));
            match position.and_then(|i| available[i].take()) {
                Some(rule) => ordered.push(rule),
                None => warn!("Unknown rule '{}' for field {}, ignoring", name, self.field),
            }
        }

        if ordered.is_empty() {
            warn!("No known rules configured for field {}, using defaults", self.field);
            // Put the defaults back in their original order.
            return Self::new(self.field, available.into_iter().flatten().collect());
        }

        Self::new(self.field, ordered)
    }
}

/// One rule chain per record field.
pub struct ExtractorRegistry {
    pub transaction_date: RuleChain<NaiveDate>,
    pub document_code: RuleChain<DocumentCode>,
    pub reference: RuleChain<String>,
    pub buyer: RuleChain<Party>,
    pub seller: RuleChain<Party>,
    pub line_items: RuleChain<Vec<LineItem>>,
    pub totals: RuleChain<DocumentTotals>,
}

/// Field names accepted as keys of `rule_order`.
pub const FIELDS: [&str; 7] = [
    "transaction_date",
    "document_code",
    "reference",
    "buyer",
    "seller",
    "line_items",
    "totals",
];

impl ExtractorRegistry {
    /// All built-in rules, in their default order.
    ///
    /// `numeric_date` is registered but only runs when configured.
    fn builtin() -> (Self, Vec<BoxedRule<NaiveDate>>) {
        let registry = Self {
            transaction_date: RuleChain::new("transaction_date", vec![Box::new(NamedMonthDateRule)]),
            document_code: RuleChain::new("document_code", vec![Box::new(SerialCodeRule)]),
            reference: RuleChain::new("reference", vec![Box::new(ReferenceRule)]),
            buyer: RuleChain::new("buyer", vec![Box::new(BuyerBlockRule)]),
            seller: RuleChain::new("seller", vec![Box::new(SellerBlockRule)]),
            line_items: RuleChain::new("line_items", vec![Box::new(GoodsTableRule)]),
            totals: RuleChain::new("totals", vec![Box::new(TotalsRule)]),
        };
        (registry, vec![Box::new(NumericDateRule)])
    }

    /// Registry with the default rule order.
    pub fn new() -> Self {
        Self::builtin().0
    }

    /// Registry with rule order taken from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        for field in config.rule_order.keys() {
            if !FIELDS.contains(&field.as_str()) {
                warn!("Unknown field '{}' in rule_order, ignoring", field);
            }
        }

        let (defaults, optional_dates) = Self::builtin();
        let order = |field: &str| config.rule_order.get(field).map(Vec::as_slice).unwrap_or(&[]);

        let date_order = order("transaction_date");
        let transaction_date = if date_order.is_empty() {
            defaults.transaction_date
        } else {
            let mut all = defaults.transaction_date.rules;
            all.extend(optional_dates);
            RuleChain::new("transaction_date", all).reorder(date_order)
        };

        let registry = Self {
            transaction_date,
            document_code: defaults.document_code.reorder(order("document_code")),
            reference: defaults.reference.reorder(order("reference")),
            buyer: defaults.buyer.reorder(order("buyer")),
            seller: defaults.seller.reorder(order("seller")),
            line_items: defaults.line_items.reorder(order("line_items")),
            totals: defaults.totals.reorder(order("totals")),
        };

        trace!("Date rules: {:?}", registry.transaction_date.rule_names());
        registry
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

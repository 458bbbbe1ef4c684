use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for card records in the attribute store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct CardId(pub u64);

/// Reward type with a dedicated cash-percentage display channel.
pub const REWARD_TYPE_CASH: &str = "cash";
/// Reward type with a dedicated cost-per-mile display channel.
pub const REWARD_TYPE_ASIA_MILES: &str = "asia_miles";

/// Localized label shown when a rate exists but yields nothing.
pub const NOT_APPLICABLE: &str = "不適用";

/// Meta key holding the card's points system reference; `0` marks a
/// direct-cash card with no points layer.
pub const META_POINTS_SYSTEM_ID: &str = "points_system_id";
/// Meta key whose non-empty presence is a ranking signal.
pub const META_AFFILIATE_LINK: &str = "affiliate_link";
/// Meta key holding the front-end display name of a card.
pub const META_CARD_NAME: &str = "card_name";

pub fn points_key(txn: &str) -> String {
    format!("{txn}_points")
}

pub fn cash_display_key(txn: &str) -> String {
    format!("{txn}_cash_display")
}

pub fn cash_sortable_key(txn: &str) -> String {
    format!("{txn}_cash_sortable")
}

pub fn miles_display_key(txn: &str) -> String {
    format!("{txn}_miles_display")
}

pub fn miles_sortable_key(txn: &str) -> String {
    format!("{txn}_miles_sortable")
}

/// Display key for a reward type outside the cash/miles channels, e.g.
/// `overseas_retail_marriott_display`.
pub fn secondary_display_key(txn: &str, reward_type: &str) -> String {
    format!("{txn}_{reward_type}_display")
}

/// An operator-defined loyalty program owning a conversion table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsSystem {
    pub id: u64,
    /// Chinese display name.
    pub name: String,
    pub name_en: String,
    pub status: SystemStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    Active,
    Inactive,
}

impl SystemStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SystemStatus::Active => "active",
            SystemStatus::Inactive => "inactive",
        }
    }
}

/// One points-to-reward conversion row under a points system.
///
/// A row only contributes a value-per-point figure when `points_required` is
/// positive; zero or negative means "no rate".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub reward_type: String,
    pub points_required: i64,
    pub reward_value: f64,
    pub reward_currency: String,
    pub effective_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
}

impl Conversion {
    pub fn new(reward_type: impl Into<String>, points_required: i64, reward_value: f64) -> Self {
        Self {
            reward_type: reward_type.into(),
            points_required,
            reward_value,
            reward_currency: "HKD".to_string(),
            effective_date: None,
            expiry_date: None,
        }
    }
}

/// A spending category a card declares a separate earning rate for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionType {
    pub slug: String,
    pub label: String,
}

/// Ordered transaction-type list: the built-in HK spending categories plus
/// operator-defined custom entries appended after them. Injected into the
/// calculator and resolver so nothing reads global state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRegistry {
    types: Vec<TransactionType>,
}

impl TransactionRegistry {
    /// The ten built-in spending categories, in display order.
    pub fn builtin() -> Self {
        let types = [
            ("local_retail", "本地零售簽賬"),
            ("overseas_retail", "海外零售簽賬"),
            ("online_hkd", "網上港幣簽賬"),
            ("online_fx", "網上外幣簽賬"),
            ("local_dining", "本地餐飲簽賬"),
            ("online_bill_payment", "網上繳費"),
            ("payme_reload", "PayMe 增值"),
            ("alipay_reload", "AlipayHK 增值"),
            ("wechat_reload", "WeChat Pay 增值"),
            ("octopus_reload", "八達通增值"),
        ]
        .into_iter()
        .map(|(slug, label)| TransactionType {
            slug: slug.to_string(),
            label: label.to_string(),
        })
        .collect();

        Self { types }
    }

    /// Append an operator-defined spending category.
    pub fn with_custom(mut self, slug: impl Into<String>, label: impl Into<String>) -> Self {
        self.types.push(TransactionType {
            slug: slug.into(),
            label: label.into(),
        });
        self
    }

    pub fn types(&self) -> &[TransactionType] {
        &self.types
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|txn| txn.slug.as_str())
    }

    pub fn label_for(&self, slug: &str) -> Option<&str> {
        self.types
            .iter()
            .find(|txn| txn.slug == slug)
            .map(|txn| txn.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// A flat attribute value as the card store holds it: plain text or a plain
/// number, nothing nested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Number(f64),
    Text(String),
}

impl MetaValue {
    pub fn text(value: impl Into<String>) -> Self {
        MetaValue::Text(value.into())
    }

    pub fn number(value: f64) -> Self {
        MetaValue::Number(value)
    }

    /// Numeric reading used for sorting: numbers pass through, numeric text
    /// parses, everything else is 0. Non-finite values also collapse to 0 so
    /// comparisons stay a total order.
    pub fn numeric(&self) -> f64 {
        let value = match self {
            MetaValue::Number(value) => *value,
            MetaValue::Text(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        };
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetaValue::Text(text) => Some(text.as_str()),
            MetaValue::Number(_) => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Number(value) => write!(f, "{value}"),
            MetaValue::Text(text) => f.write_str(text),
        }
    }
}

/// Which rebate channel the visitor asked to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Cash,
    Miles,
}

impl Default for ViewMode {
    fn default() -> Self {
        ViewMode::Miles
    }
}

impl ViewMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ViewMode::Cash => "cash",
            ViewMode::Miles => "miles",
        }
    }
}

/// In-memory view of one card's attribute store, consumed by the ranking
/// engine and listing builders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardSnapshot {
    pub id: CardId,
    pub meta: BTreeMap<String, MetaValue>,
}

impl CardSnapshot {
    pub fn new(id: CardId) -> Self {
        Self {
            id,
            meta: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: MetaValue) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.meta.get(key)
    }

    /// Sortable reading of an attribute; a missing attribute compares as 0.
    pub fn numeric(&self, key: &str) -> f64 {
        self.meta.get(key).map(MetaValue::numeric).unwrap_or(0.0)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.meta.get(key).and_then(MetaValue::as_text)
    }

    pub fn has_affiliate_link(&self) -> bool {
        self.text(META_AFFILIATE_LINK)
            .map(|link| !link.trim().is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_lists_ten_types_in_order() {
        let registry = TransactionRegistry::builtin();

        assert_eq!(registry.len(), 10);
        assert_eq!(registry.types()[0].slug, "local_retail");
        assert_eq!(registry.types()[9].slug, "octopus_reload");
        assert_eq!(registry.label_for("online_fx"), Some("網上外幣簽賬"));
    }

    #[test]
    fn custom_types_append_after_builtins() {
        let registry = TransactionRegistry::builtin().with_custom("tax_payment", "交稅");

        assert_eq!(registry.len(), 11);
        assert_eq!(registry.types()[10].slug, "tax_payment");
        assert_eq!(registry.label_for("tax_payment"), Some("交稅"));
    }

    #[test]
    fn meta_value_numeric_coerces_text_and_sanitizes() {
        assert_eq!(MetaValue::number(1.5).numeric(), 1.5);
        assert_eq!(MetaValue::text("2.25").numeric(), 2.25);
        assert_eq!(MetaValue::text("不適用").numeric(), 0.0);
        assert_eq!(MetaValue::text("").numeric(), 0.0);
        assert_eq!(MetaValue::number(f64::NAN).numeric(), 0.0);
        assert_eq!(MetaValue::number(f64::INFINITY).numeric(), 0.0);
    }

    #[test]
    fn meta_value_displays_numbers_without_padded_zeros() {
        assert_eq!(MetaValue::number(1.5).to_string(), "1.5");
        assert_eq!(MetaValue::number(2.0).to_string(), "2");
        assert_eq!(MetaValue::text("HK$1 = 3 積分").to_string(), "HK$1 = 3 積分");
    }

    #[test]
    fn affiliate_presence_requires_non_blank_text() {
        let with_link = CardSnapshot::new(CardId(1))
            .with_meta(META_AFFILIATE_LINK, MetaValue::text("https://example.hk/apply"));
        let blank = CardSnapshot::new(CardId(2)).with_meta(META_AFFILIATE_LINK, MetaValue::text("  "));
        let absent = CardSnapshot::new(CardId(3));

        assert!(with_link.has_affiliate_link());
        assert!(!blank.has_affiliate_link());
        assert!(!absent.has_affiliate_link());
    }

    #[test]
    fn meta_key_builders_follow_the_store_naming_scheme() {
        assert_eq!(points_key("local_retail"), "local_retail_points");
        assert_eq!(cash_display_key("local_retail"), "local_retail_cash_display");
        assert_eq!(miles_sortable_key("overseas_retail"), "overseas_retail_miles_sortable");
        assert_eq!(
            secondary_display_key("online_fx", "marriott"),
            "online_fx_marriott_display"
        );
    }
}

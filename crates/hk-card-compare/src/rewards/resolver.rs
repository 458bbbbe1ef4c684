//! Read-path display resolution, with a live fallback for cards whose
//! derived fields have not been persisted yet (e.g. an unsaved preview).

use serde::Serialize;

use super::calculation::formulas;
use super::conversion::ValuePerPointCache;
use super::domain::{
    cash_display_key, miles_display_key, points_key, CardId, TransactionRegistry, ViewMode,
    META_POINTS_SYSTEM_ID,
};
use super::parser::extract_earning_rate;
use super::repository::{CardRepository, PointsSystemRepository, RepositoryError};

/// One resolved reward row for a listing or detail panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardRow {
    pub slug: String,
    pub label: String,
    pub value: String,
}

/// Resolves the best available display value for a card, transaction type,
/// and view. Holds a per-pass value-per-point cache, so create one resolver
/// per render request and drop it with the request.
pub struct DisplayResolver<'a> {
    cards: &'a dyn CardRepository,
    systems: &'a dyn PointsSystemRepository,
    cache: ValuePerPointCache,
}

impl<'a> DisplayResolver<'a> {
    pub fn new(cards: &'a dyn CardRepository, systems: &'a dyn PointsSystemRepository) -> Self {
        Self {
            cards,
            systems,
            cache: ValuePerPointCache::new(),
        }
    }

    /// Resolve the display value for one transaction type.
    ///
    /// Persisted displays win; otherwise the raw earning rule is inspected
    /// and, for points-based cards, converted on the fly with the same
    /// formulas the calculator persists. An empty string means the
    /// transaction type does not apply to this card and the caller should
    /// omit the row entirely.
    pub fn reward_display(
        &mut self,
        card: CardId,
        txn: &str,
        view: ViewMode,
    ) -> Result<String, RepositoryError> {
        let system_id = self.meta_number(card, META_POINTS_SYSTEM_ID)? as i64;

        if view == ViewMode::Miles && system_id > 0 {
            if let Some(display) = self.meta_text(card, &miles_display_key(txn))? {
                return Ok(display);
            }
        }

        if let Some(display) = self.meta_text(card, &cash_display_key(txn))? {
            return Ok(display);
        }

        let Some(raw) = self.meta_text(card, &points_key(txn))? else {
            return Ok(String::new());
        };

        let rate = extract_earning_rate(&raw);
        if rate <= 0.0 {
            return Ok(formulas::not_applicable());
        }

        if system_id > 0 {
            let table = self.cache.table(self.systems, system_id as u64)?;
            let display = match view {
                ViewMode::Cash => {
                    formulas::cash_rebate_percent(rate, table.cash()).map(formulas::cash_display)
                }
                ViewMode::Miles => {
                    formulas::cost_per_unit(rate, table.asia_miles()).map(formulas::miles_display)
                }
            };
            return Ok(display.unwrap_or_else(formulas::not_applicable));
        }

        // Direct-cash card with operator-entered text; show it as-is.
        Ok(raw)
    }

    /// Label/value reward rows for a card, in registry order, omitting
    /// transaction types that resolve to nothing.
    pub fn reward_rows(
        &mut self,
        card: CardId,
        view: ViewMode,
        registry: &TransactionRegistry,
    ) -> Result<Vec<RewardRow>, RepositoryError> {
        let mut rows = Vec::new();
        for txn in registry.types() {
            let value = self.reward_display(card, &txn.slug, view)?;
            if value.is_empty() {
                continue;
            }
            rows.push(RewardRow {
                slug: txn.slug.clone(),
                label: txn.label.clone(),
                value,
            });
        }
        Ok(rows)
    }

    /// Non-empty text of a meta value, if any.
    fn meta_text(&self, card: CardId, key: &str) -> Result<Option<String>, RepositoryError> {
        let value = self.cards.get_meta(card, key)?;
        Ok(value
            .map(|value| value.to_string())
            .filter(|text| !text.is_empty()))
    }

    fn meta_number(&self, card: CardId, key: &str) -> Result<f64, RepositoryError> {
        let value = self.cards.get_meta(card, key)?;
        Ok(value.map(|value| value.numeric()).unwrap_or(0.0))
    }
}

//! Write-through rebate calculation, run synchronously after every card save.

pub(crate) mod formulas;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use super::conversion::ValuePerPoint;
use super::domain::{
    cash_display_key, cash_sortable_key, miles_display_key, miles_sortable_key, points_key,
    secondary_display_key, CardId, MetaValue, TransactionRegistry, META_POINTS_SYSTEM_ID,
};
use super::parser::extract_earning_rate;
use super::repository::{CardRepository, PointsSystemRepository, RepositoryError};

/// Derived fields persisted for one card during a calculation pass, keyed by
/// meta name. Empty when the card has no points layer or its system has no
/// conversion rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComputedRebates {
    pub fields: BTreeMap<String, MetaValue>,
}

impl ComputedRebates {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.fields.get(key)
    }
}

/// Recomputes a card's derived rebate fields from its raw earning-rate
/// strings and the points system's conversion table, writing every derived
/// field back through the card store.
///
/// Recalculating with unchanged inputs rewrites identical values, so the
/// pass is idempotent.
pub struct RebateCalculator<C, P> {
    cards: Arc<C>,
    systems: Arc<P>,
    registry: TransactionRegistry,
}

impl<C, P> RebateCalculator<C, P>
where
    C: CardRepository,
    P: PointsSystemRepository,
{
    pub fn new(cards: Arc<C>, systems: Arc<P>, registry: TransactionRegistry) -> Self {
        Self {
            cards,
            systems,
            registry,
        }
    }

    /// Run the calculation for one card and persist every derived field.
    ///
    /// Direct-cash cards (`points_system_id <= 0`) and systems without
    /// conversion rows are left untouched.
    pub fn recalculate(&self, card: CardId) -> Result<ComputedRebates, RepositoryError> {
        let mut computed = ComputedRebates::default();

        let system_id = self
            .cards
            .get_meta(card, META_POINTS_SYSTEM_ID)?
            .map(|value| value.numeric())
            .unwrap_or(0.0) as i64;
        if system_id <= 0 {
            return Ok(computed);
        }

        let conversions = self.systems.list_conversions(system_id as u64)?;
        if conversions.is_empty() {
            return Ok(computed);
        }
        let table = ValuePerPoint::from_conversions(&conversions);

        for txn in self.registry.slugs() {
            let Some(raw) = self.cards.get_meta(card, &points_key(txn))? else {
                continue;
            };
            let raw = raw.to_string();
            if raw.trim().is_empty() {
                continue;
            }

            let rate = extract_earning_rate(&raw);
            if rate <= 0.0 {
                // A declared rule that earns nothing still shows up as 不適用
                // in both channels and sorts to the bottom of cash listings.
                self.write(card, &mut computed, cash_sortable_key(txn), MetaValue::number(0.0))?;
                self.write(
                    card,
                    &mut computed,
                    cash_display_key(txn),
                    MetaValue::text(formulas::not_applicable()),
                )?;
                self.write(
                    card,
                    &mut computed,
                    miles_display_key(txn),
                    MetaValue::text(formulas::not_applicable()),
                )?;
                continue;
            }

            if let Some(percent) = formulas::cash_rebate_percent(rate, table.cash()) {
                self.write(
                    card,
                    &mut computed,
                    cash_sortable_key(txn),
                    MetaValue::number(percent),
                )?;
                self.write(
                    card,
                    &mut computed,
                    cash_display_key(txn),
                    MetaValue::text(formulas::cash_display(percent)),
                )?;
            }

            if let Some(cost) = formulas::cost_per_unit(rate, table.asia_miles()) {
                self.write(
                    card,
                    &mut computed,
                    miles_display_key(txn),
                    MetaValue::text(formulas::miles_display(cost)),
                )?;
                self.write(
                    card,
                    &mut computed,
                    miles_sortable_key(txn),
                    MetaValue::number(cost),
                )?;
            }

            for (reward_type, vpp) in table.secondary() {
                if let Some(cost) = formulas::cost_per_unit(rate, vpp) {
                    self.write(
                        card,
                        &mut computed,
                        secondary_display_key(txn, reward_type),
                        MetaValue::text(formulas::points_display(cost)),
                    )?;
                }
            }
        }

        Ok(computed)
    }

    fn write(
        &self,
        card: CardId,
        computed: &mut ComputedRebates,
        key: String,
        value: MetaValue,
    ) -> Result<(), RepositoryError> {
        self.cards.set_meta(card, &key, value.clone())?;
        computed.fields.insert(key, value);
        Ok(())
    }
}

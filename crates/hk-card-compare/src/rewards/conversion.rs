//! Value-per-point resolution for a points system's conversion table.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use super::domain::{Conversion, REWARD_TYPE_ASIA_MILES, REWARD_TYPE_CASH};
use super::repository::{PointsSystemRepository, RepositoryError};

/// Derived `reward_type -> value per point` lookup for one points system.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValuePerPoint {
    values: BTreeMap<String, f64>,
}

impl ValuePerPoint {
    /// Build the lookup from conversion rows. Rows requiring zero or negative
    /// points contribute nothing; a duplicated reward_type keeps the last
    /// row's rate.
    pub fn from_conversions(conversions: &[Conversion]) -> Self {
        let mut values = BTreeMap::new();
        for conversion in conversions {
            if conversion.points_required > 0 {
                values.insert(
                    conversion.reward_type.clone(),
                    conversion.reward_value / conversion.points_required as f64,
                );
            }
        }
        Self { values }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, reward_type: &str) -> Option<f64> {
        self.values.get(reward_type).copied()
    }

    /// HKD per point, or 0 when the system has no cash conversion.
    pub fn cash(&self) -> f64 {
        self.get(REWARD_TYPE_CASH).unwrap_or(0.0)
    }

    /// Miles per point, or 0 when the system has no Asia Miles conversion.
    pub fn asia_miles(&self) -> f64 {
        self.get(REWARD_TYPE_ASIA_MILES).unwrap_or(0.0)
    }

    /// Reward types outside the cash and miles display channels (hotel and
    /// airline programs), with their value per point.
    pub fn secondary(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values
            .iter()
            .filter(|(reward_type, _)| {
                reward_type.as_str() != REWARD_TYPE_CASH
                    && reward_type.as_str() != REWARD_TYPE_ASIA_MILES
            })
            .map(|(reward_type, value)| (reward_type.as_str(), *value))
    }
}

/// Per-render-pass cache of value-per-point tables keyed by system id.
///
/// Built fresh for every request; it must never outlive one, so conversion
/// edits are picked up by the next pass without any invalidation protocol.
#[derive(Debug, Default)]
pub struct ValuePerPointCache {
    tables: HashMap<u64, ValuePerPoint>,
}

impl ValuePerPointCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table for a system, built through the repository on first use
    /// within this pass.
    pub fn table(
        &mut self,
        repository: &dyn PointsSystemRepository,
        system_id: u64,
    ) -> Result<&ValuePerPoint, RepositoryError> {
        match self.tables.entry(system_id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let conversions = repository.list_conversions(system_id)?;
                Ok(entry.insert(ValuePerPoint::from_conversions(&conversions)))
            }
        }
    }
}

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use hk_card_compare::rewards::{
    CardId, CardRepository, CardSnapshot, Conversion, MetaValue, PointsSystem,
    PointsSystemRepository, RepositoryError, SystemStatus,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Flat key/value card attribute store backing the comparison service.
#[derive(Default)]
pub(crate) struct InMemoryCardStore {
    cards: Mutex<BTreeMap<CardId, BTreeMap<String, MetaValue>>>,
}

impl InMemoryCardStore {
    pub(crate) fn upsert(
        &self,
        card: CardId,
        entries: impl IntoIterator<Item = (String, MetaValue)>,
    ) {
        let mut guard = self.cards.lock().expect("card store mutex poisoned");
        let meta = guard.entry(card).or_default();
        for (key, value) in entries {
            meta.insert(key, value);
        }
    }
}

impl CardRepository for InMemoryCardStore {
    fn get_meta(&self, card: CardId, key: &str) -> Result<Option<MetaValue>, RepositoryError> {
        let guard = self.cards.lock().expect("card store mutex poisoned");
        Ok(guard.get(&card).and_then(|meta| meta.get(key).cloned()))
    }

    fn set_meta(
        &self,
        card: CardId,
        key: &str,
        value: MetaValue,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.cards.lock().expect("card store mutex poisoned");
        guard.entry(card).or_default().insert(key.to_string(), value);
        Ok(())
    }

    fn snapshots(&self) -> Result<Vec<CardSnapshot>, RepositoryError> {
        let guard = self.cards.lock().expect("card store mutex poisoned");
        Ok(guard
            .iter()
            .map(|(id, meta)| CardSnapshot {
                id: *id,
                meta: meta.clone(),
            })
            .collect())
    }
}

/// Points-system store with the authoring operations the admin routes need:
/// conversions are replaced wholesale on save, and deleting a system takes
/// its conversion rows with it.
pub(crate) struct InMemoryPointsSystemStore {
    next_id: AtomicU64,
    systems: Mutex<BTreeMap<u64, PointsSystem>>,
    conversions: Mutex<BTreeMap<u64, Vec<Conversion>>>,
}

impl Default for InMemoryPointsSystemStore {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            systems: Mutex::new(BTreeMap::new()),
            conversions: Mutex::new(BTreeMap::new()),
        }
    }
}

impl InMemoryPointsSystemStore {
    pub(crate) fn create_system(&self, name: String, name_en: String) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut guard = self.systems.lock().expect("system store mutex poisoned");
        guard.insert(
            id,
            PointsSystem {
                id,
                name,
                name_en,
                status: SystemStatus::Active,
            },
        );
        id
    }

    pub(crate) fn update_system(
        &self,
        id: u64,
        name: String,
        name_en: String,
        status: SystemStatus,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.systems.lock().expect("system store mutex poisoned");
        let system = guard.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        system.name = name;
        system.name_en = name_en;
        system.status = status;
        Ok(())
    }

    pub(crate) fn replace_conversions(
        &self,
        system_id: u64,
        rows: Vec<Conversion>,
    ) -> Result<(), RepositoryError> {
        {
            let systems = self.systems.lock().expect("system store mutex poisoned");
            if !systems.contains_key(&system_id) {
                return Err(RepositoryError::NotFound);
            }
        }
        let mut guard = self
            .conversions
            .lock()
            .expect("conversion store mutex poisoned");
        guard.insert(system_id, rows);
        Ok(())
    }

    pub(crate) fn delete_system(&self, id: u64) -> Result<(), RepositoryError> {
        let mut systems = self.systems.lock().expect("system store mutex poisoned");
        systems.remove(&id).ok_or(RepositoryError::NotFound)?;
        let mut conversions = self
            .conversions
            .lock()
            .expect("conversion store mutex poisoned");
        conversions.remove(&id);
        Ok(())
    }
}

impl PointsSystemRepository for InMemoryPointsSystemStore {
    fn get_system(&self, id: u64) -> Result<Option<PointsSystem>, RepositoryError> {
        let guard = self.systems.lock().expect("system store mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn list_conversions(&self, system_id: u64) -> Result<Vec<Conversion>, RepositoryError> {
        let guard = self
            .conversions
            .lock()
            .expect("conversion store mutex poisoned");
        Ok(guard.get(&system_id).cloned().unwrap_or_default())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

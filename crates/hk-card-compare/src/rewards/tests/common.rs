use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::rewards::domain::{
    points_key, CardId, CardSnapshot, Conversion, MetaValue, PointsSystem, SystemStatus,
    TransactionRegistry, META_AFFILIATE_LINK, META_CARD_NAME, META_POINTS_SYSTEM_ID,
};
use crate::rewards::repository::{CardRepository, PointsSystemRepository, RepositoryError};
use crate::rewards::service::RewardsService;

#[derive(Default)]
pub(super) struct MemoryCardStore {
    cards: Mutex<BTreeMap<CardId, BTreeMap<String, MetaValue>>>,
}

impl MemoryCardStore {
    pub(super) fn seed(&self, card: CardId, entries: Vec<(String, MetaValue)>) {
        let mut guard = self.cards.lock().expect("card store mutex poisoned");
        let meta = guard.entry(card).or_default();
        for (key, value) in entries {
            meta.insert(key, value);
        }
    }

    pub(super) fn meta(&self, card: CardId, key: &str) -> Option<MetaValue> {
        let guard = self.cards.lock().expect("card store mutex poisoned");
        guard.get(&card).and_then(|meta| meta.get(key).cloned())
    }

    pub(super) fn full_meta(&self, card: CardId) -> BTreeMap<String, MetaValue> {
        let guard = self.cards.lock().expect("card store mutex poisoned");
        guard.get(&card).cloned().unwrap_or_default()
    }
}

impl CardRepository for MemoryCardStore {
    fn get_meta(&self, card: CardId, key: &str) -> Result<Option<MetaValue>, RepositoryError> {
        Ok(self.meta(card, key))
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

#[derive(Default)]
pub(super) struct MemoryPointsStore {
    systems: Mutex<BTreeMap<u64, PointsSystem>>,
    conversions: Mutex<BTreeMap<u64, Vec<Conversion>>>,
    conversion_reads: AtomicUsize,
}

impl MemoryPointsStore {
    pub(super) fn put_system(&self, system: PointsSystem) {
        let mut guard = self.systems.lock().expect("system store mutex poisoned");
        guard.insert(system.id, system);
    }

    pub(super) fn put_conversions(&self, system_id: u64, rows: Vec<Conversion>) {
        let mut guard = self.conversions.lock().expect("conversion store mutex poisoned");
        guard.insert(system_id, rows);
    }

    pub(super) fn conversion_reads(&self) -> usize {
        self.conversion_reads.load(Ordering::Relaxed)
    }
}

impl PointsSystemRepository for MemoryPointsStore {
    fn get_system(&self, id: u64) -> Result<Option<PointsSystem>, RepositoryError> {
        let guard = self.systems.lock().expect("system store mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn list_conversions(&self, system_id: u64) -> Result<Vec<Conversion>, RepositoryError> {
        self.conversion_reads.fetch_add(1, Ordering::Relaxed);
        let guard = self.conversions.lock().expect("conversion store mutex poisoned");
        Ok(guard.get(&system_id).cloned().unwrap_or_default())
    }
}

pub(super) struct TestContext {
    pub(super) cards: Arc<MemoryCardStore>,
    pub(super) systems: Arc<MemoryPointsStore>,
    pub(super) service: Arc<RewardsService<MemoryCardStore, MemoryPointsStore>>,
}

pub(super) fn context() -> TestContext {
    context_with_registry(TransactionRegistry::builtin())
}

pub(super) fn context_with_registry(registry: TransactionRegistry) -> TestContext {
    let cards = Arc::new(MemoryCardStore::default());
    let systems = Arc::new(MemoryPointsStore::default());
    let service = Arc::new(RewardsService::new(
        Arc::clone(&cards),
        Arc::clone(&systems),
        registry,
    ));
    TestContext {
        cards,
        systems,
        service,
    }
}

pub(super) fn reward_cash_system(id: u64) -> PointsSystem {
    PointsSystem {
        id,
        name: "獎賞錢".to_string(),
        name_en: "RewardCash".to_string(),
        status: SystemStatus::Active,
    }
}

/// 2000 pts = HK$10 cash, 2000 pts = 1.6 Asia Miles, 2000 pts = 800 Marriott
/// points — the worked example used across the calculation specs.
pub(super) fn standard_conversions() -> Vec<Conversion> {
    vec![
        Conversion::new("cash", 2000, 10.0),
        Conversion::new("asia_miles", 2000, 1.6),
        Conversion::new("marriott", 2000, 800.0),
    ]
}

pub(super) fn seed_standard_system(ctx: &TestContext, system_id: u64) {
    ctx.systems.put_system(reward_cash_system(system_id));
    ctx.systems.put_conversions(system_id, standard_conversions());
}

/// A points-based card earning 3 pts/$ locally and 6 pts/$ overseas.
pub(super) fn seed_points_card(ctx: &TestContext, card: CardId, system_id: u64) {
    ctx.cards.seed(
        card,
        vec![
            (META_CARD_NAME.to_string(), MetaValue::text("星河白金卡")),
            (
                META_POINTS_SYSTEM_ID.to_string(),
                MetaValue::number(system_id as f64),
            ),
            (
                META_AFFILIATE_LINK.to_string(),
                MetaValue::text("https://example.hk/apply/starriver"),
            ),
            (
                points_key("local_retail"),
                MetaValue::text("HK$1 = 3 積分"),
            ),
            (
                points_key("overseas_retail"),
                MetaValue::text("HK$1 = 6 積分"),
            ),
        ],
    );
}

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{MealKind, NutritionRecord, NutritionTotals};

/// Result of a conditional ledger write.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOutcome<T> {
    Applied(T),
    /// The precondition of the write did not hold (entry not pending,
    /// plan already set, barcode already queued).
    Rejected,
    NoLedger,
}

/// Keyed store of nutrition ledgers.
///
/// Every method is a single atomic step per ledger. `consume` removes the
/// entry and applies the clamped delta together, so concurrent eats for the
/// same user never lose an update.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn create(&self, user_id: Uuid) -> anyhow::Result<()>;
    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<NutritionRecord>>;
    async fn set_calorie_goal(&self, user_id: Uuid, goal: i32) -> anyhow::Result<StoreOutcome<()>>;
    async fn add_scanned(&self, user_id: Uuid, barcode: &str) -> anyhow::Result<StoreOutcome<()>>;
    /// Writes the recipe list only while it is empty.
    async fn assign_plan(&self, user_id: Uuid, recipe_ids: &[String]) -> anyhow::Result<StoreOutcome<()>>;
    async fn remove_pending(
        &self,
        user_id: Uuid,
        kind: MealKind,
        id: &str,
    ) -> anyhow::Result<StoreOutcome<()>>;
    /// Drops a pending entry and adds `delta` to the totals, returning the new totals.
    async fn consume(
        &self,
        user_id: Uuid,
        kind: MealKind,
        id: &str,
        delta: &NutritionTotals,
    ) -> anyhow::Result<StoreOutcome<NutritionTotals>>;
    async fn user_ids(&self) -> anyhow::Result<Vec<Uuid>>;
    /// Overwrites totals of the given ledgers with zero. Returns rows touched.
    async fn reset_totals(&self, user_ids: &[Uuid]) -> anyhow::Result<u64>;
}

/// Process-local ledger store used by tests and `AppState::fake`.
#[derive(Default)]
pub struct MemoryLedgerStore {
    records: RwLock<BTreeMap<Uuid, NutritionRecord>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: NutritionRecord) {
        self.records.write().await.insert(record.user_id, record);
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn create(&self, user_id: Uuid) -> anyhow::Result<()> {
        self.records
            .write()
            .await
            .entry(user_id)
            .or_insert_with(|| NutritionRecord::empty(user_id));
        Ok(())
    }

    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<NutritionRecord>> {
        Ok(self.records.read().await.get(&user_id).cloned())
    }

    async fn set_calorie_goal(&self, user_id: Uuid, goal: i32) -> anyhow::Result<StoreOutcome<()>> {
        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(&user_id) else {
            return Ok(StoreOutcome::NoLedger);
        };
        record.calorie_goal = goal;
        Ok(StoreOutcome::Applied(()))
    }

    async fn add_scanned(&self, user_id: Uuid, barcode: &str) -> anyhow::Result<StoreOutcome<()>> {
        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(&user_id) else {
            return Ok(StoreOutcome::NoLedger);
        };
        if record.is_pending(MealKind::Scanned, barcode) {
            return Ok(StoreOutcome::Rejected);
        }
        record.scanned_meals.push(barcode.to_string());
        Ok(StoreOutcome::Applied(()))
    }

    async fn assign_plan(&self, user_id: Uuid, recipe_ids: &[String]) -> anyhow::Result<StoreOutcome<()>> {
        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(&user_id) else {
            return Ok(StoreOutcome::NoLedger);
        };
        if !record.meals.is_empty() {
            return Ok(StoreOutcome::Rejected);
        }
        record.meals = recipe_ids.to_vec();
        Ok(StoreOutcome::Applied(()))
    }

    async fn remove_pending(
        &self,
        user_id: Uuid,
        kind: MealKind,
        id: &str,
    ) -> anyhow::Result<StoreOutcome<()>> {
        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(&user_id) else {
            return Ok(StoreOutcome::NoLedger);
        };
        if !record.is_pending(kind, id) {
            return Ok(StoreOutcome::Rejected);
        }
        record.pending_mut(kind).retain(|p| p != id);
        Ok(StoreOutcome::Applied(()))
    }

    async fn consume(
        &self,
        user_id: Uuid,
        kind: MealKind,
        id: &str,
        delta: &NutritionTotals,
    ) -> anyhow::Result<StoreOutcome<NutritionTotals>> {
        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(&user_id) else {
            return Ok(StoreOutcome::NoLedger);
        };
        if !record.is_pending(kind, id) {
            return Ok(StoreOutcome::Rejected);
        }
        record.pending_mut(kind).retain(|p| p != id);
        record.totals = record.totals.saturating_add(delta);
        Ok(StoreOutcome::Applied(record.totals))
    }

    async fn user_ids(&self) -> anyhow::Result<Vec<Uuid>> {
        Ok(self.records.read().await.keys().copied().collect())
    }

    async fn reset_totals(&self, user_ids: &[Uuid]) -> anyhow::Result<u64> {
        let mut records = self.records.write().await;
        let mut touched = 0;
        for id in user_ids {
            if let Some(record) = records.get_mut(id) {
                record.totals = NutritionTotals::ZERO;
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn delta(protein: f64, carbs: f64, fats: f64, calories: f64) -> NutritionTotals {
        NutritionTotals {
            protein,
            carbs,
            fats,
            calories,
        }
    }

    #[tokio::test]
    async fn writes_to_missing_ledger_report_no_ledger() {
        let store = MemoryLedgerStore::new();
        let user = Uuid::new_v4();
        assert_eq!(store.set_calorie_goal(user, 1800).await.unwrap(), StoreOutcome::NoLedger);
        assert_eq!(store.add_scanned(user, "123").await.unwrap(), StoreOutcome::NoLedger);
        assert_eq!(
            store.consume(user, MealKind::Recipe, "1", &delta(1.0, 1.0, 1.0, 1.0)).await.unwrap(),
            StoreOutcome::NoLedger
        );
        assert!(store.get(user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_does_not_overwrite_existing_ledger() {
        let store = MemoryLedgerStore::new();
        let user = Uuid::new_v4();
        store.create(user).await.unwrap();
        store.set_calorie_goal(user, 2100).await.unwrap();
        store.create(user).await.unwrap();
        assert_eq!(store.get(user).await.unwrap().unwrap().calorie_goal, 2100);
    }

    #[tokio::test]
    async fn scanned_barcodes_behave_as_a_set() {
        let store = MemoryLedgerStore::new();
        let user = Uuid::new_v4();
        store.create(user).await.unwrap();
        assert_eq!(store.add_scanned(user, "0001").await.unwrap(), StoreOutcome::Applied(()));
        assert_eq!(store.add_scanned(user, "0001").await.unwrap(), StoreOutcome::Rejected);
        assert_eq!(store.add_scanned(user, "0002").await.unwrap(), StoreOutcome::Applied(()));
        let record = store.get(user).await.unwrap().unwrap();
        assert_eq!(record.scanned_meals, vec!["0001", "0002"]);
    }

    #[tokio::test]
    async fn plan_is_only_assigned_once() {
        let store = MemoryLedgerStore::new();
        let user = Uuid::new_v4();
        store.create(user).await.unwrap();
        let ids = vec!["11".to_string(), "12".to_string()];
        assert_eq!(store.assign_plan(user, &ids).await.unwrap(), StoreOutcome::Applied(()));
        assert_eq!(
            store.assign_plan(user, &["99".to_string()]).await.unwrap(),
            StoreOutcome::Rejected
        );
        assert_eq!(store.get(user).await.unwrap().unwrap().meals, ids);
    }

    #[tokio::test]
    async fn concurrent_consumes_lose_no_delta() {
        let store = Arc::new(MemoryLedgerStore::new());
        let user = Uuid::new_v4();
        let mut record = NutritionRecord::empty(user);
        record.scanned_meals = (0..50).map(|i| format!("bc-{i}")).collect();
        store.insert(record).await;

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..50 {
            let store = store.clone();
            tasks.spawn(async move {
                store
                    .consume(user, MealKind::Scanned, &format!("bc-{i}"), &delta(1.0, 2.0, 0.5, 10.0))
                    .await
                    .unwrap()
            });
        }
        while let Some(res) = tasks.join_next().await {
            assert!(matches!(res.unwrap(), StoreOutcome::Applied(_)));
        }

        let record = store.get(user).await.unwrap().unwrap();
        assert_eq!(record.totals, delta(50.0, 100.0, 25.0, 500.0));
        assert!(record.scanned_meals.is_empty());
    }

    #[tokio::test]
    async fn reset_ignores_unknown_ids() {
        let store = MemoryLedgerStore::new();
        let user = Uuid::new_v4();
        store.create(user).await.unwrap();
        let touched = store.reset_totals(&[user, Uuid::new_v4()]).await.unwrap();
        assert_eq!(touched, 1);
    }
}

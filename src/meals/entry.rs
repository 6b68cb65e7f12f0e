use serde::Serialize;
use uuid::Uuid;

use crate::catalog::dto::MealFacts;
use crate::catalog::FoodCatalog;
use crate::ledger::error::LedgerError;
use crate::ledger::model::{MealKind, NutritionRecord, NutritionTotals};
use crate::ledger::services;
use crate::ledger::store::LedgerStore;

/// State label carried by entries on the wire. The pending state has no
/// label of its own: it is the `PendingMeal` type, which never leaves the
/// server. `Eaten` and `Removed` only appear on a `MealOutcome`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MealState {
    Hydrated,
    Eaten,
    Removed,
}

/// An id sitting in one of the ledger's pending lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMeal {
    pub kind: MealKind,
    pub id: String,
}

impl PendingMeal {
    pub fn new(kind: MealKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    /// Recipe entries first, then scanned ones, each in list order.
    pub fn all_from(record: &NutritionRecord) -> Vec<PendingMeal> {
        record
            .meals
            .iter()
            .map(|id| PendingMeal::new(MealKind::Recipe, id.as_str()))
            .chain(
                record
                    .scanned_meals
                    .iter()
                    .map(|id| PendingMeal::new(MealKind::Scanned, id.as_str())),
            )
            .collect()
    }

    pub fn hydrate(self, facts: MealFacts) -> MealEntry {
        MealEntry {
            kind: self.kind,
            id: self.id,
            state: MealState::Hydrated,
            facts,
        }
    }

    /// Looks the entry up in the catalog. `Ok(None)` when nothing matches.
    pub async fn fetch(self, catalog: &dyn FoodCatalog) -> anyhow::Result<Option<MealEntry>> {
        let facts = catalog.facts(self.kind, &self.id).await?;
        Ok(facts.map(|f| self.hydrate(f)))
    }

    /// Drops the entry without touching the totals. Removing does not need
    /// the entry's facts, so it is allowed straight from `Pending`.
    pub async fn remove(self, store: &dyn LedgerStore, user_id: Uuid) -> Result<MealOutcome, LedgerError> {
        services::remove_entry(store, user_id, self.kind, &self.id).await?;
        Ok(MealOutcome {
            kind: self.kind,
            id: self.id,
            state: MealState::Removed,
            totals: None,
        })
    }
}

/// A pending entry with its nutrition facts attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealEntry {
    pub kind: MealKind,
    pub id: String,
    pub state: MealState,
    #[serde(flatten)]
    pub facts: MealFacts,
}

impl MealEntry {
    pub async fn eat(self, store: &dyn LedgerStore, user_id: Uuid) -> Result<MealOutcome, LedgerError> {
        let totals = services::apply_eaten(store, user_id, self.kind, &self.id, &self.facts.totals()).await?;
        Ok(MealOutcome {
            kind: self.kind,
            id: self.id,
            state: MealState::Eaten,
            totals: Some(totals),
        })
    }

    pub async fn remove(self, store: &dyn LedgerStore, user_id: Uuid) -> Result<MealOutcome, LedgerError> {
        PendingMeal::new(self.kind, self.id).remove(store, user_id).await
    }
}

/// Terminal result of an eat or remove action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealOutcome {
    pub kind: MealKind,
    pub id: String,
    pub state: MealState,
    /// Ledger totals after an eat; absent for removals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<NutritionTotals>,
}

use serde::Serialize;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::error::LedgerError;
use super::model::{MealKind, NutritionRecord, NutritionTotals};
use super::store::{LedgerStore, StoreOutcome};

/// Summary of one reset run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetReport {
    pub total: usize,
    pub reset: u64,
    pub shards: usize,
}

fn applied<T>(
    outcome: StoreOutcome<T>,
    rejected: impl FnOnce() -> LedgerError,
) -> Result<T, LedgerError> {
    match outcome {
        StoreOutcome::Applied(v) => Ok(v),
        StoreOutcome::Rejected => Err(rejected()),
        StoreOutcome::NoLedger => Err(LedgerError::NotFound),
    }
}

/// Creates the user's ledger if it is missing. Safe to repeat; an existing
/// ledger is left as it is.
pub async fn ensure_ledger(store: &dyn LedgerStore, user_id: Uuid) -> Result<(), LedgerError> {
    store.create(user_id).await?;
    Ok(())
}

pub async fn get_ledger(store: &dyn LedgerStore, user_id: Uuid) -> Result<NutritionRecord, LedgerError> {
    store.get(user_id).await?.ok_or(LedgerError::NotFound)
}

pub async fn set_calorie_goal(
    store: &dyn LedgerStore,
    user_id: Uuid,
    goal: i64,
) -> Result<i32, LedgerError> {
    let goal = i32::try_from(goal)
        .ok()
        .filter(|g| *g > 0)
        .ok_or(LedgerError::InvalidGoal)?;
    applied(store.set_calorie_goal(user_id, goal).await?, || LedgerError::NotFound)?;
    info!(%user_id, goal, "calorie goal set");
    Ok(goal)
}

pub async fn add_scanned(store: &dyn LedgerStore, user_id: Uuid, barcode: &str) -> Result<(), LedgerError> {
    let barcode = barcode.trim();
    if !MealKind::Scanned.is_valid_id(barcode) {
        return Err(LedgerError::InvalidBarcode);
    }
    applied(store.add_scanned(user_id, barcode).await?, || LedgerError::AlreadyScanned)?;
    info!(%user_id, barcode, "scanned item added");
    Ok(())
}

pub async fn assign_plan(
    store: &dyn LedgerStore,
    user_id: Uuid,
    recipe_ids: &[String],
) -> Result<(), LedgerError> {
    if recipe_ids.is_empty() {
        return Err(LedgerError::EmptyPlan);
    }
    if !recipe_ids.iter().all(|id| MealKind::Recipe.is_valid_id(id)) {
        return Err(LedgerError::InvalidRecipeId);
    }
    applied(store.assign_plan(user_id, recipe_ids).await?, || LedgerError::PlanAlreadySet)?;
    info!(%user_id, meals = recipe_ids.len(), "meal plan assigned");
    Ok(())
}

/// Adds a consumed entry's facts to the ledger and drops the entry from its
/// pending list in one step. Every field is clamped at zero.
pub async fn apply_eaten(
    store: &dyn LedgerStore,
    user_id: Uuid,
    kind: MealKind,
    id: &str,
    delta: &NutritionTotals,
) -> Result<NutritionTotals, LedgerError> {
    let totals = applied(store.consume(user_id, kind, id, delta).await?, || {
        LedgerError::NotPending {
            kind,
            id: id.to_string(),
        }
    })?;
    debug!(%user_id, %kind, id, ?totals, "meal eaten");
    Ok(totals)
}

/// Drops a pending entry without touching the totals.
pub async fn remove_entry(
    store: &dyn LedgerStore,
    user_id: Uuid,
    kind: MealKind,
    id: &str,
) -> Result<(), LedgerError> {
    applied(store.remove_pending(user_id, kind, id).await?, || {
        LedgerError::NotPending {
            kind,
            id: id.to_string(),
        }
    })?;
    debug!(%user_id, %kind, id, "meal removed");
    Ok(())
}

/// Zeroes the totals of every ledger, `batch_size` ledgers per write.
///
/// Shards commit in order. A failing shard stops the run; shards already
/// committed stay committed. Goals and pending lists are never touched.
pub async fn reset_all(store: &dyn LedgerStore, batch_size: usize) -> Result<ResetReport, LedgerError> {
    let ids = store.user_ids().await?;
    if ids.is_empty() {
        info!("no ledgers to reset");
        return Ok(ResetReport {
            total: 0,
            reset: 0,
            shards: 0,
        });
    }

    let total = ids.len();
    let mut committed = 0u64;
    let mut shards = 0usize;
    for (index, shard) in ids.chunks(batch_size.max(1)).enumerate() {
        match store.reset_totals(shard).await {
            Ok(n) => {
                committed += n;
                shards += 1;
                debug!(shard = index, size = shard.len(), "reset shard committed");
            }
            Err(e) => {
                error!(error = %e, shard = index, committed, total, "reset shard failed");
                return Err(LedgerError::ResetShard {
                    committed,
                    total,
                    cause: e,
                });
            }
        }
    }

    info!(total, reset = committed, shards, "ledgers reset");
    Ok(ResetReport {
        total,
        reset: committed,
        shards,
    })
}

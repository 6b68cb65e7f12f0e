use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::warn;

use super::entry::{MealEntry, PendingMeal};
use crate::catalog::FoodCatalog;

/// Fetches facts for every pending entry concurrently.
///
/// Entries whose lookup fails or finds nothing are left out of the result;
/// their ids stay pending in the ledger. The output keeps input order.
/// Dropping the returned future aborts lookups still in flight.
pub async fn hydrate_all(catalog: Arc<dyn FoodCatalog>, pending: Vec<PendingMeal>) -> Vec<MealEntry> {
    let mut tasks = JoinSet::new();
    for (index, meal) in pending.into_iter().enumerate() {
        let catalog = catalog.clone();
        tasks.spawn(async move {
            let kind = meal.kind;
            let id = meal.id.clone();
            (index, kind, id, meal.fetch(catalog.as_ref()).await)
        });
    }

    let mut hydrated = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, _, _, Ok(Some(entry)))) => hydrated.push((index, entry)),
            Ok((_, kind, id, Ok(None))) => {
                warn!(%kind, %id, "no catalog match; entry hidden");
            }
            Ok((_, kind, id, Err(e))) => {
                warn!(error = %e, %kind, %id, "hydration failed; entry hidden");
            }
            Err(e) => {
                warn!(error = %e, "hydration task aborted");
            }
        }
    }

    hydrated.sort_by_key(|(index, _)| *index);
    hydrated.into_iter().map(|(_, entry)| entry).collect()
}

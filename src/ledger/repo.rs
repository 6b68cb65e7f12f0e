use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::model::{MealKind, NutritionRecord, NutritionTotals};
use super::repo_types::{LedgerRow, TotalsRow};
use super::store::{LedgerStore, StoreOutcome};

/// `nutrition_ledgers` backed by Postgres.
#[derive(Clone)]
pub struct PgLedgerStore {
    db: PgPool,
}

impl PgLedgerStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Tells a failed precondition apart from a missing ledger after an
    /// update touched no rows.
    async fn outcome_for_miss<T>(&self, user_id: Uuid) -> anyhow::Result<StoreOutcome<T>> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM nutrition_ledgers WHERE user_id = $1)"#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        .context("check ledger exists")?;
        Ok(if exists {
            StoreOutcome::Rejected
        } else {
            StoreOutcome::NoLedger
        })
    }
}

fn remove_sql(kind: MealKind) -> &'static str {
    match kind {
        MealKind::Recipe => {
            r#"
            UPDATE nutrition_ledgers
               SET meals = array_remove(meals, $2), updated_at = now()
             WHERE user_id = $1 AND $2 = ANY(meals)
            "#
        }
        MealKind::Scanned => {
            r#"
            UPDATE nutrition_ledgers
               SET scanned_meals = array_remove(scanned_meals, $2), updated_at = now()
             WHERE user_id = $1 AND $2 = ANY(scanned_meals)
            "#
        }
    }
}

fn consume_sql(kind: MealKind) -> &'static str {
    match kind {
        MealKind::Recipe => {
            r#"
            UPDATE nutrition_ledgers
               SET meals = array_remove(meals, $2),
                   protein = GREATEST(0, protein + $3),
                   carbs = GREATEST(0, carbs + $4),
                   fats = GREATEST(0, fats + $5),
                   current_calorie = GREATEST(0, current_calorie + $6),
                   updated_at = now()
             WHERE user_id = $1 AND $2 = ANY(meals)
         RETURNING current_calorie, protein, carbs, fats
            "#
        }
        MealKind::Scanned => {
            r#"
            UPDATE nutrition_ledgers
               SET scanned_meals = array_remove(scanned_meals, $2),
                   protein = GREATEST(0, protein + $3),
                   carbs = GREATEST(0, carbs + $4),
                   fats = GREATEST(0, fats + $5),
                   current_calorie = GREATEST(0, current_calorie + $6),
                   updated_at = now()
             WHERE user_id = $1 AND $2 = ANY(scanned_meals)
         RETURNING current_calorie, protein, carbs, fats
            "#
        }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn create(&self, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO nutrition_ledgers (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&self.db)
        .await
        .context("insert ledger")?;
        Ok(())
    }

    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<NutritionRecord>> {
        let row = sqlx::query_as::<_, LedgerRow>(
            r#"
            SELECT user_id, calorie_goal, current_calorie, protein, carbs, fats,
                   meals, scanned_meals
              FROM nutrition_ledgers
             WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("select ledger")?;
        Ok(row.map(NutritionRecord::from))
    }

    async fn set_calorie_goal(&self, user_id: Uuid, goal: i32) -> anyhow::Result<StoreOutcome<()>> {
        let res = sqlx::query(
            r#"
            UPDATE nutrition_ledgers
               SET calorie_goal = $2, updated_at = now()
             WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(goal)
        .execute(&self.db)
        .await
        .context("update calorie goal")?;
        if res.rows_affected() == 0 {
            return Ok(StoreOutcome::NoLedger);
        }
        Ok(StoreOutcome::Applied(()))
    }

    async fn add_scanned(&self, user_id: Uuid, barcode: &str) -> anyhow::Result<StoreOutcome<()>> {
        let res = sqlx::query(
            r#"
            UPDATE nutrition_ledgers
               SET scanned_meals = array_append(scanned_meals, $2), updated_at = now()
             WHERE user_id = $1 AND NOT ($2 = ANY(scanned_meals))
            "#,
        )
        .bind(user_id)
        .bind(barcode)
        .execute(&self.db)
        .await
        .context("append scanned meal")?;
        if res.rows_affected() == 0 {
            return self.outcome_for_miss(user_id).await;
        }
        Ok(StoreOutcome::Applied(()))
    }

    async fn assign_plan(&self, user_id: Uuid, recipe_ids: &[String]) -> anyhow::Result<StoreOutcome<()>> {
        let res = sqlx::query(
            r#"
            UPDATE nutrition_ledgers
               SET meals = $2, updated_at = now()
             WHERE user_id = $1 AND cardinality(meals) = 0
            "#,
        )
        .bind(user_id)
        .bind(recipe_ids)
        .execute(&self.db)
        .await
        .context("assign meal plan")?;
        if res.rows_affected() == 0 {
            return self.outcome_for_miss(user_id).await;
        }
        Ok(StoreOutcome::Applied(()))
    }

    async fn remove_pending(
        &self,
        user_id: Uuid,
        kind: MealKind,
        id: &str,
    ) -> anyhow::Result<StoreOutcome<()>> {
        let res = sqlx::query(remove_sql(kind))
            .bind(user_id)
            .bind(id)
            .execute(&self.db)
            .await
            .with_context(|| format!("remove pending {kind} meal"))?;
        if res.rows_affected() == 0 {
            return self.outcome_for_miss(user_id).await;
        }
        Ok(StoreOutcome::Applied(()))
    }

    async fn consume(
        &self,
        user_id: Uuid,
        kind: MealKind,
        id: &str,
        delta: &NutritionTotals,
    ) -> anyhow::Result<StoreOutcome<NutritionTotals>> {
        let row = sqlx::query_as::<_, TotalsRow>(consume_sql(kind))
            .bind(user_id)
            .bind(id)
            .bind(delta.protein)
            .bind(delta.carbs)
            .bind(delta.fats)
            .bind(delta.calories)
            .fetch_optional(&self.db)
            .await
            .with_context(|| format!("consume {kind} meal"))?;
        match row {
            Some(totals) => Ok(StoreOutcome::Applied(totals.into())),
            None => self.outcome_for_miss(user_id).await,
        }
    }

    async fn user_ids(&self) -> anyhow::Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"SELECT user_id FROM nutrition_ledgers ORDER BY user_id"#,
        )
        .fetch_all(&self.db)
        .await
        .context("list ledger ids")?;
        Ok(ids)
    }

    async fn reset_totals(&self, user_ids: &[Uuid]) -> anyhow::Result<u64> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        let res = sqlx::query(
            r#"
            UPDATE nutrition_ledgers
               SET current_calorie = 0, protein = 0, carbs = 0, fats = 0,
                   updated_at = now()
             WHERE user_id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .execute(&mut *tx)
        .await
        .context("reset ledger totals")?;
        tx.commit().await.context("commit tx")?;
        Ok(res.rows_affected())
    }
}

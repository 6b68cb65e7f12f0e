use sqlx::FromRow;
use uuid::Uuid;

use super::model::{NutritionRecord, NutritionTotals};

/// Row of `nutrition_ledgers`.
#[derive(Debug, FromRow)]
pub struct LedgerRow {
    pub user_id: Uuid,
    pub calorie_goal: i32,
    pub current_calorie: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub meals: Vec<String>,
    pub scanned_meals: Vec<String>,
}

/// Totals returned by `RETURNING` clauses.
#[derive(Debug, FromRow)]
pub struct TotalsRow {
    pub current_calorie: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl From<TotalsRow> for NutritionTotals {
    fn from(r: TotalsRow) -> Self {
        Self {
            protein: r.protein,
            carbs: r.carbs,
            fats: r.fats,
            calories: r.current_calorie,
        }
    }
}

impl From<LedgerRow> for NutritionRecord {
    fn from(r: LedgerRow) -> Self {
        Self {
            user_id: r.user_id,
            calorie_goal: r.calorie_goal,
            totals: NutritionTotals {
                protein: r.protein,
                carbs: r.carbs,
                fats: r.fats,
                calories: r.current_calorie,
            },
            meals: r.meals,
            scanned_meals: r.scanned_meals,
        }
    }
}

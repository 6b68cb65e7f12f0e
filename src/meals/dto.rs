use serde::{Deserialize, Serialize};

use super::entry::MealEntry;
use crate::ledger::model::{CalorieProgress, NutritionRecord, NutritionTotals};

/// Overall state of today's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Nothing planned, scanned or eaten yet.
    Empty,
    /// Every planned or scanned entry has been eaten or removed.
    Completed,
    Pending,
}

impl DayStatus {
    pub fn of(record: &NutritionRecord) -> Self {
        if !record.meals.is_empty() || !record.scanned_meals.is_empty() {
            DayStatus::Pending
        } else if record.totals.is_zero() {
            DayStatus::Empty
        } else {
            DayStatus::Completed
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub status: DayStatus,
    pub calorie_goal: i32,
    pub totals: NutritionTotals,
    pub progress: CalorieProgress,
    pub entries: Vec<MealEntry>,
    /// Pending ids that could not be hydrated and are left out of `entries`.
    pub hidden: usize,
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub barcode: String,
}

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub meal_ids: Vec<String>,
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kcal above the goal that still counts as "goal reached".
pub const GOAL_TOLERANCE_KCAL: f64 = 100.0;

/// Running macro and calorie totals of one ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionTotals {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub calories: f64,
}

impl NutritionTotals {
    pub const ZERO: Self = Self {
        protein: 0.0,
        carbs: 0.0,
        fats: 0.0,
        calories: 0.0,
    };

    /// Adds `delta` field by field, clamping every result at zero.
    pub fn saturating_add(&self, delta: &Self) -> Self {
        Self {
            protein: clamp_sum(self.protein, delta.protein),
            carbs: clamp_sum(self.carbs, delta.carbs),
            fats: clamp_sum(self.fats, delta.fats),
            calories: clamp_sum(self.calories, delta.calories),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

fn clamp_sum(current: f64, delta: f64) -> f64 {
    (current + delta).max(0.0)
}

/// Which pending list of a ledger an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealKind {
    Recipe,
    Scanned,
}

impl MealKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealKind::Recipe => "recipe",
            MealKind::Scanned => "scanned",
        }
    }

    /// Recipe ids are numeric Spoonacular ids; barcodes are GTIN-style
    /// digit strings. Anything else never reaches an upstream URL.
    pub fn is_valid_id(&self, id: &str) -> bool {
        let max_len = match self {
            MealKind::Recipe => 12,
            MealKind::Scanned => 32,
        };
        !id.is_empty() && id.len() <= max_len && id.bytes().all(|b| b.is_ascii_digit())
    }
}

impl std::fmt::Display for MealKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MealKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recipe" => Ok(MealKind::Recipe),
            "scanned" => Ok(MealKind::Scanned),
            other => Err(format!("unknown meal kind: {other}")),
        }
    }
}

/// Per-user nutrition record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionRecord {
    pub user_id: Uuid,
    pub calorie_goal: i32,
    pub totals: NutritionTotals,
    pub meals: Vec<String>,
    pub scanned_meals: Vec<String>,
}

impl NutritionRecord {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            calorie_goal: 0,
            totals: NutritionTotals::ZERO,
            meals: Vec::new(),
            scanned_meals: Vec::new(),
        }
    }

    pub fn pending(&self, kind: MealKind) -> &[String] {
        match kind {
            MealKind::Recipe => &self.meals,
            MealKind::Scanned => &self.scanned_meals,
        }
    }

    pub fn pending_mut(&mut self, kind: MealKind) -> &mut Vec<String> {
        match kind {
            MealKind::Recipe => &mut self.meals,
            MealKind::Scanned => &mut self.scanned_meals,
        }
    }

    pub fn is_pending(&self, kind: MealKind, id: &str) -> bool {
        self.pending(kind).iter().any(|p| p == id)
    }

    pub fn progress(&self) -> CalorieProgress {
        CalorieProgress::new(self.calorie_goal, self.totals.calories)
    }
}

/// How today's consumption compares with the calorie goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CalorieProgress {
    NoGoal,
    Under { remaining: f64 },
    Reached { over_by: f64 },
    Over { over_by: f64 },
}

impl CalorieProgress {
    pub fn new(goal: i32, consumed: f64) -> Self {
        if goal <= 0 {
            return CalorieProgress::NoGoal;
        }
        let diff = consumed - f64::from(goal);
        if diff < 0.0 {
            CalorieProgress::Under { remaining: -diff }
        } else if diff <= GOAL_TOLERANCE_KCAL {
            CalorieProgress::Reached { over_by: diff }
        } else {
            CalorieProgress::Over { over_by: diff }
        }
    }
}

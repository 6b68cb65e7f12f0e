use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ledger::model::NutritionTotals;

pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/150";

/// Nutrition facts of one meal entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealFacts {
    pub name: String,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub calories: f64,
    pub image: String,
}

impl MealFacts {
    pub fn totals(&self) -> NutritionTotals {
        NutritionTotals {
            protein: self.protein,
            carbs: self.carbs,
            fats: self.fats,
            calories: self.calories,
        }
    }
}

// ---- Spoonacular ----

#[derive(Debug, Deserialize)]
pub struct NutrientAmount {
    pub title: String,
    #[serde(default)]
    pub amount: Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct NutritionWidget {
    #[serde(default)]
    pub good: Vec<NutrientAmount>,
    #[serde(default)]
    pub bad: Vec<NutrientAmount>,
}

impl NutritionWidget {
    fn find(list: &[NutrientAmount], title: &str) -> f64 {
        list.iter()
            .find(|n| n.title == title)
            .map(|n| parse_amount(&n.amount))
            .unwrap_or(0.0)
    }

    pub fn protein(&self) -> f64 {
        Self::find(&self.good, "Protein")
    }
    pub fn carbs(&self) -> f64 {
        Self::find(&self.bad, "Carbohydrates")
    }
    pub fn fats(&self) -> f64 {
        Self::find(&self.bad, "Fat")
    }
    pub fn calories(&self) -> f64 {
        Self::find(&self.bad, "Calories")
    }
}

#[derive(Debug, Deserialize)]
pub struct Ingredient {
    pub original: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInformation {
    pub title: Option<String>,
    pub image: Option<String>,
    pub ready_in_minutes: Option<u32>,
    pub servings: Option<u32>,
    #[serde(default)]
    pub extended_ingredients: Vec<Ingredient>,
    pub instructions: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlannedMealRaw {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanNutrients {
    pub calories: f64,
    pub carbohydrates: f64,
    pub protein: f64,
    pub fat: f64,
}

#[derive(Debug, Deserialize)]
pub struct DayPlanRaw {
    pub meals: Vec<PlannedMealRaw>,
    pub nutrients: PlanNutrients,
}

#[derive(Debug, Deserialize)]
pub struct WeekRaw {
    pub monday: Option<DayPlanRaw>,
    pub tuesday: Option<DayPlanRaw>,
    pub wednesday: Option<DayPlanRaw>,
    pub thursday: Option<DayPlanRaw>,
    pub friday: Option<DayPlanRaw>,
    pub saturday: Option<DayPlanRaw>,
    pub sunday: Option<DayPlanRaw>,
}

impl WeekRaw {
    pub fn into_days(self) -> Vec<DayPlanRaw> {
        [
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
            self.sunday,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct MealPlanResponse {
    pub week: WeekRaw,
}

/// Diet categories offered on the plan screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DietCategory {
    Cbum,
    Ketogenic,
    #[default]
    Vegetarian,
    Vegan,
}

impl DietCategory {
    /// Diet name understood by the meal planner.
    pub fn api_name(&self) -> &'static str {
        match self {
            DietCategory::Cbum => "whole30",
            DietCategory::Ketogenic => "ketogenic",
            DietCategory::Vegetarian => "vegetarian",
            DietCategory::Vegan => "vegan",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanMeal {
    pub id: String,
    pub title: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealPlan {
    pub label: String,
    pub meals: Vec<PlanMeal>,
    pub nutrients: PlanNutrients,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeDetail {
    pub id: String,
    pub title: String,
    pub image: String,
    pub ready_in_minutes: Option<u32>,
    pub servings: Option<u32>,
    pub ingredients: Vec<String>,
    pub instructions: String,
}

// ---- OpenFoodFacts ----

#[derive(Debug, Deserialize)]
pub struct ProductRaw {
    pub product_name: Option<String>,
    #[serde(default)]
    pub nutriments: Map<String, Value>,
    pub image_url: Option<String>,
}

impl ProductRaw {
    pub fn nutriment(&self, key: &str) -> f64 {
        self.nutriments.get(key).map(parse_amount).unwrap_or(0.0)
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductResponse {
    pub product: Option<ProductRaw>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPreview {
    pub barcode: String,
    pub name: String,
    pub image: String,
    pub per_100g: NutritionTotals,
    pub per_serving: NutritionTotals,
}

/// Reads a nutrient amount that may arrive as a number or as a string with
/// a unit suffix ("25g", "316k"). Anything without a leading number is 0.
pub fn parse_amount(v: &Value) -> f64 {
    match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let s = s.trim();
            let end = s
                .char_indices()
                .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && *c == '-')))
                .map(|(i, _)| i)
                .unwrap_or(s.len());
            s[..end].parse().unwrap_or(0.0)
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_amount_handles_units_and_numbers() {
        assert_eq!(parse_amount(&json!("25g")), 25.0);
        assert_eq!(parse_amount(&json!("12.5g")), 12.5);
        assert_eq!(parse_amount(&json!("316k")), 316.0);
        assert_eq!(parse_amount(&json!(" 4 ")), 4.0);
        assert_eq!(parse_amount(&json!(7.25)), 7.25);
        assert_eq!(parse_amount(&json!("g")), 0.0);
        assert_eq!(parse_amount(&json!(null)), 0.0);
    }

    #[test]
    fn widget_reads_protein_from_good_and_rest_from_bad() {
        let widget: NutritionWidget = serde_json::from_value(json!({
            "good": [{"title": "Protein", "amount": "30g"}, {"title": "Fiber", "amount": "5g"}],
            "bad": [
                {"title": "Calories", "amount": "540k"},
                {"title": "Fat", "amount": "18g"},
                {"title": "Carbohydrates", "amount": "62g"}
            ]
        }))
        .unwrap();
        assert_eq!(widget.protein(), 30.0);
        assert_eq!(widget.carbs(), 62.0);
        assert_eq!(widget.fats(), 18.0);
        assert_eq!(widget.calories(), 540.0);
    }

    #[test]
    fn week_days_keep_calendar_order() {
        let day = |id: i64| json!({"meals": [{"id": id, "title": "x"}],
            "nutrients": {"calories": 1.0, "carbohydrates": 1.0, "protein": 1.0, "fat": 1.0}});
        let week: WeekRaw = serde_json::from_value(json!({
            "sunday": day(7), "monday": day(1), "wednesday": day(3)
        }))
        .unwrap();
        let ids: Vec<i64> = week.into_days().iter().map(|d| d.meals[0].id).collect();
        assert_eq!(ids, vec![1, 3, 7]);
    }

    #[test]
    fn cbum_maps_to_whole30() {
        assert_eq!(DietCategory::Cbum.api_name(), "whole30");
        let diet: DietCategory = serde_json::from_value(json!("vegan")).unwrap();
        assert_eq!(diet.api_name(), "vegan");
        assert_eq!(DietCategory::default(), DietCategory::Vegetarian);
    }
}

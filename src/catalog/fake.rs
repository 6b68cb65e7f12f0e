use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use super::dto::{DietCategory, MealFacts, MealPlan, ProductPreview, RecipeDetail};
use super::FoodCatalog;

/// In-memory catalog for tests. Ids listed in `failing` error on lookup.
#[derive(Default)]
pub struct StaticCatalog {
    recipes: HashMap<String, MealFacts>,
    products: HashMap<String, MealFacts>,
    failing: HashSet<String>,
    plans: Vec<MealPlan>,
}

impl StaticCatalog {
    pub fn with_recipe(mut self, id: &str, facts: MealFacts) -> Self {
        self.recipes.insert(id.to_string(), facts);
        self
    }

    pub fn with_product(mut self, barcode: &str, facts: MealFacts) -> Self {
        self.products.insert(barcode.to_string(), facts);
        self
    }

    pub fn with_failure(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn with_plans(mut self, plans: Vec<MealPlan>) -> Self {
        self.plans = plans;
        self
    }

    fn check(&self, id: &str) -> anyhow::Result<()> {
        if self.failing.contains(id) {
            anyhow::bail!("lookup of {id} failed");
        }
        Ok(())
    }
}

#[async_trait]
impl FoodCatalog for StaticCatalog {
    async fn recipe_facts(&self, recipe_id: &str) -> anyhow::Result<Option<MealFacts>> {
        self.check(recipe_id)?;
        Ok(self.recipes.get(recipe_id).cloned())
    }

    async fn product_facts(&self, barcode: &str) -> anyhow::Result<Option<MealFacts>> {
        self.check(barcode)?;
        Ok(self.products.get(barcode).cloned())
    }

    async fn meal_plans(&self, _target_calories: i32, _diet: DietCategory) -> anyhow::Result<Vec<MealPlan>> {
        if self.failing.contains("plans") {
            anyhow::bail!("meal planner unavailable");
        }
        Ok(self.plans.clone())
    }

    async fn recipe_detail(&self, recipe_id: &str) -> anyhow::Result<Option<RecipeDetail>> {
        self.check(recipe_id)?;
        Ok(self.recipes.get(recipe_id).map(|f| RecipeDetail {
            id: recipe_id.to_string(),
            title: f.name.clone(),
            image: f.image.clone(),
            ready_in_minutes: None,
            servings: None,
            ingredients: Vec::new(),
            instructions: "No instructions available.".into(),
        }))
    }

    async fn product_preview(&self, barcode: &str) -> anyhow::Result<Option<ProductPreview>> {
        self.check(barcode)?;
        Ok(self.products.get(barcode).map(|f| ProductPreview {
            barcode: barcode.to_string(),
            name: f.name.clone(),
            image: f.image.clone(),
            per_100g: f.totals(),
            per_serving: f.totals(),
        }))
    }
}

pub mod dto;
#[cfg(test)]
pub mod fake;
pub mod products;
pub mod recipes;

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;

use crate::config::CatalogConfig;
use crate::ledger::model::MealKind;
use dto::{DietCategory, MealFacts, MealPlan, ProductPreview, RecipeDetail};
use products::ProductClient;
use recipes::RecipeClient;

/// Read-only view of the external recipe and product services.
#[async_trait]
pub trait FoodCatalog: Send + Sync {
    async fn recipe_facts(&self, recipe_id: &str) -> anyhow::Result<Option<MealFacts>>;
    async fn product_facts(&self, barcode: &str) -> anyhow::Result<Option<MealFacts>>;
    async fn meal_plans(&self, target_calories: i32, diet: DietCategory) -> anyhow::Result<Vec<MealPlan>>;
    async fn recipe_detail(&self, recipe_id: &str) -> anyhow::Result<Option<RecipeDetail>>;
    async fn product_preview(&self, barcode: &str) -> anyhow::Result<Option<ProductPreview>>;

    /// Facts for a pending entry, looked up by its kind.
    async fn facts(&self, kind: MealKind, id: &str) -> anyhow::Result<Option<MealFacts>> {
        match kind {
            MealKind::Recipe => self.recipe_facts(id).await,
            MealKind::Scanned => self.product_facts(id).await,
        }
    }
}

#[derive(Clone)]
pub struct HttpCatalog {
    recipes: RecipeClient,
    products: ProductClient,
}

impl HttpCatalog {
    pub fn new(cfg: &CatalogConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .user_agent(concat!("befit/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self {
            recipes: RecipeClient::new(http.clone(), &cfg.spoonacular_base_url, &cfg.spoonacular_api_key),
            products: ProductClient::new(http, &cfg.openfoodfacts_base_url),
        })
    }
}

#[async_trait]
impl FoodCatalog for HttpCatalog {
    async fn recipe_facts(&self, recipe_id: &str) -> anyhow::Result<Option<MealFacts>> {
        self.recipes.meal_facts(recipe_id).await
    }

    async fn product_facts(&self, barcode: &str) -> anyhow::Result<Option<MealFacts>> {
        self.products.meal_facts(barcode).await
    }

    async fn meal_plans(&self, target_calories: i32, diet: DietCategory) -> anyhow::Result<Vec<MealPlan>> {
        self.recipes.generate_plans(target_calories, diet).await
    }

    async fn recipe_detail(&self, recipe_id: &str) -> anyhow::Result<Option<RecipeDetail>> {
        self.recipes.detail(recipe_id).await
    }

    async fn product_preview(&self, barcode: &str) -> anyhow::Result<Option<ProductPreview>> {
        self.products.preview(barcode).await
    }
}

use std::collections::HashSet;

use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::{Client, StatusCode};
use time::OffsetDateTime;
use tracing::debug;

use super::dto::{
    DayPlanRaw, DietCategory, MealFacts, MealPlan, MealPlanResponse, NutritionWidget, PlanMeal,
    RecipeDetail, RecipeInformation, PLACEHOLDER_IMAGE,
};
use crate::ledger::model::MealKind;

/// Client for the Spoonacular recipe and meal planner API.
#[derive(Clone)]
pub struct RecipeClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl RecipeClient {
    pub fn new(http: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// GET with the api key attached. `Ok(None)` on 404.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> anyhow::Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {path}"))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = resp
            .error_for_status()
            .with_context(|| format!("GET {path}"))?
            .json::<T>()
            .await
            .with_context(|| format!("decode {path}"))?;
        Ok(Some(body))
    }

    /// `/recipes/{id}/{leaf}`; malformed ids match nothing and are never sent.
    async fn get_recipe<T: serde::de::DeserializeOwned>(
        &self,
        recipe_id: &str,
        leaf: &str,
    ) -> anyhow::Result<Option<T>> {
        if !MealKind::Recipe.is_valid_id(recipe_id) {
            return Ok(None);
        }
        let path = format!("/recipes/{}/{leaf}", urlencoding::encode(recipe_id));
        self.get_json(&path, &[]).await
    }

    pub async fn nutrition_widget(&self, recipe_id: &str) -> anyhow::Result<Option<NutritionWidget>> {
        self.get_recipe(recipe_id, "nutritionWidget.json").await
    }

    pub async fn information(&self, recipe_id: &str) -> anyhow::Result<Option<RecipeInformation>> {
        self.get_recipe(recipe_id, "information").await
    }

    /// Nutrition widget and recipe information, fetched together.
    pub async fn meal_facts(&self, recipe_id: &str) -> anyhow::Result<Option<MealFacts>> {
        let (widget, info) =
            tokio::try_join!(self.nutrition_widget(recipe_id), self.information(recipe_id))?;
        let (Some(widget), Some(info)) = (widget, info) else {
            return Ok(None);
        };
        Ok(Some(MealFacts {
            name: info.title.unwrap_or_else(|| "Unknown Recipe".into()),
            protein: widget.protein(),
            carbs: widget.carbs(),
            fats: widget.fats(),
            calories: widget.calories(),
            image: info.image.unwrap_or_else(|| PLACEHOLDER_IMAGE.into()),
        }))
    }

    pub async fn detail(&self, recipe_id: &str) -> anyhow::Result<Option<RecipeDetail>> {
        let Some(info) = self.information(recipe_id).await? else {
            return Ok(None);
        };
        Ok(Some(recipe_detail(recipe_id, info)))
    }

    pub async fn generate_plans(
        &self,
        target_calories: i32,
        diet: DietCategory,
    ) -> anyhow::Result<Vec<MealPlan>> {
        // `time` defeats upstream caching so each call yields a fresh week
        let now_ms = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let resp: MealPlanResponse = self
            .get_json(
                "/mealplanner/generate",
                &[
                    ("targetCalories", target_calories.to_string()),
                    ("diet", diet.api_name().to_string()),
                    ("time", now_ms.to_string()),
                ],
            )
            .await?
            .context("meal planner returned 404")?;
        let plans = distinct_plans(resp.week.into_days());
        debug!(target_calories, diet = diet.api_name(), plans = plans.len(), "meal plans generated");
        Ok(plans)
    }
}

pub fn recipe_image_url(recipe_id: &str) -> String {
    format!("https://spoonacular.com/recipeImages/{recipe_id}-312x231.jpg")
}

/// Collapses days whose meal lists are identical and labels the rest in order.
pub fn distinct_plans(days: Vec<DayPlanRaw>) -> Vec<MealPlan> {
    let mut seen = HashSet::new();
    let mut plans = Vec::new();
    for day in days {
        let key = day
            .meals
            .iter()
            .map(|m| m.id.to_string())
            .collect::<Vec<_>>()
            .join("-");
        if !seen.insert(key) {
            continue;
        }
        plans.push(MealPlan {
            label: format!("Meal Plan {}", plans.len() + 1),
            meals: day
                .meals
                .into_iter()
                .map(|m| {
                    let id = m.id.to_string();
                    PlanMeal {
                        image: recipe_image_url(&id),
                        id,
                        title: m.title,
                    }
                })
                .collect(),
            nutrients: day.nutrients,
        });
    }
    plans
}

pub fn strip_html(s: &str) -> String {
    lazy_static! {
        static ref TAG_RE: Regex = Regex::new(r"<[^>]+>").unwrap();
    }
    TAG_RE.replace_all(s, "").trim().to_string()
}

fn recipe_detail(recipe_id: &str, info: RecipeInformation) -> RecipeDetail {
    let instructions = info
        .instructions
        .as_deref()
        .map(strip_html)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "No instructions available.".into());
    RecipeDetail {
        id: recipe_id.to_string(),
        title: info.title.unwrap_or_else(|| "Recipe".into()),
        image: info.image.unwrap_or_else(|| PLACEHOLDER_IMAGE.into()),
        ready_in_minutes: info.ready_in_minutes,
        servings: info.servings,
        ingredients: info
            .extended_ingredients
            .into_iter()
            .map(|i| i.original.unwrap_or_else(|| "Unknown ingredient".into()))
            .collect(),
        instructions,
    }
}

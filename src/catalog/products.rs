use anyhow::Context;
use reqwest::{Client, StatusCode};

use super::dto::{MealFacts, ProductPreview, ProductRaw, ProductResponse, PLACEHOLDER_IMAGE};
use crate::ledger::model::{MealKind, NutritionTotals};

/// Client for the OpenFoodFacts product database.
#[derive(Clone)]
pub struct ProductClient {
    http: Client,
    base_url: String,
}

impl ProductClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `Ok(None)` when the barcode matches no product. Malformed barcodes
    /// match nothing and are never sent upstream.
    pub async fn product(&self, barcode: &str) -> anyhow::Result<Option<ProductRaw>> {
        if !MealKind::Scanned.is_valid_id(barcode) {
            return Ok(None);
        }
        let url = format!(
            "{}/api/v0/product/{}.json",
            self.base_url,
            urlencoding::encode(barcode)
        );
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET product {barcode}"))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = resp
            .error_for_status()
            .with_context(|| format!("GET product {barcode}"))?
            .json::<ProductResponse>()
            .await
            .with_context(|| format!("decode product {barcode}"))?;
        Ok(body.product)
    }

    /// Per-serving facts used for meal entries.
    pub async fn meal_facts(&self, barcode: &str) -> anyhow::Result<Option<MealFacts>> {
        Ok(self.product(barcode).await?.map(|p| MealFacts {
            protein: p.nutriment("proteins_serving"),
            carbs: p.nutriment("carbohydrates_serving"),
            fats: p.nutriment("fat_serving"),
            calories: p.nutriment("energy-kcal_serving"),
            name: product_name(p.product_name),
            image: p.image_url.unwrap_or_else(|| PLACEHOLDER_IMAGE.into()),
        }))
    }

    pub async fn preview(&self, barcode: &str) -> anyhow::Result<Option<ProductPreview>> {
        Ok(self.product(barcode).await?.map(|p| ProductPreview {
            barcode: barcode.to_string(),
            per_100g: NutritionTotals {
                protein: p.nutriment("proteins"),
                carbs: p.nutriment("carbohydrates"),
                fats: p.nutriment("fat"),
                calories: p.nutriment("energy-kcal"),
            },
            per_serving: NutritionTotals {
                protein: p.nutriment("proteins_serving"),
                carbs: p.nutriment("carbohydrates_serving"),
                fats: p.nutriment("fat_serving"),
                calories: p.nutriment("energy-kcal_serving"),
            },
            name: product_name(p.product_name),
            image: p.image_url.unwrap_or_else(|| PLACEHOLDER_IMAGE.into()),
        }))
    }
}

fn product_name(name: Option<String>) -> String {
    name.filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "Unknown Item".into())
}

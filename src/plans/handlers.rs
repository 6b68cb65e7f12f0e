use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{error, instrument};

use crate::{
    auth::services::AuthUser,
    catalog::dto::{DietCategory, MealPlan, ProductPreview, RecipeDetail},
    ledger::{error::LedgerError, model::MealKind},
    state::AppState,
};

/// Target used when the user has not set a calorie goal yet.
pub const DEFAULT_TARGET_CALORIES: i32 = 2000;

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans))
        .route("/recipes/:id", get(get_recipe))
        .route("/products/:barcode", get(get_product))
}

#[derive(Debug, Deserialize)]
pub struct PlanQuery {
    #[serde(default)]
    pub diet: DietCategory,
}

fn upstream(e: anyhow::Error, what: &'static str) -> (StatusCode, String) {
    error!(error = %e, "{what} lookup failed");
    (StatusCode::BAD_GATEWAY, format!("Failed to fetch {what}. Please try again later."))
}

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<PlanQuery>,
) -> Result<Json<Vec<MealPlan>>, (StatusCode, String)> {
    let goal = state
        .ledger
        .get(user_id)
        .await
        .map_err(LedgerError::from)?
        .map(|r| r.calorie_goal)
        .filter(|g| *g > 0)
        .unwrap_or(DEFAULT_TARGET_CALORIES);

    let plans = state
        .catalog
        .meal_plans(goal, query.diet)
        .await
        .map_err(|e| upstream(e, "meal plan"))?;
    Ok(Json(plans))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<RecipeDetail>, (StatusCode, String)> {
    state
        .catalog
        .recipe_detail(&id)
        .await
        .map_err(|e| upstream(e, "recipe"))?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Recipe not found".into()))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(barcode): Path<String>,
) -> Result<Json<ProductPreview>, (StatusCode, String)> {
    let barcode = barcode.trim();
    if !MealKind::Scanned.is_valid_id(barcode) {
        return Err(LedgerError::InvalidBarcode.into());
    }
    state
        .catalog
        .product_preview(barcode)
        .await
        .map_err(|e| upstream(e, "product"))?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Product not found".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::bearer_for;
    use crate::catalog::dto::{MealFacts, PlanMeal, PlanNutrients};
    use crate::catalog::fake::StaticCatalog;
    use crate::ledger::store::MemoryLedgerStore;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn get_as(state: &AppState, uri: &str) -> (StatusCode, Value) {
        let req = Request::get(uri)
            .header("authorization", bearer_for(state, Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();
        let res = catalog_routes()
            .with_state(state.clone())
            .oneshot(req)
            .await
            .unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    fn state_with(catalog: StaticCatalog) -> AppState {
        AppState::fake_with(Arc::new(MemoryLedgerStore::new()), Arc::new(catalog))
    }

    #[tokio::test]
    async fn plans_are_listed() {
        let plan = MealPlan {
            label: "Meal Plan 1".into(),
            meals: vec![PlanMeal {
                id: "1".into(),
                title: "Soup".into(),
                image: "soup.jpg".into(),
            }],
            nutrients: PlanNutrients {
                calories: 2000.0,
                carbohydrates: 200.0,
                protein: 100.0,
                fat: 60.0,
            },
        };
        let state = state_with(StaticCatalog::default().with_plans(vec![plan]));

        let (status, body) = get_as(&state, "/plans?diet=vegan").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["label"], "Meal Plan 1");
        assert_eq!(body[0]["meals"][0]["title"], "Soup");
    }

    #[tokio::test]
    async fn planner_failure_is_a_bad_gateway() {
        let state = state_with(StaticCatalog::default().with_failure("plans"));
        let (status, body) = get_as(&state, "/plans").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, "Failed to fetch meal plan. Please try again later.");
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let facts = MealFacts {
            name: "Bar".into(),
            protein: 3.0,
            carbs: 20.0,
            fats: 8.0,
            calories: 180.0,
            image: "bar.jpg".into(),
        };
        let state = state_with(StaticCatalog::default().with_product("737", facts));

        let (status, body) = get_as(&state, "/products/737").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Bar");
        assert_eq!(body["per_serving"]["calories"], 180.0);

        let (status, body) = get_as(&state, "/products/000").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Product not found");

        let (status, body) = get_as(&state, "/products/..%2Fadmin").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "No barcode detected");
    }

    #[tokio::test]
    async fn missing_recipe_is_not_found() {
        let state = state_with(StaticCatalog::default());
        let (status, _) = get_as(&state, "/recipes/42").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

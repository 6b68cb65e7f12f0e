use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use super::calculator::{self, CalorieEstimate, CalorieEstimateRequest};
use super::model::{CalorieProgress, NutritionRecord};
use super::services;
use crate::{auth::services::AuthUser, state::AppState};

pub fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route("/ledger", get(get_ledger))
        .route("/ledger/goal", put(set_goal))
        .route("/calories/estimate", post(estimate_calories))
}

#[derive(Debug, Serialize)]
pub struct LedgerResponse {
    #[serde(flatten)]
    pub record: NutritionRecord,
    pub progress: CalorieProgress,
}

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub calorie_goal: i64,
}

#[derive(Debug, Serialize)]
pub struct GoalResponse {
    pub calorie_goal: i32,
}

#[instrument(skip(state))]
pub async fn get_ledger(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<LedgerResponse>, (StatusCode, String)> {
    let record = services::get_ledger(state.ledger.as_ref(), user_id).await?;
    let progress = record.progress();
    Ok(Json(LedgerResponse { record, progress }))
}

#[instrument(skip(state))]
pub async fn set_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<GoalRequest>,
) -> Result<Json<GoalResponse>, (StatusCode, String)> {
    let calorie_goal =
        services::set_calorie_goal(state.ledger.as_ref(), user_id, payload.calorie_goal).await?;
    Ok(Json(GoalResponse { calorie_goal }))
}

/// Stateless; no ledger is touched.
#[instrument]
pub async fn estimate_calories(
    Json(payload): Json<CalorieEstimateRequest>,
) -> Result<Json<CalorieEstimate>, (StatusCode, String)> {
    calculator::estimate(&payload).map(Json).ok_or_else(|| {
        warn!("calculator input rejected");
        (StatusCode::BAD_REQUEST, "Please enter valid numbers".into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::bearer_for;
    use crate::catalog::fake::StaticCatalog;
    use crate::ledger::model::NutritionTotals;
    use crate::ledger::store::{LedgerStore, MemoryLedgerStore};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn call(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
        let res = ledger_routes()
            .with_state(state.clone())
            .oneshot(req)
            .await
            .unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    async fn seeded(record: NutritionRecord) -> AppState {
        let store = MemoryLedgerStore::new();
        store.insert(record).await;
        AppState::fake_with(Arc::new(store), Arc::new(StaticCatalog::default()))
    }

    #[tokio::test]
    async fn ledger_reports_progress_against_goal() {
        let user = Uuid::new_v4();
        let mut record = NutritionRecord::empty(user);
        record.calorie_goal = 2000;
        record.totals = NutritionTotals {
            protein: 50.0,
            carbs: 100.0,
            fats: 20.0,
            calories: 2050.0,
        };
        let state = seeded(record).await;

        let req = Request::get("/ledger")
            .header("authorization", bearer_for(&state, user))
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["calorie_goal"], 2000);
        assert_eq!(body["totals"]["calories"], 2050.0);
        assert_eq!(body["progress"]["status"], "reached");
        assert_eq!(body["progress"]["over_by"], 50.0);
    }

    #[tokio::test]
    async fn missing_ledger_is_not_found() {
        let state = AppState::fake();
        let req = Request::get("/ledger")
            .header("authorization", bearer_for(&state, Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();
        let (status, _) = call(&state, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn goal_update_is_validated_and_stored() {
        let user = Uuid::new_v4();
        let state = seeded(NutritionRecord::empty(user)).await;

        let bad = Request::put("/ledger/goal")
            .header("authorization", bearer_for(&state, user))
            .header("content-type", "application/json")
            .body(Body::from(json!({"calorie_goal": 0}).to_string()))
            .unwrap();
        let (status, body) = call(&state, bad).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Please enter a valid calorie goal");

        let good = Request::put("/ledger/goal")
            .header("authorization", bearer_for(&state, user))
            .header("content-type", "application/json")
            .body(Body::from(json!({"calorie_goal": 1800}).to_string()))
            .unwrap();
        let (status, body) = call(&state, good).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["calorie_goal"], 1800);

        let stored = state.ledger.get(user).await.unwrap().unwrap();
        assert_eq!(stored.calorie_goal, 1800);
    }

    #[tokio::test]
    async fn calculator_needs_no_auth_but_valid_numbers() {
        let state = AppState::fake();
        let req = Request::post("/calories/estimate")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"weight_kg": 80, "height_cm": 180, "age": 30, "gender": "male", "activity_level": "moderate"})
                    .to_string(),
            ))
            .unwrap();
        let (status, body) = call(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bmr"], 1780.0);
        let daily = body["daily_calories"].as_f64().unwrap();
        assert!((body["lose_weight_calories"].as_f64().unwrap() - (daily - 500.0)).abs() < 1e-9);
        assert!((body["gain_weight_calories"].as_f64().unwrap() - (daily + 500.0)).abs() < 1e-9);

        let bad = Request::post("/calories/estimate")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"weight_kg": -1, "height_cm": 180, "age": 30, "gender": "female"}).to_string(),
            ))
            .unwrap();
        let (status, body) = call(&state, bad).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Please enter valid numbers");
    }
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use super::dto::{DayStatus, PlanRequest, ScanRequest, TodayResponse};
use super::entry::{MealOutcome, PendingMeal};
use super::hydrate::hydrate_all;
use crate::{
    auth::services::AuthUser,
    ledger::{error::LedgerError, model::MealKind, services},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/meals/today", get(today))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/meals/:kind/:id/eat", post(eat_meal))
        .route("/meals/:kind/:id/remove", post(remove_meal))
        .route("/meals/scanned", post(add_scanned))
        .route("/meals/plan", post(assign_plan))
}

#[instrument(skip(state))]
pub async fn today(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<TodayResponse>, (StatusCode, String)> {
    let record = services::get_ledger(state.ledger.as_ref(), user_id).await?;
    let pending = PendingMeal::all_from(&record);
    let requested = pending.len();

    let entries = hydrate_all(state.catalog.clone(), pending).await;
    let hidden = requested - entries.len();
    if hidden > 0 {
        warn!(%user_id, hidden, "some entries could not be loaded");
    }

    Ok(Json(TodayResponse {
        status: DayStatus::of(&record),
        calorie_goal: record.calorie_goal,
        totals: record.totals,
        progress: record.progress(),
        entries,
        hidden,
    }))
}

/// Re-reads the entry's facts from the catalog, then applies them to the
/// ledger. Client-supplied macros are never trusted.
#[instrument(skip(state))]
pub async fn eat_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((kind, id)): Path<(MealKind, String)>,
) -> Result<Json<MealOutcome>, (StatusCode, String)> {
    let record = services::get_ledger(state.ledger.as_ref(), user_id).await?;
    if !record.is_pending(kind, &id) {
        return Err(LedgerError::NotPending { kind, id }.into());
    }

    let entry = match PendingMeal::new(kind, id.as_str())
        .fetch(state.catalog.as_ref())
        .await
    {
        Ok(Some(entry)) => entry,
        Ok(None) => {
            warn!(%kind, %id, "no catalog match for eaten entry");
            return Err((StatusCode::BAD_GATEWAY, "Could not load meal details".into()));
        }
        Err(e) => {
            error!(error = %e, %kind, %id, "hydration failed before eat");
            return Err((StatusCode::BAD_GATEWAY, "Could not load meal details".into()));
        }
    };

    let outcome = entry.eat(state.ledger.as_ref(), user_id).await?;
    info!(%user_id, %kind, %id, "meal eaten");
    Ok(Json(outcome))
}

#[instrument(skip(state))]
pub async fn remove_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((kind, id)): Path<(MealKind, String)>,
) -> Result<Json<MealOutcome>, (StatusCode, String)> {
    let outcome = PendingMeal::new(kind, id)
        .remove(state.ledger.as_ref(), user_id)
        .await?;
    Ok(Json(outcome))
}

#[instrument(skip(state))]
pub async fn add_scanned(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ScanRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    services::add_scanned(state.ledger.as_ref(), user_id, &payload.barcode).await?;
    Ok(StatusCode::CREATED)
}

#[instrument(skip(state))]
pub async fn assign_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<PlanRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    services::assign_plan(state.ledger.as_ref(), user_id, &payload.meal_ids).await?;
    Ok(StatusCode::CREATED)
}

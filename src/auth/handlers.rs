use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        repo_types::User,
        services::{
            hash_password, is_valid_email, verify_password, AuthUser, JwtKeys, MIN_PASSWORD_LEN,
        },
    },
    ledger::services,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn internal(e: anyhow::Error, what: &'static str) -> (StatusCode, String) {
    error!(error = %e, "{what} failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
}

fn session(state: &AppState, user: User) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let (access_token, refresh_token) = JwtKeys::from_ref(state)
        .issue_pair(user.id)
        .map_err(|e| internal(e, "jwt sign"))?;
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.name = payload.name.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    if payload.name.is_empty() {
        warn!("missing name");
        return Err((StatusCode::BAD_REQUEST, "Name is required".into()));
    }

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }

    match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(_)) => {
            warn!(email = %payload.email, "email already registered");
            return Err((StatusCode::CONFLICT, "Email already registered".into()));
        }
        Ok(None) => {}
        Err(e) => return Err(internal(e, "find_by_email")),
    }

    let hash = hash_password(&payload.password).map_err(|e| internal(e, "hash_password"))?;
    let user = User::create(&state.db, &payload.name, &payload.email, &hash)
        .await
        .map_err(|e| internal(e, "create user"))?;

    services::ensure_ledger(state.ledger.as_ref(), user.id).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    session(&state, user)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    let user = match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
        }
        Err(e) => return Err(internal(e, "find_by_email")),
    };

    let ok = verify_password(&payload.password, &user.password_hash)
        .map_err(|e| internal(e, "verify_password"))?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    // heals a registration whose ledger insert failed after the user row landed
    services::ensure_ledger(state.ledger.as_ref(), user.id).await?;

    info!(user_id = %user.id, "user logged in");
    session(&state, user)
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let claims = JwtKeys::from_ref(&state)
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| {
            warn!(error = %e, "refresh rejected");
            (StatusCode::UNAUTHORIZED, "Invalid refresh token".to_string())
        })?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await
        .map_err(|e| internal(e, "find_by_id"))?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;
    services::ensure_ledger(state.ledger.as_ref(), user.id).await?;

    session(&state, user)
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(|e| internal(e, "find_by_id"))?
        .ok_or_else(|| {
            warn!(%user_id, "user not found");
            (StatusCode::UNAUTHORIZED, "User not found".to_string())
        })?;

    Ok(Json(user.into()))
}

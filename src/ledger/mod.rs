pub mod calculator;
pub mod error;
pub mod handlers;
pub mod model;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod store;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::ledger_routes()
}

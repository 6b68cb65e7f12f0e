use axum::http::StatusCode;
use thiserror::Error;
use tracing::error;

use super::model::MealKind;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Nutrition ledger not found")]
    NotFound,

    #[error("{kind} meal {id} is not pending")]
    NotPending { kind: MealKind, id: String },

    #[error("Please enter a valid calorie goal")]
    InvalidGoal,

    #[error("No barcode detected")]
    InvalidBarcode,

    #[error("Item is already in your diet")]
    AlreadyScanned,

    #[error("Meal plan has no meals")]
    EmptyPlan,

    #[error("Invalid recipe id")]
    InvalidRecipeId,

    #[error("Your meals have already been set.")]
    PlanAlreadySet,

    #[error("reset stopped after {committed} of {total} ledgers: {cause:#}")]
    ResetShard {
        committed: u64,
        total: usize,
        cause: anyhow::Error,
    },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl LedgerError {
    pub fn status(&self) -> StatusCode {
        match self {
            LedgerError::NotFound | LedgerError::NotPending { .. } => StatusCode::NOT_FOUND,
            LedgerError::InvalidGoal
            | LedgerError::InvalidBarcode
            | LedgerError::EmptyPlan
            | LedgerError::InvalidRecipeId => {
                StatusCode::BAD_REQUEST
            }
            LedgerError::AlreadyScanned | LedgerError::PlanAlreadySet => StatusCode::CONFLICT,
            LedgerError::ResetShard { .. } | LedgerError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<LedgerError> for (StatusCode, String) {
    fn from(e: LedgerError) -> Self {
        let status = e.status();
        if status.is_server_error() {
            error!(error = %e, "ledger operation failed");
            return (status, "Internal error".into());
        }
        (status, e.to_string())
    }
}

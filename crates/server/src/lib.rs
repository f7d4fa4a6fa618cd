use api_types::Failure;
use axum::{Json, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use rates::{DEFAULT_RATES_TTL, DEFAULT_RATES_URL, RateError, RateSource};
pub use server::{
    ServerState, TracingInvalidator, router, run, run_with_listener, spawn_with_listener,
};

mod config;
mod dashboard;
mod export;
mod goals;
mod plans;
mod rates;
mod recurring;
mod server;
mod transactions;
mod user;
mod views;

pub enum ServerError {
    Engine(EngineError),
    /// The request body could not be decoded.
    InvalidPayload(String),
    /// The user has not picked a budget plan yet.
    SetupRequired,
    Internal(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) | EngineError::AlreadyInitialized => StatusCode::CONFLICT,
        EngineError::Failed { .. } | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::Validation(_) | EngineError::InvalidPayload(_) | EngineError::Invariant(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Failed { action, source } => {
            tracing::error!("failed to {action}: {source}");
            format!("Failed to {action}.")
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::InvalidPayload(err) => (StatusCode::UNPROCESSABLE_ENTITY, err),
            ServerError::SetupRequired => (
                StatusCode::CONFLICT,
                "Setup required. Choose a budget plan first.".to_string(),
            ),
            ServerError::Internal(err) => {
                tracing::error!("internal error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(Failure::new(error))).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::InvalidPayload(value.body_text())
    }
}

//! Account registration endpoint

use api_types::user::{Register, UserView};
use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use engine::RegisterUser;

use crate::{ServerError, server::ServerState};

/// Handle requests for creating a new account
pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<Register>, JsonRejection>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let Json(payload) = payload?;
    let user = state
        .engine
        .register_user(RegisterUser {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            confirm_password: payload.confirm_password,
        })
        .await?;

    tracing::info!(user_id = %user.id, "account registered");
    Ok((
        StatusCode::CREATED,
        Json(UserView {
            id: user.id,
            name: user.name,
            email: user.email,
        }),
    ))
}

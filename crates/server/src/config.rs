//! Setup and user configuration endpoints

use api_types::{
    Created, Success,
    config::{ConfigView, CurrencyUpdate, Setup},
    plan::PlanUpsert,
};
use axum::{Extension, Json, extract::State, extract::rejection::JsonRejection};
use engine::AuthUser;

use crate::{ServerError, plans::category_inputs, server::ServerState, views};

pub async fn get(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<ConfigView>, ServerError> {
    let config = state
        .engine
        .user_config(user.id)
        .await?
        .ok_or(ServerError::SetupRequired)?;

    Ok(Json(ConfigView {
        currency: views::map_currency(config.currency),
        active_plan: views::plan_view(config.active_plan),
    }))
}

/// Seed the built-in plans and activate the chosen one
pub async fn setup(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    payload: Result<Json<Setup>, JsonRejection>,
) -> Result<Json<Created>, ServerError> {
    let Json(payload) = payload?;
    let plan_id = state
        .engine
        .initialize_app(user.id, payload.plan_index)
        .await?;

    Ok(Json(Created::new(plan_id)))
}

/// Complete setup with a user defined plan
pub async fn setup_custom(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    payload: Result<Json<PlanUpsert>, JsonRejection>,
) -> Result<Json<Created>, ServerError> {
    let Json(payload) = payload?;
    let plan_id = state
        .engine
        .initialize_with_custom_plan(user.id, &payload.name, category_inputs(payload.categories))
        .await?;

    Ok(Json(Created::new(plan_id)))
}

pub async fn update_currency(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    payload: Result<Json<CurrencyUpdate>, JsonRejection>,
) -> Result<Json<Success>, ServerError> {
    let Json(payload) = payload?;
    state
        .engine
        .update_currency(user.id, &payload.currency)
        .await?;

    Ok(Json(Success::ok()))
}

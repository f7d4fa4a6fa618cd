//! Budget plan endpoints

use api_types::{
    Created, Success,
    plan::{CategoryEdit, PlanUpsert, PlansResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
};
use engine::{AuthUser, CategoryInput};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub(crate) fn category_inputs(categories: Vec<CategoryEdit>) -> Vec<CategoryInput> {
    categories
        .into_iter()
        .map(|category| CategoryInput {
            id: category.id,
            name: category.name,
            percentage: category.percentage,
            is_savings: category.is_savings,
        })
        .collect()
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<PlansResponse>, ServerError> {
    let plans = state
        .engine
        .budget_plans(user.id)
        .await?
        .into_iter()
        .map(views::plan_view)
        .collect();

    Ok(Json(PlansResponse { plans }))
}

pub async fn create(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    payload: Result<Json<PlanUpsert>, JsonRejection>,
) -> Result<Json<Created>, ServerError> {
    let Json(payload) = payload?;
    let plan_id = state
        .engine
        .create_custom_plan(user.id, &payload.name, category_inputs(payload.categories))
        .await?;

    Ok(Json(Created::new(plan_id)))
}

/// Reconcile a plan with the submitted name and category list
pub async fn update(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(plan_id): Path<Uuid>,
    payload: Result<Json<PlanUpsert>, JsonRejection>,
) -> Result<Json<Success>, ServerError> {
    let Json(payload) = payload?;
    state
        .engine
        .update_budget_plan(
            user.id,
            plan_id,
            &payload.name,
            category_inputs(payload.categories),
        )
        .await?;

    Ok(Json(Success::ok()))
}

pub async fn remove(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<Success>, ServerError> {
    state.engine.delete_budget_plan(user.id, plan_id).await?;
    Ok(Json(Success::ok()))
}

pub async fn activate(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<Success>, ServerError> {
    state.engine.set_active_plan(user.id, plan_id).await?;
    Ok(Json(Success::ok()))
}

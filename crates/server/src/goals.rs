//! Savings goal endpoints

use api_types::{
    Created, Success,
    goal::{GoalNew, GoalView, GoalsResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
};
use engine::{AuthUser, NewSavingsGoal};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views::AmountFormatter};

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<GoalsResponse>, ServerError> {
    let fmt = AmountFormatter::for_user(&state, user.id).await?;
    let goals = state
        .engine
        .savings_goals(user.id)
        .await?
        .into_iter()
        .map(|goal| GoalView {
            progress_percent: goal.progress_percent(),
            id: goal.id,
            name: goal.name,
            target: fmt.amount(goal.target),
            current: fmt.amount(goal.current),
            category_id: goal.category_id,
            category_name: goal.category_name,
            deadline: goal.deadline,
        })
        .collect();

    Ok(Json(GoalsResponse { goals }))
}

pub async fn create(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    payload: Result<Json<GoalNew>, JsonRejection>,
) -> Result<Json<Created>, ServerError> {
    let Json(payload) = payload?;
    let id = state
        .engine
        .create_savings_goal(
            user.id,
            NewSavingsGoal {
                name: payload.name,
                target: payload.target,
                category_id: payload.category_id,
                deadline: payload.deadline,
            },
        )
        .await?;

    Ok(Json(Created::new(id)))
}

pub async fn remove(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
) -> Result<Json<Success>, ServerError> {
    state.engine.delete_savings_goal(user.id, goal_id).await?;
    Ok(Json(Success::ok()))
}

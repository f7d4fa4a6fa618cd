//! Recurring transaction rule endpoints

use api_types::{
    Created, Success,
    recurring::{RecurringNew, RecurringResponse, RecurringView, Toggled},
};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
};
use engine::{AuthUser, NewRecurringRule};
use uuid::Uuid;

use crate::{
    ServerError,
    server::ServerState,
    views::{self, AmountFormatter},
};

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<RecurringResponse>, ServerError> {
    let fmt = AmountFormatter::for_user(&state, user.id).await?;
    let rules = state
        .engine
        .recurring_rules(user.id)
        .await?
        .into_iter()
        .map(|rule| RecurringView {
            id: rule.id,
            amount: fmt.amount(rule.amount),
            kind: views::map_kind(rule.kind),
            category_id: rule.category_id,
            category_name: rule.category_name,
            note: rule.note,
            day_of_month: rule.day_of_month,
            is_active: rule.is_active,
        })
        .collect();

    Ok(Json(RecurringResponse { rules }))
}

pub async fn create(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    payload: Result<Json<RecurringNew>, JsonRejection>,
) -> Result<Json<Created>, ServerError> {
    let Json(payload) = payload?;
    let id = state
        .engine
        .create_recurring_rule(
            user.id,
            NewRecurringRule {
                amount: payload.amount,
                kind: payload.kind,
                category_id: payload.category_id,
                note: payload.note,
                day_of_month: payload.day_of_month,
            },
        )
        .await?;

    Ok(Json(Created::new(id)))
}

pub async fn remove(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(rule_id): Path<Uuid>,
) -> Result<Json<Success>, ServerError> {
    state.engine.delete_recurring_rule(user.id, rule_id).await?;
    Ok(Json(Success::ok()))
}

pub async fn toggle(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(rule_id): Path<Uuid>,
) -> Result<Json<Toggled>, ServerError> {
    let is_active = state.engine.toggle_recurring_rule(user.id, rule_id).await?;
    Ok(Json(Toggled {
        success: true,
        is_active,
    }))
}

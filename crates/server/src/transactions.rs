//! Transactions API endpoints

use api_types::{
    Created, Success,
    transaction::{TagsResponse, TransactionNew, TransactionView, TransactionsResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
};
use engine::{AuthUser, NewTransaction};
use uuid::Uuid;

use crate::{
    ServerError,
    server::ServerState,
    views::{self, AmountFormatter},
};

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<TransactionsResponse>, ServerError> {
    let fmt = AmountFormatter::for_user(&state, user.id).await?;
    let transactions = state
        .engine
        .transactions(user.id)
        .await?
        .into_iter()
        .map(|tx| TransactionView {
            id: tx.id,
            amount: fmt.amount(tx.amount),
            kind: views::map_kind(tx.kind),
            date: tx.date,
            note: tx.note,
            category_id: tx.category_id,
            category_name: tx.category_name,
            tags: tx.tags,
            payment_method: tx.payment_method.map(views::map_payment_method),
            payment_method_note: tx.payment_method_note,
            is_recurring: tx.is_recurring,
        })
        .collect();

    Ok(Json(TransactionsResponse { transactions }))
}

pub async fn create(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Result<Json<Created>, ServerError> {
    let Json(payload) = payload?;
    let id = state
        .engine
        .create_transaction(
            user.id,
            NewTransaction {
                amount: payload.amount,
                kind: payload.kind,
                category_id: payload.category_id,
                date: payload.date,
                note: payload.note,
                payment_method: payload.payment_method,
                payment_method_note: payload.payment_method_note,
                tags: payload.tags,
            },
        )
        .await?;

    Ok(Json(Created::new(id)))
}

pub async fn remove(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<Success>, ServerError> {
    state
        .engine
        .delete_transaction(user.id, transaction_id)
        .await?;
    Ok(Json(Success::ok()))
}

pub async fn tags(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<TagsResponse>, ServerError> {
    let tags = state.engine.tags(user.id).await?;
    Ok(Json(TagsResponse { tags }))
}

//! Dashboard and monthly summary endpoints

use api_types::{
    dashboard::{CategoryBreakdownView, DashboardView, MonthTotalsView},
    summary::{MonthTransactionView, MonthView, SummaryResponse, YearView},
};
use axum::{Extension, Json, extract::State};
use engine::{AuthUser, MonthTotals};

use crate::{
    ServerError,
    server::ServerState,
    views::{self, AmountFormatter},
};

fn totals_view(totals: MonthTotals, fmt: &AmountFormatter) -> MonthTotalsView {
    MonthTotalsView {
        income: fmt.amount(totals.income),
        expenses: fmt.amount(totals.expenses),
        savings: fmt.amount(totals.savings),
        remaining: fmt.amount(totals.remaining),
    }
}

/// Generate due recurring transactions, then build this month's dashboard.
pub async fn get(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<DashboardView>, ServerError> {
    let today = views::today();
    let recurring_created = state.engine.process_recurring(user.id, today).await?;
    if recurring_created > 0 {
        tracing::info!(user_id = %user.id, recurring_created, "recurring transactions generated");
    }

    let stats = state
        .engine
        .dashboard_stats(user.id, today)
        .await?
        .ok_or(ServerError::SetupRequired)?;
    let fmt = AmountFormatter::new(&state, stats.currency).await;

    let categories = stats
        .categories
        .into_iter()
        .map(|category| CategoryBreakdownView {
            id: category.id,
            name: category.name,
            percentage: category.percentage.as_percent(),
            is_savings: category.is_savings,
            budgeted: fmt.amount(category.budgeted),
            spent: fmt.amount(category.spent),
        })
        .collect();

    Ok(Json(DashboardView {
        plan_name: stats.plan_name,
        currency: views::map_currency(stats.currency),
        current: totals_view(stats.current, &fmt),
        previous: totals_view(stats.previous, &fmt),
        categories,
        recurring_created,
    }))
}

pub async fn summary(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<SummaryResponse>, ServerError> {
    let fmt = AmountFormatter::for_user(&state, user.id).await?;
    let years = state
        .engine
        .monthly_summary(user.id)
        .await?
        .into_iter()
        .map(|year| YearView {
            year: year.year,
            months: year
                .months
                .into_iter()
                .map(|month| MonthView {
                    month: month.month,
                    income: fmt.amount(month.income),
                    expenses: fmt.amount(month.expenses),
                    savings: fmt.amount(month.savings),
                    transactions: month
                        .transactions
                        .into_iter()
                        .map(|tx| MonthTransactionView {
                            id: tx.id,
                            amount: fmt.amount(tx.amount),
                            kind: views::map_kind(tx.kind),
                            note: tx.note,
                            date: tx.date,
                            category_name: tx.category_name,
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    Ok(Json(SummaryResponse { years }))
}

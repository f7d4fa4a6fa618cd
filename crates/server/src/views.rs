//! Conversions from engine values to the JSON views.

use api_types::{
    Amount,
    plan::{CategoryView, PlanView},
};
use chrono::{Local, NaiveDate};
use engine::{BudgetPlan, Currency, Money, PaymentMethod, RateTable, TransactionKind};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

/// Budgeting dates follow the server's local calendar.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn map_currency(currency: Currency) -> api_types::Currency {
    match currency {
        Currency::Thb => api_types::Currency::Thb,
        Currency::Usd => api_types::Currency::Usd,
        Currency::Jpy => api_types::Currency::Jpy,
    }
}

pub fn map_kind(kind: TransactionKind) -> api_types::TransactionKind {
    match kind {
        TransactionKind::Income => api_types::TransactionKind::Income,
        TransactionKind::Expense => api_types::TransactionKind::Expense,
        TransactionKind::Savings => api_types::TransactionKind::Savings,
    }
}

pub fn map_payment_method(method: PaymentMethod) -> api_types::PaymentMethod {
    match method {
        PaymentMethod::Cash => api_types::PaymentMethod::Cash,
        PaymentMethod::Card => api_types::PaymentMethod::Card,
        PaymentMethod::Transfer => api_types::PaymentMethod::Transfer,
        PaymentMethod::Other => api_types::PaymentMethod::Other,
    }
}

pub fn plan_view(plan: BudgetPlan) -> PlanView {
    PlanView {
        id: plan.id,
        name: plan.name,
        is_default: plan.is_default,
        is_custom: plan.is_custom,
        categories: plan
            .categories
            .into_iter()
            .map(|category| CategoryView {
                id: category.id,
                name: category.name,
                percentage: category.percentage.as_percent(),
                is_savings: category.is_savings,
            })
            .collect(),
    }
}

/// Formats base amounts in the display currency of one user.
pub struct AmountFormatter {
    currency: Currency,
    rates: RateTable,
}

impl AmountFormatter {
    /// Base-currency amounts need no rate table, so the feed is only
    /// consulted for the other currencies.
    pub async fn new(state: &ServerState, currency: Currency) -> Self {
        let rates = if currency == Currency::BASE {
            RateTable::new()
        } else {
            state.rates.current().await.rates
        };
        Self { currency, rates }
    }

    /// Formatter for the currency configured by `user_id`, THB before setup.
    pub async fn for_user(state: &ServerState, user_id: Uuid) -> Result<Self, ServerError> {
        let currency = state
            .engine
            .user_config(user_id)
            .await?
            .map(|config| config.currency)
            .unwrap_or_default();
        Ok(Self::new(state, currency).await)
    }

    pub fn amount(&self, amount: Money) -> Amount {
        Amount {
            minor: amount.minor(),
            display: engine::format_amount(amount, self.currency, &self.rates),
        }
    }
}

//! Budgeting engine for Centa.
//!
//! The engine owns every business rule of the application: budget plans and
//! their percentage invariant, transactions, recurring rules, savings goals
//! and the dashboard/summary rollups. It is storage-backed through sea-orm and
//! every operation is scoped to the acting user.

pub use budget::{BudgetCategory, BudgetPlan, CategoryInput, Percentage};
pub use currency::{Currency, ExchangeRates, RateTable, format_amount, time_ago};
pub use error::EngineError;
pub use money::Money;
pub use ops::{
    Engine, EngineBuilder, ExportRow, Invalidator, NewRecurringRule, NewSavingsGoal,
    NewTransaction, RegisterUser, View,
};
pub use recurring_rules::RecurringRule;
pub use savings_goals::SavingsGoal;
pub use summary::{
    CategoryBreakdown, DashboardStats, MonthSummary, MonthTotals, MonthTransaction, YearSummary,
};
pub use transactions::{PaymentMethod, Transaction, TransactionKind};
pub use user_configs::UserConfig;
pub use users::AuthUser;

pub mod budget;
pub mod budget_categories;
pub mod budget_plans;
mod currency;
mod error;
mod money;
mod ops;
pub mod recurring_rules;
pub mod savings_goals;
pub mod summary;
pub mod tags;
pub mod transaction_tags;
pub mod transactions;
pub mod user_configs;
pub mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

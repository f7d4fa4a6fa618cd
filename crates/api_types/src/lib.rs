//! JSON bodies exchanged with the Centa server.
//!
//! Money travels as integer minor units of the base currency (THB satang).
//! Views also carry a `display` string already converted to the user's
//! currency. Form-like request fields stay raw text; the server validates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Thb,
    Usd,
    Jpy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Income,
    Expense,
    Savings,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Other,
}

/// An amount in base minor units and formatted for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub minor: i64,
    pub display: String,
}

/// Body of every successful mutation without a payload.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Body of a successful create.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    pub success: bool,
    pub id: Uuid,
}

impl Created {
    pub fn new(id: Uuid) -> Self {
        Self { success: true, id }
    }
}

/// Body of every error response.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub success: bool,
    pub error: String,
}

impl Failure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Register {
        pub name: String,
        pub email: String,
        pub password: String,
        pub confirm_password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
    }
}

pub mod plan {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub percentage: f64,
        pub is_savings: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlanView {
        pub id: Uuid,
        pub name: String,
        pub is_default: bool,
        pub is_custom: bool,
        pub categories: Vec<CategoryView>,
    }

    /// One category of a plan edit. Omit `id` to create the category.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryEdit {
        #[serde(default)]
        pub id: Option<Uuid>,
        pub name: String,
        pub percentage: f64,
        #[serde(default)]
        pub is_savings: bool,
    }

    /// Create or replace a plan's name and categories.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlanUpsert {
        pub name: String,
        pub categories: Vec<CategoryEdit>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlansResponse {
        pub plans: Vec<PlanView>,
    }
}

pub mod config {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConfigView {
        pub currency: Currency,
        pub active_plan: plan::PlanView,
    }

    /// Pick one of the built-in plans by index.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Setup {
        pub plan_index: usize,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CurrencyUpdate {
        pub currency: String,
    }
}

pub mod dashboard {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthTotalsView {
        pub income: Amount,
        pub expenses: Amount,
        pub savings: Amount,
        pub remaining: Amount,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryBreakdownView {
        pub id: Uuid,
        pub name: String,
        pub percentage: f64,
        pub is_savings: bool,
        pub budgeted: Amount,
        pub spent: Amount,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardView {
        pub plan_name: String,
        pub currency: Currency,
        pub current: MonthTotalsView,
        pub previous: MonthTotalsView,
        pub categories: Vec<CategoryBreakdownView>,
        /// Recurring transactions generated while loading this view.
        pub recurring_created: usize,
    }
}

pub mod summary {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthTransactionView {
        pub id: Uuid,
        pub amount: Amount,
        pub kind: TransactionKind,
        pub note: Option<String>,
        pub date: NaiveDate,
        pub category_name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthView {
        /// Calendar month, 1 to 12.
        pub month: u32,
        pub income: Amount,
        pub expenses: Amount,
        pub savings: Amount,
        pub transactions: Vec<MonthTransactionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct YearView {
        pub year: i32,
        pub months: Vec<MonthView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryResponse {
        pub years: Vec<YearView>,
    }
}

pub mod transaction {
    use super::*;

    /// A new transaction. `amount` is a decimal string such as `"120.50"`,
    /// `date` is `YYYY-MM-DD` or RFC 3339 and `tags` a comma separated list.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub amount: String,
        pub kind: String,
        #[serde(default)]
        pub category_id: Option<String>,
        pub date: String,
        #[serde(default)]
        pub note: Option<String>,
        #[serde(default)]
        pub payment_method: Option<String>,
        #[serde(default)]
        pub payment_method_note: Option<String>,
        #[serde(default)]
        pub tags: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub amount: Amount,
        pub kind: TransactionKind,
        pub date: NaiveDate,
        pub note: Option<String>,
        pub category_id: Option<Uuid>,
        pub category_name: Option<String>,
        pub tags: Vec<String>,
        pub payment_method: Option<PaymentMethod>,
        pub payment_method_note: Option<String>,
        pub is_recurring: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionsResponse {
        pub transactions: Vec<TransactionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagsResponse {
        pub tags: Vec<String>,
    }
}

pub mod goal {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct GoalNew {
        pub name: String,
        pub target: String,
        #[serde(default)]
        pub category_id: Option<String>,
        #[serde(default)]
        pub deadline: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalView {
        pub id: Uuid,
        pub name: String,
        pub target: Amount,
        pub current: Amount,
        pub progress_percent: u32,
        pub category_id: Option<Uuid>,
        pub category_name: Option<String>,
        pub deadline: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalsResponse {
        pub goals: Vec<GoalView>,
    }
}

pub mod recurring {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RecurringNew {
        pub amount: String,
        pub kind: String,
        #[serde(default)]
        pub category_id: Option<String>,
        #[serde(default)]
        pub note: Option<String>,
        pub day_of_month: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecurringView {
        pub id: Uuid,
        pub amount: Amount,
        pub kind: TransactionKind,
        pub category_id: Option<Uuid>,
        pub category_name: Option<String>,
        pub note: Option<String>,
        pub day_of_month: u32,
        pub is_active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecurringResponse {
        pub rules: Vec<RecurringView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Toggled {
        pub success: bool,
        pub is_active: bool,
    }
}

pub mod rates {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RatesView {
        pub base: Currency,
        pub rates: std::collections::HashMap<String, f64>,
        /// Unix seconds.
        pub updated_at: i64,
        /// Age of the table, e.g. `"5m ago"`.
        pub updated_ago: String,
    }
}

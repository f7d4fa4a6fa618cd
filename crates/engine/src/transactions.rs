//! Transaction primitives.
//!
//! A `Transaction` records money coming in (`Income`), going out
//! (`Expense`) or being set aside (`Savings`). Expense and savings
//! transactions belong to a budget category; income never does.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Income,
    Expense,
    Savings,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
            Self::Savings => "SAVINGS",
        }
    }

    /// Parses the canonical upper-case name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "INCOME" => Some(Self::Income),
            "EXPENSE" => Some(Self::Expense),
            "SAVINGS" => Some(Self::Savings),
            _ => None,
        }
    }

    /// Expense and savings transactions must carry a category.
    pub fn needs_category(self) -> bool {
        !matches!(self, Self::Income)
    }

    /// The kind a categorized transaction takes given its category flag.
    pub fn for_category(is_savings: bool) -> Self {
        if is_savings {
            Self::Savings
        } else {
            Self::Expense
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value).ok_or_else(|| {
            EngineError::Validation(format!("invalid transaction kind: {value}"))
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Other,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Card => "CARD",
            Self::Transfer => "TRANSFER",
            Self::Other => "OTHER",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "CASH" => Some(Self::Cash),
            "CARD" => Some(Self::Card),
            "TRANSFER" => Some(Self::Transfer),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub amount: Money,
    pub kind: TransactionKind,
    pub date: NaiveDate,
    pub note: Option<String>,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub tags: Vec<String>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_method_note: Option<String>,
    pub is_recurring: bool,
    pub recurring_id: Option<Uuid>,
}

impl Transaction {
    pub(crate) fn from_model(
        model: Model,
        category_name: Option<String>,
        tags: Vec<String>,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            id: model.id,
            amount: Money::new(model.amount_minor),
            kind: TransactionKind::try_from(model.kind.as_str())?,
            date: model.date,
            note: model.note,
            category_id: model.category_id,
            category_name,
            tags,
            payment_method: model.payment_method.as_deref().and_then(PaymentMethod::parse),
            payment_method_note: model.payment_method_note,
            is_recurring: model.is_recurring,
            recurring_id: model.recurring_id,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_minor: i64,
    pub kind: String,
    pub date: Date,
    pub note: Option<String>,
    pub category_id: Option<Uuid>,
    pub payment_method: Option<String>,
    pub payment_method_note: Option<String>,
    pub is_recurring: bool,
    pub recurring_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budget_categories::Entity",
        from = "Column::CategoryId",
        to = "super::budget_categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(has_many = "super::transaction_tags::Entity")]
    TransactionTags,
}

impl Related<super::budget_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::transaction_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

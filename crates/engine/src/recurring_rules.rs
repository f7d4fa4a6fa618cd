//! Recurring transaction rules.
//!
//! A rule fires at most once per calendar month, on or after its
//! `day_of_month`. Days are limited to `1..=28` so every month has one.

use chrono::{Datelike, NaiveDate};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::{EngineError, Money, TransactionKind};

pub const MIN_DAY: i32 = 1;
pub const MAX_DAY: i32 = 28;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecurringRule {
    pub id: Uuid,
    pub amount: Money,
    pub kind: TransactionKind,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub note: Option<String>,
    pub day_of_month: u32,
    pub is_active: bool,
}

impl RecurringRule {
    pub(crate) fn from_model(model: Model, category_name: Option<String>) -> Result<Self, EngineError> {
        Ok(Self {
            id: model.id,
            amount: Money::new(model.amount_minor),
            kind: TransactionKind::try_from(model.kind.as_str())?,
            category_id: model.category_id,
            category_name,
            note: model.note,
            day_of_month: u32::try_from(model.day_of_month)
                .map_err(|_| EngineError::validation("Day must be 1-28."))?,
            is_active: model.is_active,
        })
    }
}

/// Date the rule is due in `today`'s month, if that day has been reached.
pub fn due_date(day_of_month: u32, today: NaiveDate) -> Option<NaiveDate> {
    if today.day() < day_of_month {
        return None;
    }
    NaiveDate::from_ymd_opt(today.year(), today.month(), day_of_month)
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "recurring_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_minor: i64,
    pub kind: String,
    pub category_id: Option<Uuid>,
    pub note: Option<String>,
    pub day_of_month: i32,
    pub is_active: bool,
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
}

impl Related<super::budget_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn not_due_before_the_scheduled_day() {
        assert_eq!(due_date(15, date(2024, 3, 14)), None);
    }

    #[test]
    fn due_on_and_after_the_scheduled_day() {
        assert_eq!(due_date(15, date(2024, 3, 15)), Some(date(2024, 3, 15)));
        assert_eq!(due_date(1, date(2024, 2, 29)), Some(date(2024, 2, 1)));
        assert_eq!(due_date(28, date(2023, 2, 28)), Some(date(2023, 2, 28)));
    }
}

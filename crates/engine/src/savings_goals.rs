//! Savings goals.
//!
//! Progress is never stored: `current` is the sum of the owner's `SAVINGS`
//! transactions in the linked category, computed on read.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::Money;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SavingsGoal {
    pub id: Uuid,
    pub name: String,
    pub target: Money,
    pub current: Money,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub deadline: Option<NaiveDate>,
}

impl SavingsGoal {
    /// Progress towards the target in percent, capped at 100.
    pub fn progress_percent(&self) -> u32 {
        if !self.target.is_positive() || !self.current.is_positive() {
            return 0;
        }
        let ratio = self.current.minor().saturating_mul(100) / self.target.minor();
        ratio.min(100) as u32
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "savings_goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub target_minor: i64,
    pub category_id: Option<Uuid>,
    pub deadline: Option<Date>,
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

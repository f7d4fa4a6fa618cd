//! Per-user settings: the active budget plan and the display currency.

use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::{BudgetPlan, Currency};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user_configs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub active_plan_id: Uuid,
    pub currency: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::budget_plans::Entity",
        from = "Column::ActivePlanId",
        to = "super::budget_plans::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    ActivePlan,
}

impl Related<super::budget_plans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActivePlan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserConfig {
    pub id: Uuid,
    pub currency: Currency,
    pub active_plan: BudgetPlan,
}

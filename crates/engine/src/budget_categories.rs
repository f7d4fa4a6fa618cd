//! Categories of a budget plan.
//!
//! `basis_points` holds the category share in hundredths of a percent and
//! `position` the display order inside the plan.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "budget_categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub plan_id: Uuid,
    pub name: String,
    pub basis_points: i32,
    pub is_savings: bool,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budget_plans::Entity",
        from = "Column::PlanId",
        to = "super::budget_plans::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Plan,
}

impl Related<super::budget_plans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

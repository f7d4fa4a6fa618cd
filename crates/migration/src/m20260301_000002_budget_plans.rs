use sea_orm_migration::prelude::*;

use crate::m20260301_000001_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum BudgetPlans {
    Table,
    Id,
    UserId,
    Name,
    IsDefault,
    IsCustom,
    CreatedAt,
}

#[derive(Iden)]
pub enum BudgetCategories {
    Table,
    Id,
    PlanId,
    Name,
    BasisPoints,
    IsSavings,
    Position,
}

#[derive(Iden)]
enum UserConfigs {
    Table,
    Id,
    UserId,
    ActivePlanId,
    Currency,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BudgetPlans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetPlans::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BudgetPlans::UserId).uuid().not_null())
                    .col(ColumnDef::new(BudgetPlans::Name).string().not_null())
                    .col(
                        ColumnDef::new(BudgetPlans::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(BudgetPlans::IsCustom)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(BudgetPlans::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_plans-user_id")
                            .from(BudgetPlans::Table, BudgetPlans::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budget_plans-user_id")
                    .table(BudgetPlans::Table)
                    .col(BudgetPlans::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BudgetCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetCategories::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BudgetCategories::PlanId).uuid().not_null())
                    .col(ColumnDef::new(BudgetCategories::Name).string().not_null())
                    .col(
                        ColumnDef::new(BudgetCategories::BasisPoints)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetCategories::IsSavings)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(BudgetCategories::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_categories-plan_id")
                            .from(BudgetCategories::Table, BudgetCategories::PlanId)
                            .to(BudgetPlans::Table, BudgetPlans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budget_categories-plan_id")
                    .table(BudgetCategories::Table)
                    .col(BudgetCategories::PlanId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserConfigs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserConfigs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserConfigs::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserConfigs::ActivePlanId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserConfigs::Currency)
                            .string()
                            .not_null()
                            .default("THB"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_configs-user_id")
                            .from(UserConfigs::Table, UserConfigs::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_configs-active_plan_id")
                            .from(UserConfigs::Table, UserConfigs::ActivePlanId)
                            .to(BudgetPlans::Table, BudgetPlans::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-user_configs-user_id")
                    .table(UserConfigs::Table)
                    .col(UserConfigs::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserConfigs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetPlans::Table).to_owned())
            .await?;
        Ok(())
    }
}

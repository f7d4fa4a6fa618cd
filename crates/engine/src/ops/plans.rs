use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    BudgetPlan, CategoryInput, EngineError, ResultEngine, TransactionKind,
    budget::{ValidCategory, ValidPlan, validate_plan},
    budget_categories, budget_plans, recurring_rules, transactions, user_configs,
};

use super::{Engine, View, with_tx};

impl Engine {
    /// All plans of the user with their categories, oldest first.
    pub async fn budget_plans(&self, user_id: Uuid) -> ResultEngine<Vec<BudgetPlan>> {
        let plans = budget_plans::Entity::find()
            .filter(budget_plans::Column::UserId.eq(user_id))
            .order_by_asc(budget_plans::Column::CreatedAt)
            .order_by_asc(budget_plans::Column::Name)
            .all(&self.database)
            .await?;
        if plans.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_plan: HashMap<Uuid, Vec<budget_categories::Model>> = HashMap::new();
        for category in budget_categories::Entity::find()
            .filter(budget_categories::Column::PlanId.is_in(plans.iter().map(|p| p.id)))
            .order_by_asc(budget_categories::Column::Position)
            .all(&self.database)
            .await?
        {
            by_plan.entry(category.plan_id).or_default().push(category);
        }

        Ok(plans
            .into_iter()
            .map(|plan| {
                let categories = by_plan.remove(&plan.id).unwrap_or_default();
                BudgetPlan::from_models(plan, categories)
            })
            .collect())
    }

    pub(super) async fn insert_plan<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        name: &str,
        is_default: bool,
        is_custom: bool,
        categories: &[ValidCategory],
    ) -> ResultEngine<budget_plans::Model> {
        let plan = budget_plans::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(user_id),
            name: ActiveValue::Set(name.to_string()),
            is_default: ActiveValue::Set(is_default),
            is_custom: ActiveValue::Set(is_custom),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(db)
        .await?;

        for (position, category) in categories.iter().enumerate() {
            self.insert_category(db, plan.id, position, category).await?;
        }
        Ok(plan)
    }

    async fn insert_category<C: ConnectionTrait>(
        &self,
        db: &C,
        plan_id: Uuid,
        position: usize,
        category: &ValidCategory,
    ) -> ResultEngine<()> {
        budget_categories::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            plan_id: ActiveValue::Set(plan_id),
            name: ActiveValue::Set(category.name.clone()),
            basis_points: ActiveValue::Set(category.percentage.basis_points()),
            is_savings: ActiveValue::Set(category.is_savings),
            position: ActiveValue::Set(position as i32),
        }
        .insert(db)
        .await?;
        Ok(())
    }

    /// Adds a user-defined plan. It is not activated.
    pub async fn create_custom_plan(
        &self,
        user_id: Uuid,
        name: &str,
        categories: Vec<CategoryInput>,
    ) -> ResultEngine<Uuid> {
        let plan = validate_plan(name, categories)?;

        let created = self
            .insert_custom_plan(user_id, &plan)
            .await
            .map_err(|err| err.failed("create custom plan"))?;

        self.invalidate(&[View::Config]);
        Ok(created.id)
    }

    async fn insert_custom_plan(
        &self,
        user_id: Uuid,
        plan: &ValidPlan,
    ) -> ResultEngine<budget_plans::Model> {
        with_tx!(self, |db_tx| {
            self.insert_plan(&db_tx, user_id, &plan.name, false, true, &plan.categories)
                .await
        })
    }

    pub async fn set_active_plan(&self, user_id: Uuid, plan_id: Uuid) -> ResultEngine<()> {
        self.activate_plan(user_id, plan_id)
            .await
            .map_err(|err| err.failed("update active plan"))?;
        self.invalidate(&[View::Dashboard, View::Config, View::Transactions]);
        Ok(())
    }

    async fn activate_plan(&self, user_id: Uuid, plan_id: Uuid) -> ResultEngine<()> {
        let config = self
            .user_config(user_id)
            .await?
            .ok_or_else(|| EngineError::not_found("No configuration found."))?;
        self.require_owned_plan(&self.database, user_id, plan_id)
            .await?;

        user_configs::ActiveModel {
            id: ActiveValue::Unchanged(config.id),
            active_plan_id: ActiveValue::Set(plan_id),
            ..Default::default()
        }
        .update(&self.database)
        .await?;
        Ok(())
    }

    /// Reconciles a plan with an edited category list.
    ///
    /// Submitted categories with an id are updated in place, those without
    /// are created, and stored categories missing from the list are removed
    /// after detaching what points at them. Flipping a category's savings
    /// flag retypes its transactions and recurring rules. Everything commits
    /// together or not at all.
    pub async fn update_budget_plan(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        name: &str,
        categories: Vec<CategoryInput>,
    ) -> ResultEngine<()> {
        let plan = validate_plan(name, categories)?;

        self.reconcile_plan(user_id, plan_id, plan)
            .await
            .map_err(|err| err.failed("update plan"))?;
        self.invalidate(&[View::Dashboard, View::Config, View::Transactions]);
        Ok(())
    }

    async fn reconcile_plan(&self, user_id: Uuid, plan_id: Uuid, plan: ValidPlan) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let stored_plan = self.require_owned_plan(&db_tx, user_id, plan_id).await?;

            let stored: HashMap<Uuid, budget_categories::Model> = budget_categories::Entity::find()
                .filter(budget_categories::Column::PlanId.eq(plan_id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|category| (category.id, category))
                .collect();

            let submitted: HashSet<Uuid> = plan.categories.iter().filter_map(|c| c.id).collect();
            if submitted.iter().any(|id| !stored.contains_key(id)) {
                return Err(EngineError::not_found("Category not found."));
            }

            for removed in stored.keys().filter(|id| !submitted.contains(id)) {
                self.remove_category(&db_tx, user_id, *removed).await?;
            }

            for (position, category) in plan.categories.iter().enumerate() {
                let Some(id) = category.id else {
                    self.insert_category(&db_tx, plan_id, position, category)
                        .await?;
                    continue;
                };

                budget_categories::ActiveModel {
                    id: ActiveValue::Unchanged(id),
                    name: ActiveValue::Set(category.name.clone()),
                    basis_points: ActiveValue::Set(category.percentage.basis_points()),
                    is_savings: ActiveValue::Set(category.is_savings),
                    position: ActiveValue::Set(position as i32),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;

                let was_savings = stored.get(&id).is_some_and(|prev| prev.is_savings);
                if was_savings != category.is_savings {
                    let kind = TransactionKind::for_category(category.is_savings);
                    transactions::Entity::update_many()
                        .col_expr(transactions::Column::Kind, Expr::value(kind.as_str()))
                        .filter(transactions::Column::UserId.eq(user_id))
                        .filter(transactions::Column::CategoryId.eq(id))
                        .exec(&db_tx)
                        .await?;
                    recurring_rules::Entity::update_many()
                        .col_expr(recurring_rules::Column::Kind, Expr::value(kind.as_str()))
                        .filter(recurring_rules::Column::UserId.eq(user_id))
                        .filter(recurring_rules::Column::CategoryId.eq(id))
                        .exec(&db_tx)
                        .await?;
                }
            }

            let mut renamed: budget_plans::ActiveModel = stored_plan.into();
            renamed.name = ActiveValue::Set(plan.name.clone());
            renamed.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Deletes a plan that is neither active nor default, detaching its
    /// categories' dependants first.
    pub async fn delete_budget_plan(&self, user_id: Uuid, plan_id: Uuid) -> ResultEngine<()> {
        self.remove_plan(user_id, plan_id)
            .await
            .map_err(|err| err.failed("delete plan"))?;
        self.invalidate(&[View::Dashboard, View::Config]);
        Ok(())
    }

    async fn remove_plan(&self, user_id: Uuid, plan_id: Uuid) -> ResultEngine<()> {
        let config = self
            .user_config(user_id)
            .await?
            .ok_or_else(|| EngineError::not_found("No configuration found."))?;
        if config.active_plan.id == plan_id {
            return Err(EngineError::invariant("Cannot delete the active plan."));
        }

        with_tx!(self, |db_tx| {
            let plan = self.require_owned_plan(&db_tx, user_id, plan_id).await?;
            if plan.is_default {
                return Err(EngineError::invariant("Cannot delete a default plan."));
            }

            let categories = budget_categories::Entity::find()
                .filter(budget_categories::Column::PlanId.eq(plan_id))
                .all(&db_tx)
                .await?;
            for category in categories {
                self.remove_category(&db_tx, user_id, category.id).await?;
            }

            budget_plans::Entity::delete_by_id(plan_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}

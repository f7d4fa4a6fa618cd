use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    BudgetPlan, EngineError, ResultEngine, budget_categories, budget_plans, recurring_rules,
    savings_goals, transactions,
};

use super::Engine;

impl Engine {
    pub(super) async fn require_owned_plan<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        plan_id: Uuid,
    ) -> ResultEngine<budget_plans::Model> {
        budget_plans::Entity::find_by_id(plan_id)
            .filter(budget_plans::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::not_found("Plan not found."))
    }

    /// A category is owned through the plan it belongs to.
    pub(super) async fn find_owned_category<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        category_id: Uuid,
    ) -> ResultEngine<Option<budget_categories::Model>> {
        budget_categories::Entity::find_by_id(category_id)
            .inner_join(budget_plans::Entity)
            .filter(budget_plans::Column::UserId.eq(user_id))
            .one(db)
            .await
            .map_err(Into::into)
    }

    /// Resolves a raw category reference. Malformed, unknown and foreign ids
    /// all read as "Category not found.".
    pub(super) async fn require_owned_category<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        raw: &str,
    ) -> ResultEngine<budget_categories::Model> {
        let not_found = || EngineError::not_found("Category not found.");
        let category_id = Uuid::parse_str(raw.trim()).map_err(|_| not_found())?;
        self.find_owned_category(db, user_id, category_id)
            .await?
            .ok_or_else(not_found)
    }

    pub(super) async fn load_plan<C: ConnectionTrait>(
        &self,
        db: &C,
        plan: budget_plans::Model,
    ) -> ResultEngine<BudgetPlan> {
        let categories = budget_categories::Entity::find()
            .filter(budget_categories::Column::PlanId.eq(plan.id))
            .order_by_asc(budget_categories::Column::Position)
            .all(db)
            .await?;
        Ok(BudgetPlan::from_models(plan, categories))
    }

    /// Names of the given categories, for read models that show them.
    pub(super) async fn category_names<C: ConnectionTrait>(
        &self,
        db: &C,
        ids: impl IntoIterator<Item = Uuid>,
    ) -> ResultEngine<std::collections::HashMap<Uuid, String>> {
        let ids: Vec<Uuid> = ids.into_iter().collect();
        if ids.is_empty() {
            return Ok(Default::default());
        }
        let rows: Vec<(Uuid, String)> = budget_categories::Entity::find()
            .select_only()
            .column(budget_categories::Column::Id)
            .column(budget_categories::Column::Name)
            .filter(budget_categories::Column::Id.is_in(ids))
            .into_tuple()
            .all(db)
            .await?;
        Ok(rows.into_iter().collect())
    }

    /// Detaches every transaction, goal and rule of the user that points at
    /// the category, then deletes it. Detached rules are also deactivated:
    /// an expense or savings rule cannot fire without a category.
    pub(super) async fn remove_category<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        category_id: Uuid,
    ) -> ResultEngine<()> {
        transactions::Entity::update_many()
            .col_expr(
                transactions::Column::CategoryId,
                Expr::value(Option::<Uuid>::None),
            )
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::CategoryId.eq(category_id))
            .exec(db)
            .await?;

        savings_goals::Entity::update_many()
            .col_expr(
                savings_goals::Column::CategoryId,
                Expr::value(Option::<Uuid>::None),
            )
            .filter(savings_goals::Column::UserId.eq(user_id))
            .filter(savings_goals::Column::CategoryId.eq(category_id))
            .exec(db)
            .await?;

        recurring_rules::Entity::update_many()
            .col_expr(
                recurring_rules::Column::CategoryId,
                Expr::value(Option::<Uuid>::None),
            )
            .col_expr(recurring_rules::Column::IsActive, Expr::value(false))
            .filter(recurring_rules::Column::UserId.eq(user_id))
            .filter(recurring_rules::Column::CategoryId.eq(category_id))
            .exec(db)
            .await?;

        budget_categories::Entity::delete_by_id(category_id)
            .exec(db)
            .await?;
        Ok(())
    }
}

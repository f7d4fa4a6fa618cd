use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    CategoryInput, Currency, EngineError, Percentage, ResultEngine, UserConfig,
    budget::{ValidCategory, validate_plan},
    budget_plans, user_configs,
};

use super::{Engine, View, with_tx};

struct BuiltInPlan {
    name: &'static str,
    is_default: bool,
    categories: &'static [(&'static str, i32, bool)],
}

/// Plans offered at setup, in the order the setup form lists them.
const BUILT_IN_PLANS: [BuiltInPlan; 3] = [
    BuiltInPlan {
        name: "50 / 30 / 20",
        is_default: true,
        categories: &[("Needs", 5000, false), ("Wants", 3000, false), ("Savings", 2000, true)],
    },
    BuiltInPlan {
        name: "70 / 20 / 10",
        is_default: false,
        categories: &[
            ("Essentials", 7000, false),
            ("Leisure", 2000, false),
            ("Savings", 1000, true),
        ],
    },
    BuiltInPlan {
        name: "80 / 20",
        is_default: false,
        categories: &[("Spending", 8000, false), ("Savings", 2000, true)],
    },
];

impl BuiltInPlan {
    fn categories(&self) -> Vec<ValidCategory> {
        self.categories
            .iter()
            .map(|&(name, basis_points, is_savings)| ValidCategory {
                id: None,
                name: name.to_string(),
                percentage: Percentage::from_basis_points(basis_points),
                is_savings,
            })
            .collect()
    }
}

impl Engine {
    /// Names of the built-in plans, indexed like `initialize_app` expects.
    pub fn built_in_plans(&self) -> Vec<&'static str> {
        BUILT_IN_PLANS.iter().map(|plan| plan.name).collect()
    }

    /// Returns the user's configuration, creating it from the user's default
    /// plan on first access. `None` means setup has not happened yet.
    pub async fn user_config(&self, user_id: Uuid) -> ResultEngine<Option<UserConfig>> {
        let config = match self.find_config(user_id).await? {
            Some(config) => config,
            None => {
                let Some(default_plan) = budget_plans::Entity::find()
                    .filter(budget_plans::Column::UserId.eq(user_id))
                    .filter(budget_plans::Column::IsDefault.eq(true))
                    .order_by_asc(budget_plans::Column::CreatedAt)
                    .one(&self.database)
                    .await?
                else {
                    return Ok(None);
                };
                let created = user_configs::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4()),
                    user_id: ActiveValue::Set(user_id),
                    active_plan_id: ActiveValue::Set(default_plan.id),
                    currency: ActiveValue::Set(Currency::default().code().to_string()),
                }
                .insert(&self.database)
                .await;
                match created {
                    Ok(config) => config,
                    // Another request created it first.
                    Err(err)
                        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
                    {
                        self.find_config(user_id)
                            .await?
                            .ok_or_else(|| EngineError::not_found("No configuration found."))?
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        };

        let plan = self
            .require_owned_plan(&self.database, user_id, config.active_plan_id)
            .await?;
        Ok(Some(UserConfig {
            id: config.id,
            currency: Currency::try_from(config.currency.as_str())?,
            active_plan: self.load_plan(&self.database, plan).await?,
        }))
    }

    async fn find_config(&self, user_id: Uuid) -> ResultEngine<Option<user_configs::Model>> {
        user_configs::Entity::find()
            .filter(user_configs::Column::UserId.eq(user_id))
            .one(&self.database)
            .await
            .map_err(Into::into)
    }

    /// Seeds the built-in plans for the user and activates the one at
    /// `plan_index`. Returns the id of the active plan.
    pub async fn initialize_app(&self, user_id: Uuid, plan_index: usize) -> ResultEngine<Uuid> {
        if plan_index >= BUILT_IN_PLANS.len() {
            return Err(EngineError::validation("Invalid plan selection."));
        }

        let active = self
            .seed_built_in_plans(user_id, plan_index)
            .await
            .map_err(|err| err.failed("complete setup"))?;
        self.invalidate(&[View::Dashboard, View::Config]);
        Ok(active)
    }

    async fn seed_built_in_plans(&self, user_id: Uuid, plan_index: usize) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            self.require_not_initialized(&db_tx, user_id).await?;

            let mut active = None;
            for (index, built_in) in BUILT_IN_PLANS.iter().enumerate() {
                let plan = self
                    .insert_plan(
                        &db_tx,
                        user_id,
                        built_in.name,
                        built_in.is_default,
                        false,
                        &built_in.categories(),
                    )
                    .await?;
                if index == plan_index {
                    active = Some(plan.id);
                }
            }
            let active = active.ok_or_else(|| EngineError::validation("Invalid plan selection."))?;
            self.insert_config(&db_tx, user_id, active).await?;
            Ok(active)
        })
    }

    /// Completes setup with a user-defined plan instead of a built-in one.
    pub async fn initialize_with_custom_plan(
        &self,
        user_id: Uuid,
        name: &str,
        categories: Vec<CategoryInput>,
    ) -> ResultEngine<Uuid> {
        let plan = validate_plan(name, categories)?;

        let active = self
            .seed_custom_plan(user_id, &plan.name, &plan.categories)
            .await
            .map_err(|err| err.failed("complete setup"))?;
        self.invalidate(&[View::Dashboard, View::Config]);
        Ok(active)
    }

    async fn seed_custom_plan(
        &self,
        user_id: Uuid,
        name: &str,
        categories: &[ValidCategory],
    ) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            self.require_not_initialized(&db_tx, user_id).await?;
            let plan = self
                .insert_plan(&db_tx, user_id, name, true, true, categories)
                .await?;
            self.insert_config(&db_tx, user_id, plan.id).await?;
            Ok(plan.id)
        })
    }

    async fn require_not_initialized<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        let existing = user_configs::Entity::find()
            .filter(user_configs::Column::UserId.eq(user_id))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(EngineError::AlreadyInitialized);
        }
        Ok(())
    }

    async fn insert_config<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        plan_id: Uuid,
    ) -> ResultEngine<user_configs::Model> {
        user_configs::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(user_id),
            active_plan_id: ActiveValue::Set(plan_id),
            currency: ActiveValue::Set(Currency::default().code().to_string()),
        }
        .insert(db)
        .await
        .map_err(Into::into)
    }

    /// Changes the display currency. Stored amounts are untouched.
    pub async fn update_currency(&self, user_id: Uuid, code: &str) -> ResultEngine<()> {
        let currency = Currency::try_from(code)?;

        let config = self
            .user_config(user_id)
            .await
            .map_err(|err| err.failed("update currency"))?
            .ok_or_else(|| EngineError::not_found("No configuration found."))?;

        user_configs::ActiveModel {
            id: ActiveValue::Unchanged(config.id),
            currency: ActiveValue::Set(currency.code().to_string()),
            ..Default::default()
        }
        .update(&self.database)
        .await
        .map_err(|err| EngineError::from(err).failed("update currency"))?;

        self.invalidate(&[View::Dashboard, View::Config, View::Transactions]);
        Ok(())
    }
}

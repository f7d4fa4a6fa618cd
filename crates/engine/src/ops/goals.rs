use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, QuerySelect, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    EngineError, Money, ResultEngine, SavingsGoal, TransactionKind, savings_goals, transactions,
    util::{normalize_optional_text, parse_date, parse_positive_amount},
};

use super::{Engine, View};

/// A savings goal as submitted by a form.
#[derive(Clone, Debug, Default)]
pub struct NewSavingsGoal {
    pub name: String,
    pub target: String,
    pub category_id: Option<String>,
    pub deadline: Option<String>,
}

struct ValidGoal {
    name: String,
    target: Money,
    category_ref: Option<String>,
    deadline: Option<NaiveDate>,
}

impl NewSavingsGoal {
    fn validate(self) -> ResultEngine<ValidGoal> {
        let name = normalize_optional_text(Some(&self.name))
            .ok_or_else(|| EngineError::validation("Name is required."))?;
        let target = parse_positive_amount(&self.target, "Target must be a positive number.")?;
        let deadline = normalize_optional_text(self.deadline.as_deref())
            .map(|raw| parse_date(&raw))
            .transpose()?;
        Ok(ValidGoal {
            name,
            target,
            category_ref: normalize_optional_text(self.category_id.as_deref()),
            deadline,
        })
    }
}

impl Engine {
    /// Goals of the user, oldest first, with their current progress.
    pub async fn savings_goals(&self, user_id: Uuid) -> ResultEngine<Vec<SavingsGoal>> {
        let goals = savings_goals::Entity::find()
            .filter(savings_goals::Column::UserId.eq(user_id))
            .order_by_asc(savings_goals::Column::CreatedAt)
            .all(&self.database)
            .await?;

        let linked: Vec<Uuid> = goals.iter().filter_map(|g| g.category_id).collect();
        let names = self
            .category_names(&self.database, linked.iter().copied())
            .await?;

        let mut saved: HashMap<Uuid, Money> = HashMap::new();
        if !linked.is_empty() {
            let sums: Vec<(Option<Uuid>, Option<i64>)> = transactions::Entity::find()
                .select_only()
                .column(transactions::Column::CategoryId)
                .column_as(Expr::col(transactions::Column::AmountMinor).sum(), "total")
                .filter(transactions::Column::UserId.eq(user_id))
                .filter(transactions::Column::Kind.eq(TransactionKind::Savings.as_str()))
                .filter(transactions::Column::CategoryId.is_in(linked))
                .group_by(transactions::Column::CategoryId)
                .into_tuple()
                .all(&self.database)
                .await?;
            for (category_id, total) in sums {
                if let Some(category_id) = category_id {
                    saved.insert(category_id, Money::new(total.unwrap_or_default()));
                }
            }
        }

        Ok(goals
            .into_iter()
            .map(|goal| SavingsGoal {
                id: goal.id,
                name: goal.name,
                target: Money::new(goal.target_minor),
                current: goal
                    .category_id
                    .and_then(|id| saved.get(&id).copied())
                    .unwrap_or_default(),
                category_name: goal.category_id.and_then(|id| names.get(&id).cloned()),
                category_id: goal.category_id,
                deadline: goal.deadline,
            })
            .collect())
    }

    pub async fn create_savings_goal(
        &self,
        user_id: Uuid,
        input: NewSavingsGoal,
    ) -> ResultEngine<Uuid> {
        let goal = input.validate()?;
        let category_id = match goal.category_ref.as_deref() {
            Some(raw) => Some(
                self.require_owned_category(&self.database, user_id, raw)
                    .await?
                    .id,
            ),
            None => None,
        };

        let created = savings_goals::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(user_id),
            name: ActiveValue::Set(goal.name),
            target_minor: ActiveValue::Set(goal.target.minor()),
            category_id: ActiveValue::Set(category_id),
            deadline: ActiveValue::Set(goal.deadline),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&self.database)
        .await
        .map_err(|err| EngineError::from(err).failed("create goal"))?;

        self.invalidate(&[View::Dashboard]);
        Ok(created.id)
    }

    pub async fn delete_savings_goal(&self, user_id: Uuid, goal_id: Uuid) -> ResultEngine<()> {
        let deleted = savings_goals::Entity::delete_many()
            .filter(savings_goals::Column::Id.eq(goal_id))
            .filter(savings_goals::Column::UserId.eq(user_id))
            .exec(&self.database)
            .await
            .map_err(|err| EngineError::from(err).failed("delete goal"))?;
        if deleted.rows_affected == 0 {
            return Err(EngineError::not_found("Goal not found."));
        }
        self.invalidate(&[View::Dashboard]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_validation() {
        let err = |input: NewSavingsGoal| match input.validate() {
            Ok(_) => panic!("input should be rejected"),
            Err(err) => err,
        };
        assert_eq!(
            err(NewSavingsGoal { name: " ".into(), target: "100".into(), ..Default::default() }),
            EngineError::validation("Name is required.")
        );
        assert_eq!(
            err(NewSavingsGoal { name: "Trip".into(), target: "0".into(), ..Default::default() }),
            EngineError::validation("Target must be a positive number.")
        );
        assert_eq!(
            err(NewSavingsGoal {
                name: "Trip".into(),
                target: "100".into(),
                deadline: Some("next year".into()),
                ..Default::default()
            }),
            EngineError::validation("Invalid date.")
        );

        let goal = NewSavingsGoal {
            name: " Trip ".into(),
            target: "2500.50".into(),
            deadline: Some("2025-12-31".into()),
            category_id: Some(String::new()),
        }
        .validate()
        .unwrap();
        assert_eq!(goal.name, "Trip");
        assert_eq!(goal.target, Money::new(250_050));
        assert!(goal.category_ref.is_none());
        assert_eq!(goal.deadline, NaiveDate::from_ymd_opt(2025, 12, 31));
    }
}

use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Money, RecurringRule, ResultEngine, TransactionKind,
    recurring_rules::{self, MAX_DAY, MIN_DAY, due_date},
    transactions,
    util::{month_bounds, normalize_optional_text, parse_positive_amount},
};

use super::{Engine, View, with_tx};

/// A recurring rule as submitted by a form.
#[derive(Clone, Debug, Default)]
pub struct NewRecurringRule {
    pub amount: String,
    pub kind: String,
    pub category_id: Option<String>,
    pub note: Option<String>,
    pub day_of_month: String,
}

struct ValidRule {
    amount: Money,
    kind: TransactionKind,
    category_ref: Option<String>,
    note: Option<String>,
    day_of_month: i32,
}

impl NewRecurringRule {
    fn validate(self) -> ResultEngine<ValidRule> {
        let amount = parse_positive_amount(&self.amount, "Amount must be positive.")?;
        let kind = TransactionKind::parse(&self.kind)
            .ok_or_else(|| EngineError::validation("Invalid type."))?;
        let category_ref = if kind.needs_category() {
            Some(
                normalize_optional_text(self.category_id.as_deref())
                    .ok_or_else(|| EngineError::validation("Category is required."))?,
            )
        } else {
            None
        };
        let day_of_month = self
            .day_of_month
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|day| (MIN_DAY..=MAX_DAY).contains(day))
            .ok_or_else(|| EngineError::validation("Day must be 1-28."))?;

        Ok(ValidRule {
            amount,
            kind,
            category_ref,
            note: normalize_optional_text(self.note.as_deref()),
            day_of_month,
        })
    }
}

impl Engine {
    /// The user's rules ordered by the day they fire.
    pub async fn recurring_rules(&self, user_id: Uuid) -> ResultEngine<Vec<RecurringRule>> {
        let models = recurring_rules::Entity::find()
            .filter(recurring_rules::Column::UserId.eq(user_id))
            .order_by_asc(recurring_rules::Column::DayOfMonth)
            .order_by_asc(recurring_rules::Column::CreatedAt)
            .all(&self.database)
            .await?;
        let names = self
            .category_names(&self.database, models.iter().filter_map(|m| m.category_id))
            .await?;
        models
            .into_iter()
            .map(|model| {
                let name = model.category_id.and_then(|id| names.get(&id).cloned());
                RecurringRule::from_model(model, name)
            })
            .collect()
    }

    pub async fn create_recurring_rule(
        &self,
        user_id: Uuid,
        input: NewRecurringRule,
    ) -> ResultEngine<Uuid> {
        let rule = input.validate()?;
        let category_id = match rule.category_ref.as_deref() {
            Some(raw) => Some(
                self.require_owned_category(&self.database, user_id, raw)
                    .await?
                    .id,
            ),
            None => None,
        };

        let created = recurring_rules::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(user_id),
            amount_minor: ActiveValue::Set(rule.amount.minor()),
            kind: ActiveValue::Set(rule.kind.as_str().to_string()),
            category_id: ActiveValue::Set(category_id),
            note: ActiveValue::Set(rule.note),
            day_of_month: ActiveValue::Set(rule.day_of_month),
            is_active: ActiveValue::Set(true),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&self.database)
        .await
        .map_err(|err| EngineError::from(err).failed("create recurring transaction"))?;

        self.invalidate(&[View::Dashboard, View::Transactions]);
        Ok(created.id)
    }

    /// Deletes a rule. Transactions it already generated stay.
    pub async fn delete_recurring_rule(&self, user_id: Uuid, rule_id: Uuid) -> ResultEngine<()> {
        let deleted = recurring_rules::Entity::delete_many()
            .filter(recurring_rules::Column::Id.eq(rule_id))
            .filter(recurring_rules::Column::UserId.eq(user_id))
            .exec(&self.database)
            .await
            .map_err(|err| EngineError::from(err).failed("delete recurring transaction"))?;
        if deleted.rows_affected == 0 {
            return Err(EngineError::not_found("Recurring transaction not found."));
        }
        self.invalidate(&[View::Dashboard, View::Transactions]);
        Ok(())
    }

    /// Flips a rule between active and paused, returning the new state.
    pub async fn toggle_recurring_rule(&self, user_id: Uuid, rule_id: Uuid) -> ResultEngine<bool> {
        let is_active = self
            .flip_rule(user_id, rule_id)
            .await
            .map_err(|err| err.failed("toggle recurring transaction"))?;
        self.invalidate(&[View::Dashboard, View::Transactions]);
        Ok(is_active)
    }

    async fn flip_rule(&self, user_id: Uuid, rule_id: Uuid) -> ResultEngine<bool> {
        let rule = recurring_rules::Entity::find_by_id(rule_id)
            .filter(recurring_rules::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::not_found("Recurring transaction not found."))?;

        let is_active = !rule.is_active;
        let mut model: recurring_rules::ActiveModel = rule.into();
        model.is_active = ActiveValue::Set(is_active);
        model.update(&self.database).await?;
        Ok(is_active)
    }

    /// Materializes every active rule that is due in `today`'s month and has
    /// not fired yet this month. Returns how many transactions were created.
    ///
    /// Missed earlier months are not backfilled.
    pub async fn process_recurring(&self, user_id: Uuid, today: NaiveDate) -> ResultEngine<usize> {
        let created = self
            .generate_due(user_id, today)
            .await
            .map_err(|err| err.failed("process recurring transactions"))?;
        if created > 0 {
            self.invalidate(&[View::Dashboard, View::Transactions]);
        }
        Ok(created)
    }

    async fn generate_due(&self, user_id: Uuid, today: NaiveDate) -> ResultEngine<usize> {
        let (first, last) = month_bounds(today);
        with_tx!(self, |db_tx| {
            let rules = recurring_rules::Entity::find()
                .filter(recurring_rules::Column::UserId.eq(user_id))
                .filter(recurring_rules::Column::IsActive.eq(true))
                .all(&db_tx)
                .await?;

            let mut created = 0;
            for rule in rules {
                let kind = TransactionKind::try_from(rule.kind.as_str())?;
                if kind.needs_category() && rule.category_id.is_none() {
                    continue;
                }

                let already = transactions::Entity::find()
                    .filter(transactions::Column::UserId.eq(user_id))
                    .filter(transactions::Column::RecurringId.eq(rule.id))
                    .filter(transactions::Column::Date.between(first, last))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if already {
                    continue;
                }

                let Some(date) = u32::try_from(rule.day_of_month)
                    .ok()
                    .and_then(|day| due_date(day, today))
                else {
                    continue;
                };

                transactions::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4()),
                    user_id: ActiveValue::Set(user_id),
                    amount_minor: ActiveValue::Set(rule.amount_minor),
                    kind: ActiveValue::Set(kind.as_str().to_string()),
                    date: ActiveValue::Set(date),
                    note: ActiveValue::Set(rule.note.clone()),
                    category_id: ActiveValue::Set(rule.category_id),
                    payment_method: ActiveValue::Set(None),
                    payment_method_note: ActiveValue::Set(None),
                    is_recurring: ActiveValue::Set(true),
                    recurring_id: ActiveValue::Set(Some(rule.id)),
                    created_at: ActiveValue::Set(Utc::now()),
                }
                .insert(&db_tx)
                .await?;
                created += 1;
            }
            Ok(created)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> NewRecurringRule {
        NewRecurringRule {
            amount: "15000".to_string(),
            kind: "EXPENSE".to_string(),
            category_id: Some("c0ffee00-0000-4000-8000-000000000000".to_string()),
            note: Some(" Rent ".to_string()),
            day_of_month: "1".to_string(),
        }
    }

    fn message(input: NewRecurringRule) -> String {
        match input.validate() {
            Ok(_) => panic!("input should be rejected"),
            Err(err) => err.to_string(),
        }
    }

    #[test]
    fn rejects_bad_rules() {
        assert_eq!(
            message(NewRecurringRule { amount: "-1".into(), ..input() }),
            "Amount must be positive."
        );
        assert_eq!(message(NewRecurringRule { kind: "X".into(), ..input() }), "Invalid type.");
        assert_eq!(
            message(NewRecurringRule { category_id: None, ..input() }),
            "Category is required."
        );
        for day in ["0", "29", "abc", ""] {
            assert_eq!(
                message(NewRecurringRule { day_of_month: day.into(), ..input() }),
                "Day must be 1-28."
            );
        }
    }

    #[test]
    fn income_rules_need_no_category() {
        let rule = NewRecurringRule {
            kind: "INCOME".into(),
            category_id: None,
            day_of_month: "28".into(),
            ..input()
        }
        .validate()
        .unwrap();
        assert!(rule.category_ref.is_none());
        assert_eq!(rule.day_of_month, 28);
        assert_eq!(rule.note.as_deref(), Some("Rent"));
    }
}

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EngineError, Money, PaymentMethod, ResultEngine, Transaction, TransactionKind, YearSummary,
    summary, tags, transaction_tags, transactions,
    util::{normalize_optional_text, parse_date, parse_positive_amount},
};

use super::{Engine, View, with_tx};

/// A transaction as submitted by a form: every field is raw text.
#[derive(Clone, Debug, Default)]
pub struct NewTransaction {
    pub amount: String,
    pub kind: String,
    pub category_id: Option<String>,
    pub date: String,
    pub note: Option<String>,
    pub payment_method: Option<String>,
    pub payment_method_note: Option<String>,
    /// Comma separated tag names.
    pub tags: Option<String>,
}

struct ValidTransaction {
    amount: Money,
    kind: TransactionKind,
    category_ref: Option<String>,
    date: NaiveDate,
    note: Option<String>,
    payment_method: Option<PaymentMethod>,
    payment_method_note: Option<String>,
    tags: Vec<String>,
}

impl NewTransaction {
    fn validate(self) -> ResultEngine<ValidTransaction> {
        let amount = parse_positive_amount(&self.amount, "Amount must be a positive number.")?;
        let kind = TransactionKind::parse(&self.kind).ok_or_else(|| {
            EngineError::validation("Type must be INCOME, EXPENSE, or SAVINGS.")
        })?;

        // Income never carries a category, whatever was submitted.
        let category_ref = if kind.needs_category() {
            let category = normalize_optional_text(self.category_id.as_deref()).ok_or_else(|| {
                EngineError::validation("Category is required for expenses and savings.")
            })?;
            Some(category)
        } else {
            None
        };

        if self.date.trim().is_empty() {
            return Err(EngineError::validation("Date is required."));
        }
        let date = parse_date(&self.date)?;

        let payment_method = self.payment_method.as_deref().and_then(PaymentMethod::parse);
        let payment_method_note = match payment_method {
            Some(PaymentMethod::Other) => normalize_optional_text(self.payment_method_note.as_deref()),
            _ => None,
        };

        Ok(ValidTransaction {
            amount,
            kind,
            category_ref,
            date,
            note: normalize_optional_text(self.note.as_deref()),
            payment_method,
            payment_method_note,
            tags: tags::parse_tag_list(self.tags.as_deref()),
        })
    }
}

/// One line of the CSV export.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub category: Option<String>,
    pub amount: Money,
    pub note: Option<String>,
}

impl Engine {
    /// Records a transaction together with its tags.
    pub async fn create_transaction(
        &self,
        user_id: Uuid,
        input: NewTransaction,
    ) -> ResultEngine<Uuid> {
        let valid = input.validate()?;

        let id = self
            .insert_transaction(user_id, valid)
            .await
            .map_err(|err| err.failed("create transaction"))?;
        self.invalidate(&[View::Dashboard, View::Transactions]);
        Ok(id)
    }

    async fn insert_transaction(&self, user_id: Uuid, tx: ValidTransaction) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            let category_id = match tx.category_ref.as_deref() {
                Some(raw) => Some(self.require_owned_category(&db_tx, user_id, raw).await?.id),
                None => None,
            };

            let model = transactions::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(user_id),
                amount_minor: ActiveValue::Set(tx.amount.minor()),
                kind: ActiveValue::Set(tx.kind.as_str().to_string()),
                date: ActiveValue::Set(tx.date),
                note: ActiveValue::Set(tx.note),
                category_id: ActiveValue::Set(category_id),
                payment_method: ActiveValue::Set(tx.payment_method.map(|m| m.as_str().to_string())),
                payment_method_note: ActiveValue::Set(tx.payment_method_note),
                is_recurring: ActiveValue::Set(false),
                recurring_id: ActiveValue::Set(None),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;

            self.attach_tags(&db_tx, user_id, model.id, &tx.tags).await?;
            Ok(model.id)
        })
    }

    /// Links `names` to the transaction, creating missing tags for the user.
    async fn attach_tags<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        transaction_id: Uuid,
        names: &[String],
    ) -> ResultEngine<()> {
        for name in names {
            let existing = tags::Entity::find()
                .filter(tags::Column::UserId.eq(user_id))
                .filter(tags::Column::Name.eq(name.as_str()))
                .one(db)
                .await?;
            let tag = match existing {
                Some(tag) => tag,
                None => {
                    tags::ActiveModel {
                        id: ActiveValue::Set(Uuid::new_v4()),
                        user_id: ActiveValue::Set(user_id),
                        name: ActiveValue::Set(name.clone()),
                    }
                    .insert(db)
                    .await?
                }
            };
            transaction_tags::ActiveModel {
                transaction_id: ActiveValue::Set(transaction_id),
                tag_id: ActiveValue::Set(tag.id),
            }
            .insert(db)
            .await?;
        }
        Ok(())
    }

    pub async fn delete_transaction(&self, user_id: Uuid, transaction_id: Uuid) -> ResultEngine<()> {
        let deleted = transactions::Entity::delete_many()
            .filter(transactions::Column::Id.eq(transaction_id))
            .filter(transactions::Column::UserId.eq(user_id))
            .exec(&self.database)
            .await
            .map_err(|err| EngineError::from(err).failed("delete transaction"))?;
        if deleted.rows_affected == 0 {
            return Err(EngineError::not_found("Transaction not found."));
        }
        self.invalidate(&[View::Dashboard, View::Transactions]);
        Ok(())
    }

    /// The user's transactions, newest first, with category and tag names.
    pub async fn transactions(&self, user_id: Uuid) -> ResultEngine<Vec<Transaction>> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.database)
            .await?;
        self.hydrate(&self.database, models, true).await
    }

    /// Tag names of the user, alphabetically.
    pub async fn tags(&self, user_id: Uuid) -> ResultEngine<Vec<String>> {
        let models = tags::Entity::find()
            .filter(tags::Column::UserId.eq(user_id))
            .order_by_asc(tags::Column::Name)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(|tag| tag.name).collect())
    }

    pub async fn monthly_summary(&self, user_id: Uuid) -> ResultEngine<Vec<YearSummary>> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_asc(transactions::Column::Date)
            .order_by_asc(transactions::Column::CreatedAt)
            .all(&self.database)
            .await?;
        let rows = self.hydrate(&self.database, models, false).await?;
        Ok(summary::monthly_summary(&rows))
    }

    /// Rows of the CSV export, newest first.
    pub async fn export_rows(&self, user_id: Uuid) -> ResultEngine<Vec<ExportRow>> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.database)
            .await?;
        let rows = self.hydrate(&self.database, models, false).await?;
        Ok(rows
            .into_iter()
            .map(|tx| ExportRow {
                date: tx.date,
                kind: tx.kind,
                category: tx.category_name,
                amount: tx.amount,
                note: tx.note,
            })
            .collect())
    }

    /// Transactions of the user dated within `[from, to]`.
    pub(super) async fn transactions_between<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultEngine<Vec<Transaction>> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::Date.between(from, to))
            .order_by_asc(transactions::Column::Date)
            .all(db)
            .await?;
        self.hydrate(db, models, false).await
    }

    /// Turns rows into domain transactions, resolving category names and,
    /// when asked, tag names.
    async fn hydrate<C: ConnectionTrait>(
        &self,
        db: &C,
        models: Vec<transactions::Model>,
        with_tags: bool,
    ) -> ResultEngine<Vec<Transaction>> {
        let names = self
            .category_names(db, models.iter().filter_map(|m| m.category_id))
            .await?;

        let mut tags_by_tx: HashMap<Uuid, Vec<String>> = HashMap::new();
        if with_tags && !models.is_empty() {
            let links = transaction_tags::Entity::find()
                .find_also_related(tags::Entity)
                .filter(transaction_tags::Column::TransactionId.is_in(models.iter().map(|m| m.id)))
                .order_by_asc(tags::Column::Name)
                .all(db)
                .await?;
            for (link, tag) in links {
                if let Some(tag) = tag {
                    tags_by_tx.entry(link.transaction_id).or_default().push(tag.name);
                }
            }
        }

        models
            .into_iter()
            .map(|model| {
                let category_name = model.category_id.and_then(|id| names.get(&id).cloned());
                let tags = tags_by_tx.remove(&model.id).unwrap_or_default();
                Transaction::from_model(model, category_name, tags)
            })
            .collect()
    }
}

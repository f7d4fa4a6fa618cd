//! Dashboard and monthly rollups.
//!
//! Everything here is pure: the ops layer loads rows and hands them over.
//! Sums are exact because amounts are integer minor units.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::{BudgetPlan, Currency, Money, Percentage, Transaction, TransactionKind};

/// Income and outgoings of one calendar month.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MonthTotals {
    pub income: Money,
    pub expenses: Money,
    pub savings: Money,
    pub remaining: Money,
}

impl MonthTotals {
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let mut totals = Self::default();
        for tx in transactions {
            match tx.kind {
                TransactionKind::Income => totals.income += tx.amount,
                TransactionKind::Expense => totals.expenses += tx.amount,
                TransactionKind::Savings => totals.savings += tx.amount,
            }
        }
        totals.remaining = totals.income - totals.expenses - totals.savings;
        totals
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    pub id: Uuid,
    pub name: String,
    pub percentage: Percentage,
    pub is_savings: bool,
    pub budgeted: Money,
    pub spent: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub plan_name: String,
    pub currency: Currency,
    pub current: MonthTotals,
    pub previous: MonthTotals,
    pub categories: Vec<CategoryBreakdown>,
}

impl DashboardStats {
    /// Builds the dashboard for `plan` from this and last month's transactions.
    ///
    /// Each category is budgeted its share of this month's income and charged
    /// with this month's expense and savings transactions filed under it.
    pub fn compute(
        plan: &BudgetPlan,
        currency: Currency,
        current: &[Transaction],
        previous: &[Transaction],
    ) -> Self {
        let this_month = MonthTotals::from_transactions(current);

        let mut spent: BTreeMap<Uuid, Money> = BTreeMap::new();
        for tx in current.iter().filter(|tx| tx.kind.needs_category()) {
            if let Some(category_id) = tx.category_id {
                *spent.entry(category_id).or_default() += tx.amount;
            }
        }

        let categories = plan
            .categories
            .iter()
            .map(|category| CategoryBreakdown {
                id: category.id,
                name: category.name.clone(),
                percentage: category.percentage,
                is_savings: category.is_savings,
                budgeted: category.percentage.share_of(this_month.income),
                spent: spent.get(&category.id).copied().unwrap_or_default(),
            })
            .collect();

        Self {
            plan_name: plan.name.clone(),
            currency,
            current: this_month,
            previous: MonthTotals::from_transactions(previous),
            categories,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MonthTransaction {
    pub id: Uuid,
    pub amount: Money,
    pub kind: TransactionKind,
    pub note: Option<String>,
    pub date: NaiveDate,
    pub category_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    /// Calendar month, `1..=12`.
    pub month: u32,
    pub income: Money,
    pub expenses: Money,
    pub savings: Money,
    pub transactions: Vec<MonthTransaction>,
}

impl MonthSummary {
    fn new(month: u32) -> Self {
        Self {
            month,
            income: Money::ZERO,
            expenses: Money::ZERO,
            savings: Money::ZERO,
            transactions: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub months: Vec<MonthSummary>,
}

/// Buckets transactions by calendar month.
///
/// Years come newest first, months oldest first. Transactions keep the order
/// they are given in, so callers pass them sorted by date.
pub fn monthly_summary(transactions: &[Transaction]) -> Vec<YearSummary> {
    let mut years: BTreeMap<i32, BTreeMap<u32, MonthSummary>> = BTreeMap::new();

    for tx in transactions {
        let month = tx.date.month();
        let bucket = years
            .entry(tx.date.year())
            .or_default()
            .entry(month)
            .or_insert_with(|| MonthSummary::new(month));
        match tx.kind {
            TransactionKind::Income => bucket.income += tx.amount,
            TransactionKind::Expense => bucket.expenses += tx.amount,
            TransactionKind::Savings => bucket.savings += tx.amount,
        }
        bucket.transactions.push(MonthTransaction {
            id: tx.id,
            amount: tx.amount,
            kind: tx.kind,
            note: tx.note.clone(),
            date: tx.date,
            category_name: tx.category_name.clone(),
        });
    }

    years
        .into_iter()
        .rev()
        .map(|(year, months)| YearSummary {
            year,
            months: months.into_values().collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BudgetCategory;

    fn tx(kind: TransactionKind, minor: i64, date: (i32, u32, u32), category: Option<Uuid>) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            amount: Money::new(minor),
            kind,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            note: None,
            category_id: category,
            category_name: None,
            tags: Vec::new(),
            payment_method: None,
            payment_method_note: None,
            is_recurring: false,
            recurring_id: None,
        }
    }

    fn plan(categories: &[(Uuid, i32, bool)]) -> BudgetPlan {
        let plan_id = Uuid::new_v4();
        BudgetPlan {
            id: plan_id,
            name: "50/30/20".to_string(),
            is_default: true,
            is_custom: false,
            categories: categories
                .iter()
                .map(|&(id, bp, is_savings)| BudgetCategory {
                    id,
                    plan_id,
                    name: format!("cat-{bp}"),
                    percentage: Percentage::from_basis_points(bp),
                    is_savings,
                })
                .collect(),
        }
    }

    #[test]
    fn empty_input_gives_no_years() {
        assert!(monthly_summary(&[]).is_empty());
    }

    #[test]
    fn buckets_years_descending_and_months_ascending() {
        let rows = vec![
            tx(TransactionKind::Income, 1_000, (2023, 12, 5), None),
            tx(TransactionKind::Expense, 200, (2024, 1, 3), None),
            tx(TransactionKind::Savings, 300, (2024, 1, 20), None),
            tx(TransactionKind::Income, 5_000, (2024, 3, 1), None),
        ];
        let summary = monthly_summary(&rows);

        assert_eq!(summary.iter().map(|y| y.year).collect::<Vec<_>>(), vec![2024, 2023]);
        let months: Vec<u32> = summary[0].months.iter().map(|m| m.month).collect();
        assert_eq!(months, vec![1, 3]);

        let january = &summary[0].months[0];
        assert_eq!(january.expenses, Money::new(200));
        assert_eq!(january.savings, Money::new(300));
        assert_eq!(january.income, Money::ZERO);
        assert_eq!(january.transactions.len(), 2);
        assert_eq!(summary[1].months[0].month, 12);
    }

    #[test]
    fn many_small_amounts_sum_exactly() {
        let rows: Vec<Transaction> = (0..200)
            .map(|_| tx(TransactionKind::Expense, 1, (2024, 5, 10), None))
            .collect();
        let summary = monthly_summary(&rows);
        assert_eq!(summary[0].months[0].expenses.to_string(), "2.00");
    }

    #[test]
    fn dashboard_budgets_shares_of_income_and_charges_categories() {
        let needs = Uuid::new_v4();
        let wants = Uuid::new_v4();
        let savings = Uuid::new_v4();
        let plan = plan(&[(needs, 5000, false), (wants, 3000, false), (savings, 2000, true)]);

        let current = vec![
            tx(TransactionKind::Income, 3_000_000, (2024, 5, 1), None),
            tx(TransactionKind::Expense, 450_000, (2024, 5, 2), Some(needs)),
            tx(TransactionKind::Expense, 50_000, (2024, 5, 3), Some(needs)),
            tx(TransactionKind::Savings, 600_000, (2024, 5, 4), Some(savings)),
        ];
        let previous = vec![tx(TransactionKind::Income, 100_000, (2024, 4, 30), None)];

        let stats = DashboardStats::compute(&plan, Currency::Thb, &current, &previous);

        assert_eq!(stats.current.income, Money::new(3_000_000));
        assert_eq!(stats.current.expenses, Money::new(500_000));
        assert_eq!(stats.current.savings, Money::new(600_000));
        assert_eq!(stats.current.remaining, Money::new(1_900_000));
        assert_eq!(stats.previous.income, Money::new(100_000));
        assert_eq!(stats.previous.remaining, Money::new(100_000));

        assert_eq!(stats.categories[0].budgeted, Money::new(1_500_000));
        assert_eq!(stats.categories[0].spent, Money::new(500_000));
        assert_eq!(stats.categories[1].spent, Money::ZERO);
        assert_eq!(stats.categories[2].budgeted, Money::new(600_000));
        assert_eq!(stats.categories[2].spent, Money::new(600_000));
    }

    #[test]
    fn dashboard_without_income_budgets_nothing() {
        let needs = Uuid::new_v4();
        let plan = plan(&[(needs, 10_000, false)]);
        let current = vec![tx(TransactionKind::Expense, 1_000, (2024, 5, 2), Some(needs))];
        let stats = DashboardStats::compute(&plan, Currency::Usd, &current, &[]);
        assert_eq!(stats.categories[0].budgeted, Money::ZERO);
        assert_eq!(stats.current.remaining, Money::new(-1_000));
    }
}

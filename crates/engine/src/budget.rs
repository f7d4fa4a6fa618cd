//! Budget plans, their categories and the percentage invariant.
//!
//! A plan splits income across named categories. A submitted plan is valid
//! when the percentages as entered add up to 100 within 0.01. Accepted
//! percentages are then stored as basis points (hundredths of a percent).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, budget_categories, budget_plans};

/// Allowed drift between a plan's submitted total and 100%.
const TOTAL_TOLERANCE: f64 = 0.01;
/// Absorbs binary rounding of decimal input such as `33.33 * 3`.
const FLOAT_SLACK: f64 = 1e-9;

/// Share of a plan, in basis points.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Percentage(i32);

impl Percentage {
    pub const FULL: Percentage = Percentage(10_000);

    #[must_use]
    pub const fn from_basis_points(basis_points: i32) -> Self {
        Self(basis_points)
    }

    /// Converts a user supplied percentage (`0.0..=100.0`) rounding to the
    /// nearest basis point.
    pub fn from_percent(value: f64) -> Option<Self> {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return None;
        }
        Some(Self((value * 100.0).round() as i32))
    }

    #[must_use]
    pub const fn basis_points(self) -> i32 {
        self.0
    }

    #[must_use]
    pub fn as_percent(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// This share of `amount`, truncated down to the minor unit so a budget
    /// never promises more than the income covers.
    #[must_use]
    pub fn share_of(self, amount: Money) -> Money {
        let share = (i128::from(amount.minor()) * i128::from(self.0)).div_euclid(10_000);
        Money::new(i64::try_from(share).unwrap_or(i64::MAX))
    }
}

/// One category of a submitted plan edit.
///
/// `id` is set for categories that already exist and absent for new ones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub percentage: f64,
    #[serde(default)]
    pub is_savings: bool,
}

impl CategoryInput {
    /// Decodes a JSON encoded category list, as sent by form submissions.
    pub fn parse_list(json: &str) -> ResultEngine<Vec<CategoryInput>> {
        serde_json::from_str(json)
            .map_err(|_| EngineError::InvalidPayload("Invalid categories data.".to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ValidCategory {
    pub(crate) id: Option<Uuid>,
    pub(crate) name: String,
    pub(crate) percentage: Percentage,
    pub(crate) is_savings: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ValidPlan {
    pub(crate) name: String,
    pub(crate) categories: Vec<ValidCategory>,
}

/// Validates a plan name and its category set without touching storage.
pub(crate) fn validate_plan(name: &str, categories: Vec<CategoryInput>) -> ResultEngine<ValidPlan> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EngineError::validation("Plan name is required."));
    }
    if categories.is_empty() {
        return Err(EngineError::validation("At least one category is required."));
    }

    let invalid = || EngineError::InvalidPayload("Invalid categories data.".to_string());
    let total: f64 = categories.iter().map(|c| c.percentage).sum();
    let mut valid = Vec::with_capacity(categories.len());
    for category in categories {
        let category_name = category.name.trim();
        if category_name.is_empty() {
            return Err(invalid());
        }
        let percentage = Percentage::from_percent(category.percentage).ok_or_else(invalid)?;
        valid.push(ValidCategory {
            id: category.id,
            name: category_name.to_string(),
            percentage,
            is_savings: category.is_savings,
        });
    }

    if (total - 100.0).abs() > TOTAL_TOLERANCE + FLOAT_SLACK {
        return Err(EngineError::invariant("Percentages must sum to 100."));
    }

    Ok(ValidPlan {
        name: name.to_string(),
        categories: valid,
    })
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BudgetCategory {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub name: String,
    pub percentage: Percentage,
    pub is_savings: bool,
}

impl From<budget_categories::Model> for BudgetCategory {
    fn from(model: budget_categories::Model) -> Self {
        Self {
            id: model.id,
            plan_id: model.plan_id,
            name: model.name,
            percentage: Percentage::from_basis_points(model.basis_points),
            is_savings: model.is_savings,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BudgetPlan {
    pub id: Uuid,
    pub name: String,
    pub is_default: bool,
    pub is_custom: bool,
    pub categories: Vec<BudgetCategory>,
}

impl BudgetPlan {
    pub(crate) fn from_models(
        plan: budget_plans::Model,
        categories: Vec<budget_categories::Model>,
    ) -> Self {
        Self {
            id: plan.id,
            name: plan.name,
            is_default: plan.is_default,
            is_custom: plan.is_custom,
            categories: categories.into_iter().map(BudgetCategory::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, percentage: f64) -> CategoryInput {
        CategoryInput {
            id: None,
            name: name.to_string(),
            percentage,
            is_savings: false,
        }
    }

    #[test]
    fn accepts_totals_within_a_hundredth() {
        let plan = validate_plan(
            " Thirds ",
            vec![input("A", 33.33), input("B", 33.33), input("C", 33.33)],
        )
        .unwrap();
        assert_eq!(plan.name, "Thirds");
        assert_eq!(plan.categories[0].percentage.basis_points(), 3333);
    }

    #[test]
    fn rejects_totals_off_by_more_than_a_hundredth() {
        let err = validate_plan("Off", vec![input("A", 50.0), input("B", 49.0)]).unwrap_err();
        assert_eq!(err, EngineError::invariant("Percentages must sum to 100."));

        let err = validate_plan("Over", vec![input("A", 60.0), input("B", 40.02)]).unwrap_err();
        assert_eq!(err, EngineError::invariant("Percentages must sum to 100."));
    }

    #[test]
    fn total_is_checked_on_the_entered_values() {
        // Each rounds down to 2500 bp, but the entered total is 100.0104.
        let err = validate_plan("Quarters", vec![input("A", 25.0026); 4]).unwrap_err();
        assert_eq!(err, EngineError::invariant("Percentages must sum to 100."));

        // Entered total is exactly 100 even though the rounded shares add to 10002 bp.
        let mut categories = vec![input("A", 20.0051); 4];
        categories.push(input("B", 19.9796));
        let plan = validate_plan("Fifths", categories).unwrap();
        assert_eq!(plan.categories[0].percentage.basis_points(), 2001);
        assert_eq!(plan.categories[4].percentage.basis_points(), 1998);
    }

    #[test]
    fn rejects_blank_names_and_empty_lists() {
        assert_eq!(
            validate_plan("  ", vec![input("A", 100.0)]).unwrap_err(),
            EngineError::validation("Plan name is required.")
        );
        assert_eq!(
            validate_plan("Plan", vec![]).unwrap_err(),
            EngineError::validation("At least one category is required.")
        );
        assert!(matches!(
            validate_plan("Plan", vec![input(" ", 100.0)]),
            Err(EngineError::InvalidPayload(_))
        ));
        assert!(matches!(
            validate_plan("Plan", vec![input("A", 140.0), input("B", -40.0)]),
            Err(EngineError::InvalidPayload(_))
        ));
    }

    #[test]
    fn parses_json_category_lists() {
        let list = CategoryInput::parse_list(
            r#"[{"name":"Needs","percentage":50},{"id":null,"name":"Savings","percentage":50,"isSavings":true}]"#,
        )
        .unwrap();
        assert_eq!(list.len(), 2);
        assert!(list[1].is_savings);

        assert_eq!(
            CategoryInput::parse_list("not json").unwrap_err(),
            EngineError::InvalidPayload("Invalid categories data.".to_string())
        );
    }

    #[test]
    fn share_of_truncates_to_the_minor_unit() {
        let income = Money::new(100_000);
        assert_eq!(Percentage::from_basis_points(3333).share_of(income), Money::new(33_330));
        assert_eq!(
            Percentage::from_basis_points(3333).share_of(Money::new(1_001)),
            Money::new(333)
        );
        assert_eq!(Percentage::FULL.share_of(income), income);
    }

    #[test]
    fn share_of_large_incomes_does_not_overflow() {
        let income = Money::new(99_999_999_999_999);
        assert_eq!(Percentage::FULL.share_of(income), income);
        assert_eq!(
            Percentage::from_basis_points(5000).share_of(income),
            Money::new(49_999_999_999_999)
        );
    }
}

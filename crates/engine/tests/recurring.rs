mod common;

use common::{category, date, engine, ready_user, tx};
use engine::{EngineError, Money, NewRecurringRule, NewSavingsGoal, TransactionKind};
use uuid::Uuid;

fn rent(category: Uuid, day: u32) -> NewRecurringRule {
    NewRecurringRule {
        amount: "12000".to_string(),
        kind: "EXPENSE".to_string(),
        category_id: Some(category.to_string()),
        note: Some("Rent".to_string()),
        day_of_month: day.to_string(),
    }
}

#[tokio::test]
async fn rules_fire_once_per_month_on_or_after_their_day() {
    let engine = engine().await;
    let (user_id, config) = ready_user(&engine, "r@example.com").await;
    let needs = category(&config, "Needs");
    let rule_id = engine.create_recurring_rule(user_id, rent(needs, 15)).await.unwrap();

    assert_eq!(engine.process_recurring(user_id, date(2024, 3, 14)).await.unwrap(), 0);
    assert!(engine.transactions(user_id).await.unwrap().is_empty());

    assert_eq!(engine.process_recurring(user_id, date(2024, 3, 20)).await.unwrap(), 1);
    assert_eq!(engine.process_recurring(user_id, date(2024, 3, 31)).await.unwrap(), 0);

    let generated = engine.transactions(user_id).await.unwrap();
    assert_eq!(generated.len(), 1);
    let generated = &generated[0];
    assert_eq!(generated.date, date(2024, 3, 15));
    assert_eq!(generated.amount, Money::new(1_200_000));
    assert_eq!(generated.kind, TransactionKind::Expense);
    assert_eq!(generated.category_id, Some(needs));
    assert_eq!(generated.note.as_deref(), Some("Rent"));
    assert!(generated.is_recurring);
    assert_eq!(generated.recurring_id, Some(rule_id));

    // No backfill for the skipped April.
    assert_eq!(engine.process_recurring(user_id, date(2024, 5, 15)).await.unwrap(), 1);
    let dates: Vec<_> = engine
        .transactions(user_id)
        .await
        .unwrap()
        .iter()
        .map(|t| t.date)
        .collect();
    assert_eq!(dates, vec![date(2024, 5, 15), date(2024, 3, 15)]);
}

#[tokio::test]
async fn paused_and_deleted_rules_keep_their_transactions() {
    let engine = engine().await;
    let (user_id, config) = ready_user(&engine, "p@example.com").await;
    let rule_id = engine
        .create_recurring_rule(user_id, rent(category(&config, "Needs"), 1))
        .await
        .unwrap();
    engine.process_recurring(user_id, date(2024, 1, 1)).await.unwrap();

    assert!(!engine.toggle_recurring_rule(user_id, rule_id).await.unwrap());
    assert_eq!(engine.process_recurring(user_id, date(2024, 2, 10)).await.unwrap(), 0);
    assert!(engine.toggle_recurring_rule(user_id, rule_id).await.unwrap());
    assert!(engine.recurring_rules(user_id).await.unwrap()[0].is_active);

    engine.delete_recurring_rule(user_id, rule_id).await.unwrap();
    assert!(engine.recurring_rules(user_id).await.unwrap().is_empty());
    assert_eq!(engine.transactions(user_id).await.unwrap().len(), 1);
    assert_eq!(
        engine.toggle_recurring_rule(user_id, rule_id).await.unwrap_err(),
        EngineError::NotFound("Recurring transaction not found.".to_string())
    );
}

#[tokio::test]
async fn rules_are_listed_by_day_and_scoped_to_the_owner() {
    let engine = engine().await;
    let (user_id, config) = ready_user(&engine, "s@example.com").await;
    let (other, other_config) = ready_user(&engine, "q@example.com").await;
    let needs = category(&config, "Needs");

    engine.create_recurring_rule(user_id, rent(needs, 20)).await.unwrap();
    let early = engine
        .create_recurring_rule(
            user_id,
            NewRecurringRule {
                kind: "INCOME".to_string(),
                category_id: Some(needs.to_string()),
                ..rent(needs, 2)
            },
        )
        .await
        .unwrap();

    let rules = engine.recurring_rules(user_id).await.unwrap();
    assert_eq!(rules.iter().map(|r| r.day_of_month).collect::<Vec<_>>(), vec![2, 20]);
    assert_eq!(rules[0].id, early);
    assert_eq!(rules[0].category_id, None);
    assert_eq!(rules[1].category_name.as_deref(), Some("Needs"));

    let err = engine
        .create_recurring_rule(other, rent(needs, 3))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("Category not found.".to_string()));
    assert_eq!(
        engine.delete_recurring_rule(other, early).await.unwrap_err(),
        EngineError::NotFound("Recurring transaction not found.".to_string())
    );
    assert!(engine
        .create_recurring_rule(other, rent(category(&other_config, "Needs"), 3))
        .await
        .is_ok());
}

#[tokio::test]
async fn goal_progress_counts_owned_savings_in_the_linked_category() {
    let engine = engine().await;
    let (user_id, config) = ready_user(&engine, "g@example.com").await;
    let savings = category(&config, "Savings");
    let needs = category(&config, "Needs");
    let on = date(2024, 8, 8);

    let goal_id = engine
        .create_savings_goal(
            user_id,
            NewSavingsGoal {
                name: "Trip".to_string(),
                target: "5000".to_string(),
                category_id: Some(savings.to_string()),
                deadline: Some("2025-01-31".to_string()),
            },
        )
        .await
        .unwrap();
    engine
        .create_savings_goal(
            user_id,
            NewSavingsGoal {
                name: "Unlinked".to_string(),
                target: "10".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    for entry in [
        tx("SAVINGS", "1000", Some(savings), on),
        tx("SAVINGS", "250.50", Some(savings), on),
        tx("EXPENSE", "400", Some(savings), on),
        tx("SAVINGS", "999", Some(needs), on),
    ] {
        engine.create_transaction(user_id, entry).await.unwrap();
    }

    let goals = engine.savings_goals(user_id).await.unwrap();
    assert_eq!(goals.len(), 2);
    assert_eq!(goals[0].id, goal_id);
    assert_eq!(goals[0].current, Money::new(125_050));
    assert_eq!(goals[0].target, Money::new(500_000));
    assert_eq!(goals[0].progress_percent(), 25);
    assert_eq!(goals[0].category_name.as_deref(), Some("Savings"));
    assert_eq!(goals[0].deadline, Some(date(2025, 1, 31)));
    assert_eq!(goals[1].current, Money::ZERO);

    let (other, _) = ready_user(&engine, "h@example.com").await;
    assert_eq!(
        engine.delete_savings_goal(other, goal_id).await.unwrap_err(),
        EngineError::NotFound("Goal not found.".to_string())
    );
    engine.delete_savings_goal(user_id, goal_id).await.unwrap();
    assert_eq!(engine.savings_goals(user_id).await.unwrap().len(), 1);
}

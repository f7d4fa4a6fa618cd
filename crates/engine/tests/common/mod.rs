#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use sea_orm::Database;
use uuid::Uuid;

use engine::{CategoryInput, Engine, Invalidator, NewTransaction, RegisterUser, UserConfig, View};
use migration::MigratorTrait;

#[derive(Default)]
pub struct Recorder(Mutex<Vec<View>>);

impl Recorder {
    pub fn take(&self) -> Vec<View> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl Invalidator for Recorder {
    fn invalidate(&self, view: View) {
        self.0.lock().unwrap().push(view);
    }
}

pub async fn engine() -> Engine {
    engine_with_recorder().await.0
}

pub async fn engine_with_recorder() -> (Engine, Arc<Recorder>) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let recorder = Arc::new(Recorder::default());
    let engine = Engine::builder()
        .database(db)
        .invalidator(recorder.clone())
        .build()
        .await
        .unwrap();
    (engine, recorder)
}

pub async fn user(engine: &Engine, email: &str) -> Uuid {
    engine
        .register_user(RegisterUser {
            name: "Test".to_string(),
            email: email.to_string(),
            password: "correct horse".to_string(),
            confirm_password: "correct horse".to_string(),
        })
        .await
        .unwrap()
        .id
}

/// Registers a user and completes setup with the 50/30/20 plan.
pub async fn ready_user(engine: &Engine, email: &str) -> (Uuid, UserConfig) {
    let user_id = user(engine, email).await;
    engine.initialize_app(user_id, 0).await.unwrap();
    let config = engine.user_config(user_id).await.unwrap().unwrap();
    (user_id, config)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn category(config: &UserConfig, name: &str) -> Uuid {
    config
        .active_plan
        .categories
        .iter()
        .find(|c| c.name == name)
        .map(|c| c.id)
        .unwrap()
}

pub fn tx(kind: &str, amount: &str, category: Option<Uuid>, on: NaiveDate) -> NewTransaction {
    NewTransaction {
        amount: amount.to_string(),
        kind: kind.to_string(),
        category_id: category.map(|id| id.to_string()),
        date: on.to_string(),
        ..Default::default()
    }
}

pub fn input(id: Option<Uuid>, name: &str, percentage: f64, is_savings: bool) -> CategoryInput {
    CategoryInput {
        id,
        name: name.to_string(),
        percentage,
        is_savings,
    }
}

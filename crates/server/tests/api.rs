use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use server::{RateSource, ServerState, TracingInvalidator};

const PASSWORD: &str = "correct horse";

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder()
        .database(db)
        .invalidator(Arc::new(TracingInvalidator))
        .build()
        .await
        .unwrap();

    server::router(ServerState {
        engine: Arc::new(engine),
        rates: Arc::new(RateSource::offline()),
    })
}

fn basic(email: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{email}:{PASSWORD}")))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let res = app.clone().oneshot(request).await.unwrap();
    let status = res.status();
    let body = res.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, body)
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(email) = auth {
        builder = builder.header(header::AUTHORIZATION, basic(email));
    }
    let (status, bytes) = send(app, builder.body(Body::from(body.to_string())).unwrap()).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str, email: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, basic(email))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn register(app: &Router, email: &str) {
    let (status, _) = send_json(
        app,
        "POST",
        "/register",
        None,
        json!({
            "name": "Test",
            "email": email,
            "password": PASSWORD,
            "confirm_password": PASSWORD,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn protected_routes_require_basic_auth() {
    let app = app().await;

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    assert_eq!(send(&app, request).await.0, StatusCode::OK);

    let request = Request::builder()
        .uri("/export-csv")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, request).await.0, StatusCode::UNAUTHORIZED);

    register(&app, "ana@example.com").await;
    let request = Request::builder()
        .uri("/export-csv")
        .header(
            header::AUTHORIZATION,
            format!("Basic {}", STANDARD.encode("ana@example.com:wrong password")),
        )
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, request).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_is_a_conflict() {
    let app = app().await;
    register(&app, "ana@example.com").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/register",
        None,
        json!({
            "name": "Other",
            "email": "ANA@example.com",
            "password": PASSWORD,
            "confirm_password": PASSWORD,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("An account with this email already exists."));
}

#[tokio::test]
async fn dashboard_needs_setup_first() {
    let app = app().await;
    register(&app, "ana@example.com").await;

    let (status, _) = get(&app, "/dashboard", "ana@example.com").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send_json(
        &app,
        "POST",
        "/setup",
        Some("ana@example.com"),
        json!({ "plan_index": 0 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let (status, bytes) = get(&app, "/dashboard", "ana@example.com").await;
    assert_eq!(status, StatusCode::OK);
    let dashboard: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(dashboard["plan_name"], json!("50 / 30 / 20"));
    assert_eq!(dashboard["currency"], json!("THB"));
    assert_eq!(dashboard["categories"].as_array().unwrap().len(), 3);
    assert_eq!(dashboard["current"]["income"]["display"], json!("฿0.00"));

    let (status, body) = send_json(
        &app,
        "POST",
        "/setup",
        Some("ana@example.com"),
        json!({ "plan_index": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], json!("Setup has already been completed."));
}

#[tokio::test]
async fn expense_without_category_is_rejected() {
    let app = app().await;
    register(&app, "ana@example.com").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/transactions",
        Some("ana@example.com"),
        json!({ "amount": "120.50", "kind": "EXPENSE", "date": "2026-03-05" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["error"],
        json!("Category is required for expenses and savings.")
    );
}

#[tokio::test]
async fn malformed_json_is_unprocessable() {
    let app = app().await;
    register(&app, "ana@example.com").await;

    let request = Request::builder()
        .method("POST")
        .uri("/plans")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, basic("ana@example.com"))
        .body(Body::from("{\"name\": "))
        .unwrap();
    let (status, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn export_without_transactions_is_only_the_header() {
    let app = app().await;
    register(&app, "ana@example.com").await;

    let request = Request::builder()
        .uri("/export-csv")
        .header(header::AUTHORIZATION, basic("ana@example.com"))
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(request).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    let disposition = res.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"centa-transactions-"));

    let body = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Date,Type,Category,Amount,Note");
}

#[tokio::test]
async fn transactions_flow_through_to_export_and_summary() {
    let app = app().await;
    register(&app, "ana@example.com").await;
    send_json(
        &app,
        "POST",
        "/setup",
        Some("ana@example.com"),
        json!({ "plan_index": 0 }),
    )
    .await;

    let (_, bytes) = get(&app, "/config", "ana@example.com").await;
    let config: Value = serde_json::from_slice(&bytes).unwrap();
    let needs = config["active_plan"]["categories"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == json!("Needs"))
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, _) = send_json(
        &app,
        "POST",
        "/transactions",
        Some("ana@example.com"),
        json!({
            "amount": "120.50",
            "kind": "EXPENSE",
            "category_id": needs,
            "date": "2026-03-05",
            "note": "rice, \"jasmine\"",
            "tags": "food, food, ",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, bytes) = get(&app, "/export-csv", "ana@example.com").await;
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        "Date,Type,Category,Amount,Note\n2026-03-05,EXPENSE,Needs,120.50,\"rice, \"\"jasmine\"\"\""
    );

    let (_, bytes) = get(&app, "/tags", "ana@example.com").await;
    let tags: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(tags["tags"], json!(["food"]));

    let (_, bytes) = get(&app, "/summary", "ana@example.com").await;
    let summary: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(summary["years"][0]["year"], json!(2026));
    assert_eq!(summary["years"][0]["months"][0]["month"], json!(3));
    assert_eq!(summary["years"][0]["months"][0]["expenses"]["minor"], json!(12_050));
}

#[tokio::test]
async fn currency_switch_changes_display_only() {
    let app = app().await;
    register(&app, "ana@example.com").await;
    send_json(
        &app,
        "POST",
        "/setup",
        Some("ana@example.com"),
        json!({ "plan_index": 0 }),
    )
    .await;
    send_json(
        &app,
        "POST",
        "/transactions",
        Some("ana@example.com"),
        json!({ "amount": "1000", "kind": "INCOME", "date": "2026-03-01" }),
    )
    .await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/config/currency",
        Some("ana@example.com"),
        json!({ "currency": "EUR" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], json!("Invalid currency."));

    let (status, _) = send_json(
        &app,
        "POST",
        "/config/currency",
        Some("ana@example.com"),
        json!({ "currency": "USD" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, bytes) = get(&app, "/transactions", "ana@example.com").await;
    let list: Value = serde_json::from_slice(&bytes).unwrap();
    let amount = &list["transactions"][0]["amount"];
    assert_eq!(amount["minor"], json!(100_000));
    assert_eq!(amount["display"], json!("$29.00"));
}
